use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::challenge::{Challenge, ResultProposal};
use crate::models::game::{Game, GameDraft, GameResult};
use crate::rating::RatingStrategy;
use crate::repositories::challenge_repository::ChallengeRepository;
use crate::services::errors::challenge_service_errors::ChallengeServiceError;
use crate::services::errors::player_service_errors::PlayerServiceError;
use crate::services::ledger_service::LedgerService;
use crate::services::player_service::PlayerService;

struct ChallengeState {
    /// Active challenges keyed by their zero-padded id, so iteration order
    /// matches assignment order.
    active: BTreeMap<String, Challenge>,
    /// Next id to hand out. Resets to zero only when the active set empties,
    /// so ids stay short but are only unique among outstanding challenges.
    next_id: u64,
}

/// Drives a challenge from the initial send through result agreement, at
/// which point it becomes a ledger game and the pending record is deleted.
///
/// Every transition runs as one critical section: read current state, check
/// the guards, write the durable record, then update the in-memory set. A
/// guard violation leaves both untouched.
pub struct ChallengeService {
    repository: Arc<dyn ChallengeRepository + Send + Sync>,
    ledger: Arc<LedgerService>,
    players: Arc<PlayerService>,
    strategy: Arc<dyn RatingStrategy>,
    state: Mutex<ChallengeState>,
}

impl ChallengeService {
    pub fn new(
        repository: Arc<dyn ChallengeRepository + Send + Sync>,
        ledger: Arc<LedgerService>,
        players: Arc<PlayerService>,
        strategy: Arc<dyn RatingStrategy>,
    ) -> Self {
        ChallengeService {
            repository,
            ledger,
            players,
            strategy,
            state: Mutex::new(ChallengeState {
                active: BTreeMap::new(),
                next_id: 0,
            }),
        }
    }

    /// Replays persisted challenges into the active set and restores the id
    /// counter to one past the highest outstanding id.
    pub async fn load(&self) -> Result<usize, ChallengeServiceError> {
        let records = self.repository.list_challenges().await?;
        let mut state = self.state.lock().await;

        state.active.clear();
        let mut max_id = None;
        for challenge in records {
            match Challenge::parse_id(&challenge.id) {
                Some(numeric) => max_id = max_id.max(Some(numeric)),
                None => {
                    return Err(ChallengeServiceError::ValidationError(format!(
                        "Stored challenge has malformed id: {}",
                        challenge.id
                    )))
                }
            }
            state.active.insert(challenge.id.clone(), challenge);
        }
        state.next_id = max_id.map_or(0, |max| max + 1);
        Ok(state.active.len())
    }

    pub async fn send_challenge(
        &self,
        sender: &str,
        receiver: &str,
    ) -> Result<Challenge, ChallengeServiceError> {
        if sender.is_empty() || receiver.is_empty() {
            return Err(ChallengeServiceError::ValidationError(
                "Sender and receiver cannot be empty".to_string(),
            ));
        }
        if sender == receiver {
            return Err(ChallengeServiceError::SenderIsReceiver);
        }

        let mut state = self.state.lock().await;
        let challenge = Challenge::new(Challenge::format_id(state.next_id), sender, receiver);

        self.repository.put_challenge(&challenge).await?;

        // The counter only moves once the record is durable.
        state.next_id += 1;
        state
            .active
            .insert(challenge.id.clone(), challenge.clone());
        info!(
            "Challenge {} sent: {} -> {}",
            challenge.id, sender, receiver
        );
        Ok(challenge)
    }

    pub async fn accept_challenge(&self, id: &str) -> Result<Challenge, ChallengeServiceError> {
        let mut state = self.state.lock().await;
        let current = state
            .active
            .get(id)
            .ok_or(ChallengeServiceError::ChallengeNotFound)?;
        if current.is_accepted() {
            return Err(ChallengeServiceError::AlreadyAccepted);
        }

        let mut updated = current.clone();
        updated.accepted_at = Some(Utc::now());

        self.repository.put_challenge(&updated).await?;
        state.active.insert(id.to_string(), updated.clone());
        info!("Challenge {} accepted", id);
        Ok(updated)
    }

    /// Valid any time before result agreement; deletes the challenge for
    /// good. The id counter is unaffected unless the active set empties.
    pub async fn decline_challenge(&self, id: &str) -> Result<(), ChallengeServiceError> {
        let mut state = self.state.lock().await;
        if !state.active.contains_key(id) {
            return Err(ChallengeServiceError::ChallengeNotFound);
        }

        self.repository.delete_challenge(id).await?;
        state.active.remove(id);
        if state.active.is_empty() {
            state.next_id = 0;
        }
        info!("Challenge {} declined", id);
        Ok(())
    }

    /// Proposes an outcome. Replaces any earlier proposal in one atomic
    /// update; a guard failure leaves the previous proposal in place.
    #[allow(clippy::too_many_arguments)]
    pub async fn set_result(
        &self,
        id: &str,
        by: &str,
        white: &str,
        black: &str,
        result: GameResult,
        time_control_id: &str,
        time_control_name: &str,
    ) -> Result<Challenge, ChallengeServiceError> {
        let mut state = self.state.lock().await;
        let current = state
            .active
            .get(id)
            .ok_or(ChallengeServiceError::ChallengeNotFound)?;

        if !current.is_accepted() {
            return Err(ChallengeServiceError::NotAccepted);
        }
        if white == black {
            return Err(ChallengeServiceError::PlayersNotDistinct);
        }
        if !current.involves(white) {
            return Err(ChallengeServiceError::NotParticipant(white.to_string()));
        }
        if !current.involves(black) {
            return Err(ChallengeServiceError::NotParticipant(black.to_string()));
        }
        if by != white && by != black {
            return Err(ChallengeServiceError::SetterNotPlaying(by.to_string()));
        }

        let mut updated = current.clone();
        updated.proposal = Some(ResultProposal {
            white: white.to_string(),
            black: black.to_string(),
            result,
            time_control_id: time_control_id.to_string(),
            time_control_name: time_control_name.to_string(),
            result_set_by: by.to_string(),
            result_set_at: Utc::now(),
            result_accepted_by: None,
            result_accepted_at: None,
        });

        self.repository.put_challenge(&updated).await?;
        state.active.insert(id.to_string(), updated.clone());
        info!("Challenge {}: {} proposed {}", id, by, result);
        Ok(updated)
    }

    /// Retracts a proposed result. The whole group clears together; the
    /// acceptance state is untouched and a new result can be proposed.
    pub async fn unset_result(&self, id: &str) -> Result<Challenge, ChallengeServiceError> {
        let mut state = self.state.lock().await;
        let current = state
            .active
            .get(id)
            .ok_or(ChallengeServiceError::ChallengeNotFound)?;
        if current.proposal.is_none() {
            return Err(ChallengeServiceError::ResultNotSet);
        }

        let mut updated = current.clone();
        updated.proposal = None;

        self.repository.put_challenge(&updated).await?;
        state.active.insert(id.to_string(), updated.clone());
        info!("Challenge {}: proposed result retracted", id);
        Ok(updated)
    }

    /// Confirms the proposed result and converts the challenge into a
    /// permanent game: the ledger append is the commit point, after which the
    /// new ratings are stored and the pending record is deleted.
    pub async fn agree_result(
        &self,
        id: &str,
        by: Option<&str>,
    ) -> Result<Game, ChallengeServiceError> {
        let mut state = self.state.lock().await;
        let current = state
            .active
            .get(id)
            .ok_or(ChallengeServiceError::ChallengeNotFound)?;
        let mut proposal = current
            .proposal
            .clone()
            .ok_or(ChallengeServiceError::ResultNotSet)?;

        if let Some(agreer) = by {
            if agreer == proposal.result_set_by {
                return Err(ChallengeServiceError::AgreerIsSetter(agreer.to_string()));
            }
            if agreer != proposal.white && agreer != proposal.black {
                return Err(ChallengeServiceError::AgreerNotPlaying(agreer.to_string()));
            }
        }
        proposal.result_accepted_by = by.map(str::to_string);
        proposal.result_accepted_at = Some(Utc::now());

        // Snapshot the current stored ratings as the before-game values,
        // creating zero-state records for this time control if needed.
        self.players
            .add_time_control_rating(&proposal.white, &proposal.time_control_id)
            .await?;
        self.players
            .add_time_control_rating(&proposal.black, &proposal.time_control_id)
            .await?;
        let white_before = self
            .players
            .rating_for(&proposal.white, &proposal.time_control_id)
            .await
            .ok_or(ChallengeServiceError::PlayerError(
                PlayerServiceError::PlayerNotFound,
            ))?;
        let black_before = self
            .players
            .rating_for(&proposal.black, &proposal.time_control_id)
            .await
            .ok_or(ChallengeServiceError::PlayerError(
                PlayerServiceError::PlayerNotFound,
            ))?;

        let draft = GameDraft {
            white: proposal.white.clone(),
            white_rating_before: white_before,
            black: proposal.black.clone(),
            black_rating_before: black_before,
            result: proposal.result,
            time_control_id: proposal.time_control_id.clone(),
            time_control_name: proposal.time_control_name.clone(),
            played_at: proposal.result_set_at,
        };
        let game = self.ledger.append(draft).await?;

        let (new_white, new_black) = self.strategy.compute(&game)?;
        self.players
            .commit_rating(&proposal.white, &proposal.time_control_id, new_white)
            .await?;
        self.players
            .commit_rating(&proposal.black, &proposal.time_control_id, new_black)
            .await?;

        self.repository.delete_challenge(id).await?;
        state.active.remove(id);
        if state.active.is_empty() {
            state.next_id = 0;
        }
        info!(
            "Challenge {} finalized as game {} ({} vs {}, {})",
            id, game.id, game.white, game.black, game.result
        );
        Ok(game)
    }

    pub async fn get_challenge_by_id(&self, id: &str) -> Option<Challenge> {
        self.state.lock().await.active.get(id).cloned()
    }

    /// Active challenges in id order.
    pub async fn list_challenges(&self) -> Vec<Challenge> {
        self.state.lock().await.active.values().cloned().collect()
    }

    /// Challenges the member is part of, as sender or receiver.
    pub async fn challenges_for(&self, username: &str) -> Vec<Challenge> {
        self.state
            .lock()
            .await
            .active
            .values()
            .filter(|challenge| challenge.involves(username))
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.state.lock().await.active.len()
    }
}
