use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::game::{Game, GameDraft, GameResult};
use crate::rating::{Rating, RatingStrategy};
use crate::repositories::game_repository::GameRepository;
use crate::services::errors::ledger_service_errors::LedgerServiceError;
use crate::services::player_service::PlayerService;

struct LedgerState {
    /// Finalized games grouped by calendar day, each bucket ordered by id.
    buckets: BTreeMap<String, Vec<Game>>,
    max_game_id: u64,
}

/// Append-only store of finalized games and the source of truth for rating
/// history. Game ids are global, monotonic, and never reused.
pub struct LedgerService {
    repository: Arc<dyn GameRepository + Send + Sync>,
    state: Mutex<LedgerState>,
}

impl LedgerService {
    pub fn new(repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        LedgerService {
            repository,
            state: Mutex::new(LedgerState {
                buckets: BTreeMap::new(),
                max_game_id: 0,
            }),
        }
    }

    /// Replays the full game scan into the bucket index.
    pub async fn load(&self) -> Result<usize, LedgerServiceError> {
        let games = self.repository.list_games().await?;
        let mut state = self.state.lock().await;

        state.buckets.clear();
        state.max_game_id = 0;
        let count = games.len();
        for game in games {
            state.max_game_id = state.max_game_id.max(game.id);
            state
                .buckets
                .entry(game.bucket_key())
                .or_default()
                .push(game);
        }
        for bucket in state.buckets.values_mut() {
            bucket.sort_by_key(|game| game.id);
        }
        Ok(count)
    }

    /// Commits a finalized game: assigns the next id, writes the durable
    /// record, then updates the index and the id counter. The counter only
    /// moves once the write has succeeded.
    pub async fn append(&self, draft: GameDraft) -> Result<Game, LedgerServiceError> {
        let mut state = self.state.lock().await;
        let game = draft.into_game(state.max_game_id + 1);

        self.repository.put_game(&game).await?;

        state.max_game_id = game.id;
        state
            .buckets
            .entry(game.bucket_key())
            .or_default()
            .push(game.clone());
        info!(
            "Recorded game {}: {} vs {} ({})",
            game.id, game.white, game.black, game.result
        );
        Ok(game)
    }

    fn locate(state: &LedgerState, id: u64) -> Option<(String, usize)> {
        for (bucket_key, games) in &state.buckets {
            if let Some(index) = games.iter().position(|game| game.id == id) {
                return Some((bucket_key.clone(), index));
            }
        }
        None
    }

    pub async fn find_game_by_id(&self, id: u64) -> Option<Game> {
        let state = self.state.lock().await;
        Self::locate(&state, id)
            .and_then(|(bucket_key, index)| state.buckets.get(&bucket_key).map(|g| g[index].clone()))
    }

    /// Administrative override of a finalized result. Ratings already
    /// published from the old result are not recomputed here; run
    /// `recalculate_all_ratings` to repair them.
    pub async fn edit_result(
        &self,
        id: u64,
        new_result: GameResult,
    ) -> Result<Game, LedgerServiceError> {
        let mut state = self.state.lock().await;
        let (bucket_key, index) =
            Self::locate(&state, id).ok_or(LedgerServiceError::GameNotFound)?;

        let mut updated = match state.buckets.get(&bucket_key) {
            Some(games) => games[index].clone(),
            None => return Err(LedgerServiceError::GameNotFound),
        };
        updated.result = new_result;

        self.repository.put_game(&updated).await?;

        if let Some(games) = state.buckets.get_mut(&bucket_key) {
            games[index] = updated.clone();
        }
        warn!("Result of game {} edited to {}", id, new_result);
        Ok(updated)
    }

    /// All games in id order.
    pub async fn games(&self) -> Vec<Game> {
        let state = self.state.lock().await;
        let mut all: Vec<Game> = state.buckets.values().flatten().cloned().collect();
        all.sort_by_key(|game| game.id);
        all
    }

    pub async fn games_for(&self, username: &str) -> Vec<Game> {
        self.games()
            .await
            .into_iter()
            .filter(|game| game.involves(username))
            .collect()
    }

    pub async fn count(&self) -> usize {
        let state = self.state.lock().await;
        state.buckets.values().map(Vec::len).sum()
    }

    /// Replays every game in id order from zero-state ratings, rewriting the
    /// embedded before-game snapshots and committing the final ratings to the
    /// player store. Deterministic and safe to re-run; used to repair drift
    /// after manual result edits.
    pub async fn recalculate_all_ratings(
        &self,
        players: &PlayerService,
        strategy: &dyn RatingStrategy,
    ) -> Result<usize, LedgerServiceError> {
        let mut state = self.state.lock().await;

        let mut games: Vec<Game> = state.buckets.values().flatten().cloned().collect();
        games.sort_by_key(|game| game.id);
        for pair in games.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(LedgerServiceError::MalformedLedger(format!(
                    "Duplicate game id {}",
                    pair[0].id
                )));
            }
        }

        let mut tracked: HashMap<(String, String), Rating> = HashMap::new();
        let mut replayed: Vec<Game> = Vec::with_capacity(games.len());
        for mut game in games {
            if game.white == game.black {
                return Err(LedgerServiceError::MalformedLedger(format!(
                    "Game {} lists {} on both sides",
                    game.id, game.white
                )));
            }

            let white_key = (game.white.clone(), game.time_control_id.clone());
            let black_key = (game.black.clone(), game.time_control_id.clone());
            game.white_rating_before = tracked
                .get(&white_key)
                .cloned()
                .unwrap_or_else(|| strategy.zero());
            game.black_rating_before = tracked
                .get(&black_key)
                .cloned()
                .unwrap_or_else(|| strategy.zero());

            let (new_white, new_black) = strategy.compute(&game)?;
            tracked.insert(white_key, new_white);
            tracked.insert(black_key, new_black);
            replayed.push(game);
        }

        // The rewritten snapshots become the durable history before the
        // in-memory index moves.
        for game in &replayed {
            self.repository.put_game(game).await?;
        }

        state.buckets.clear();
        let count = replayed.len();
        for game in replayed {
            state
                .buckets
                .entry(game.bucket_key())
                .or_default()
                .push(game);
        }

        for ((username, time_control_id), rating) in tracked {
            players
                .commit_rating(&username, &time_control_id, rating)
                .await?;
        }

        info!("Recalculated ratings from {} games", count);
        Ok(count)
    }
}
