use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::models::player::Player;
use crate::models::time_control::{self, TimeControl};
use crate::rating::{Rating, RatingStrategy};
use crate::repositories::player_repository::PlayerRepository;
use crate::services::errors::player_service_errors::PlayerServiceError;

/// Authoritative in-memory index from username to player record. Lookups are
/// O(1) by username; durable copies are written through the repository before
/// the in-memory index is touched.
pub struct PlayerService {
    repository: Arc<dyn PlayerRepository + Send + Sync>,
    strategy: Arc<dyn RatingStrategy>,
    time_controls: Vec<TimeControl>,
    players: RwLock<HashMap<String, Player>>,
}

impl PlayerService {
    pub fn new(
        repository: Arc<dyn PlayerRepository + Send + Sync>,
        strategy: Arc<dyn RatingStrategy>,
        time_controls: Vec<TimeControl>,
    ) -> Self {
        PlayerService {
            repository,
            strategy,
            time_controls: time_control::unique_by_id(&time_controls),
            players: RwLock::new(HashMap::new()),
        }
    }

    /// Replays every persisted player record into the in-memory index.
    pub async fn load(&self) -> Result<usize, PlayerServiceError> {
        let records = self.repository.list_players().await?;
        let mut players = self.players.write().await;
        players.clear();
        for player in records {
            players.insert(player.username.clone(), player);
        }
        Ok(players.len())
    }

    pub async fn register_player(&self, username: &str) -> Result<Player, PlayerServiceError> {
        if username.is_empty() {
            return Err(PlayerServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if self.players.read().await.contains_key(username) {
            return Err(PlayerServiceError::PlayerAlreadyExists);
        }

        let mut player = Player::new(username);
        for tc in &self.time_controls {
            player
                .ratings
                .insert(tc.id.clone(), self.strategy.zero());
        }

        self.repository.put_player(&player).await?;
        self.players
            .write()
            .await
            .insert(username.to_string(), player.clone());
        info!("Registered player: {}", username);
        Ok(player)
    }

    pub async fn get_player(&self, username: &str) -> Option<Player> {
        self.players.read().await.get(username).cloned()
    }

    /// Read-only snapshot of every player, sorted by username.
    pub async fn players(&self) -> Vec<Player> {
        let mut all: Vec<Player> = self.players.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        all
    }

    pub async fn count(&self) -> usize {
        self.players.read().await.len()
    }

    /// Ensures the player has a rating record for the given time control.
    /// No-op if one is already present.
    pub async fn add_time_control_rating(
        &self,
        username: &str,
        time_control_id: &str,
    ) -> Result<(), PlayerServiceError> {
        let current = self
            .get_player(username)
            .await
            .ok_or(PlayerServiceError::PlayerNotFound)?;
        if current.ratings.contains_key(time_control_id) {
            return Ok(());
        }

        let mut updated = current;
        updated
            .ratings
            .insert(time_control_id.to_string(), self.strategy.zero());
        self.repository.put_player(&updated).await?;
        self.players
            .write()
            .await
            .insert(username.to_string(), updated);
        Ok(())
    }

    pub async fn rating_for(&self, username: &str, time_control_id: &str) -> Option<Rating> {
        self.players
            .read()
            .await
            .get(username)
            .and_then(|player| player.rating(time_control_id))
            .cloned()
    }

    /// Commits a recomputed rating: durable write first, then the index.
    /// Creates the player record if the ledger references a member with no
    /// stored record, which can happen during a replay.
    pub async fn commit_rating(
        &self,
        username: &str,
        time_control_id: &str,
        rating: Rating,
    ) -> Result<(), PlayerServiceError> {
        let mut updated = self
            .get_player(username)
            .await
            .unwrap_or_else(|| Player::new(username));
        updated.ratings.insert(time_control_id.to_string(), rating);

        self.repository.put_player(&updated).await?;
        self.players
            .write()
            .await
            .insert(username.to_string(), updated);
        Ok(())
    }

    /// Club ladder for one time control: rating value descending, ties broken
    /// by username.
    pub async fn standings(&self, time_control_id: &str) -> Vec<(String, Rating)> {
        let players = self.players.read().await;
        let mut rows: Vec<(String, Rating)> = players
            .values()
            .filter_map(|player| {
                player
                    .rating(time_control_id)
                    .map(|rating| (player.username.clone(), rating.clone()))
            })
            .collect();
        rows.sort_by(|a, b| {
            b.1.value()
                .partial_cmp(&a.1.value())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        rows
    }

    pub fn time_controls(&self) -> &[TimeControl] {
        &self.time_controls
    }
}
