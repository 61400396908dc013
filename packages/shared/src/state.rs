use std::sync::Arc;

use aws_sdk_dynamodb::Client;

use crate::config::Config;
use crate::rating::{self, RatingError, RatingStrategy};
use crate::repositories::challenge_repository::DynamoDbChallengeRepository;
use crate::repositories::game_repository::DynamoDbGameRepository;
use crate::repositories::player_repository::DynamoDbPlayerRepository;
use crate::services::challenge_service::ChallengeService;
use crate::services::errors::challenge_service_errors::ChallengeServiceError;
use crate::services::errors::ledger_service_errors::LedgerServiceError;
use crate::services::errors::player_service_errors::PlayerServiceError;
use crate::services::ledger_service::LedgerService;
use crate::services::player_service::PlayerService;

/// The explicitly-constructed service graph. Stores are owned here and passed
/// by reference; nothing lives in module-level statics.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub strategy: Arc<dyn RatingStrategy>,
    pub players: Arc<PlayerService>,
    pub ledger: Arc<LedgerService>,
    pub challenges: Arc<ChallengeService>,
}

#[derive(Debug)]
pub enum StateLoadError {
    Players(PlayerServiceError),
    Ledger(LedgerServiceError),
    Challenges(ChallengeServiceError),
}

impl std::fmt::Display for StateLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateLoadError::Players(err) => write!(f, "Failed to load players: {}", err),
            StateLoadError::Ledger(err) => write!(f, "Failed to load games: {}", err),
            StateLoadError::Challenges(err) => {
                write!(f, "Failed to load challenges: {}", err)
            }
        }
    }
}

impl std::error::Error for StateLoadError {}

impl AppState {
    /// Wires repositories and services for the configured rating system.
    pub fn new(client: Client, config: Config) -> Result<Self, RatingError> {
        let strategy = rating::resolve(&config.rating_system)?;

        let players = Arc::new(PlayerService::new(
            Arc::new(DynamoDbPlayerRepository::new(client.clone())),
            strategy.clone(),
            config.time_controls.clone(),
        ));
        let ledger = Arc::new(LedgerService::new(Arc::new(DynamoDbGameRepository::new(
            client.clone(),
        ))));
        let challenges = Arc::new(ChallengeService::new(
            Arc::new(DynamoDbChallengeRepository::new(client)),
            ledger.clone(),
            players.clone(),
            strategy.clone(),
        ));

        Ok(AppState {
            config,
            strategy,
            players,
            ledger,
            challenges,
        })
    }

    /// Startup replay: loads every persisted record into the in-memory
    /// stores and restores the id counters.
    pub async fn load(&self) -> Result<(), StateLoadError> {
        self.players.load().await.map_err(StateLoadError::Players)?;
        self.ledger.load().await.map_err(StateLoadError::Ledger)?;
        self.challenges
            .load()
            .await
            .map_err(StateLoadError::Challenges)?;
        Ok(())
    }
}
