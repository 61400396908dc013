use crate::rating::RatingError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::services::errors::player_service_errors::PlayerServiceError;

#[derive(Debug)]
pub enum LedgerServiceError {
    GameNotFound,
    MalformedLedger(String),
    RepositoryError(GameRepositoryError),
    RatingError(RatingError),
    PlayerError(PlayerServiceError),
}

impl std::fmt::Display for LedgerServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerServiceError::GameNotFound => write!(f, "Game not found"),
            LedgerServiceError::MalformedLedger(msg) => {
                write!(f, "Malformed ledger: {}", msg)
            }
            LedgerServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            LedgerServiceError::RatingError(err) => write!(f, "Rating error: {}", err),
            LedgerServiceError::PlayerError(err) => write!(f, "Player error: {}", err),
        }
    }
}

impl std::error::Error for LedgerServiceError {}

impl From<GameRepositoryError> for LedgerServiceError {
    fn from(err: GameRepositoryError) -> Self {
        LedgerServiceError::RepositoryError(err)
    }
}

impl From<RatingError> for LedgerServiceError {
    fn from(err: RatingError) -> Self {
        LedgerServiceError::RatingError(err)
    }
}

impl From<PlayerServiceError> for LedgerServiceError {
    fn from(err: PlayerServiceError) -> Self {
        LedgerServiceError::PlayerError(err)
    }
}
