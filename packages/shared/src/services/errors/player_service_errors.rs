use crate::repositories::errors::player_repository_errors::PlayerRepositoryError;

#[derive(Debug)]
pub enum PlayerServiceError {
    PlayerNotFound,
    PlayerAlreadyExists,
    ValidationError(String),
    RepositoryError(PlayerRepositoryError),
}

impl std::fmt::Display for PlayerServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerServiceError::PlayerNotFound => write!(f, "Player not found"),
            PlayerServiceError::PlayerAlreadyExists => write!(f, "Player already exists"),
            PlayerServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            PlayerServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for PlayerServiceError {}

impl From<PlayerRepositoryError> for PlayerServiceError {
    fn from(err: PlayerRepositoryError) -> Self {
        PlayerServiceError::RepositoryError(err)
    }
}
