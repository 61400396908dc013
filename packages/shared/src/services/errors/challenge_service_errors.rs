use crate::rating::RatingError;
use crate::repositories::errors::challenge_repository_errors::ChallengeRepositoryError;
use crate::services::errors::ledger_service_errors::LedgerServiceError;
use crate::services::errors::player_service_errors::PlayerServiceError;

/// Guard violations are raised before any state is touched; the surrounding
/// layer maps them to user-facing messages.
#[derive(Debug)]
pub enum ChallengeServiceError {
    ChallengeNotFound,
    SenderIsReceiver,
    AlreadyAccepted,
    NotAccepted,
    PlayersNotDistinct,
    NotParticipant(String),
    SetterNotPlaying(String),
    ResultNotSet,
    AgreerNotPlaying(String),
    AgreerIsSetter(String),
    ValidationError(String),
    RepositoryError(ChallengeRepositoryError),
    LedgerError(LedgerServiceError),
    PlayerError(PlayerServiceError),
    RatingError(RatingError),
}

impl std::fmt::Display for ChallengeServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeServiceError::ChallengeNotFound => write!(f, "Challenge not found"),
            ChallengeServiceError::SenderIsReceiver => {
                write!(f, "A member cannot challenge themselves")
            }
            ChallengeServiceError::AlreadyAccepted => {
                write!(f, "Challenge has already been accepted")
            }
            ChallengeServiceError::NotAccepted => {
                write!(f, "Challenge has not been accepted yet")
            }
            ChallengeServiceError::PlayersNotDistinct => {
                write!(f, "White and black must be different members")
            }
            ChallengeServiceError::NotParticipant(username) => {
                write!(f, "{} is not part of this challenge", username)
            }
            ChallengeServiceError::SetterNotPlaying(username) => {
                write!(f, "{} is not playing in this game", username)
            }
            ChallengeServiceError::ResultNotSet => {
                write!(f, "No result has been proposed for this challenge")
            }
            ChallengeServiceError::AgreerNotPlaying(username) => {
                write!(f, "{} is not playing in this game", username)
            }
            ChallengeServiceError::AgreerIsSetter(username) => {
                write!(f, "{} cannot agree to their own proposed result", username)
            }
            ChallengeServiceError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            ChallengeServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            ChallengeServiceError::LedgerError(err) => write!(f, "Ledger error: {}", err),
            ChallengeServiceError::PlayerError(err) => write!(f, "Player error: {}", err),
            ChallengeServiceError::RatingError(err) => write!(f, "Rating error: {}", err),
        }
    }
}

impl std::error::Error for ChallengeServiceError {}

impl From<ChallengeRepositoryError> for ChallengeServiceError {
    fn from(err: ChallengeRepositoryError) -> Self {
        ChallengeServiceError::RepositoryError(err)
    }
}

impl From<LedgerServiceError> for ChallengeServiceError {
    fn from(err: LedgerServiceError) -> Self {
        ChallengeServiceError::LedgerError(err)
    }
}

impl From<PlayerServiceError> for ChallengeServiceError {
    fn from(err: PlayerServiceError) -> Self {
        ChallengeServiceError::PlayerError(err)
    }
}

impl From<RatingError> for ChallengeServiceError {
    fn from(err: RatingError) -> Self {
        ChallengeServiceError::RatingError(err)
    }
}
