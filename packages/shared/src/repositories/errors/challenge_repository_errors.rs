#[derive(Debug)]
pub enum ChallengeRepositoryError {
    NotFound,
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for ChallengeRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeRepositoryError::NotFound => write!(f, "Challenge not found"),
            ChallengeRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            ChallengeRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for ChallengeRepositoryError {}
