#[derive(Debug)]
pub enum PlayerRepositoryError {
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for PlayerRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            PlayerRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for PlayerRepositoryError {}
