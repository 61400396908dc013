use std::collections::HashMap;

use crate::models::challenge::Challenge;
use crate::repositories::errors::challenge_repository_errors::ChallengeRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_attribute_value, to_item};

#[cfg(test)]
use mockall::automock;

pub struct DynamoDbChallengeRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbChallengeRepository {
    pub fn new(client: Client) -> Self {
        let table_name = std::env::var("CHALLENGES_TABLE")
            .expect("CHALLENGES_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait ChallengeRepository: Send + Sync {
    async fn put_challenge(&self, challenge: &Challenge) -> Result<(), ChallengeRepositoryError>;
    async fn get_challenge(&self, id: &str)
        -> Result<Option<Challenge>, ChallengeRepositoryError>;
    async fn delete_challenge(&self, id: &str) -> Result<(), ChallengeRepositoryError>;
    async fn list_challenges(&self) -> Result<Vec<Challenge>, ChallengeRepositoryError>;
}

#[async_trait]
impl ChallengeRepository for DynamoDbChallengeRepository {
    async fn put_challenge(&self, challenge: &Challenge) -> Result<(), ChallengeRepositoryError> {
        let item: HashMap<String, AttributeValue> = to_item(challenge)
            .map_err(|e| ChallengeRepositoryError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| ChallengeRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn get_challenge(
        &self,
        id: &str,
    ) -> Result<Option<Challenge>, ChallengeRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(id)
                    .map_err(|e| ChallengeRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| ChallengeRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = output.item {
            let challenge: Challenge = from_item(item)
                .map_err(|e| ChallengeRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(challenge))
        } else {
            Ok(None)
        }
    }

    async fn delete_challenge(&self, id: &str) -> Result<(), ChallengeRepositoryError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(id)
                    .map_err(|e| ChallengeRepositoryError::Serialization(e.to_string()))?,
            )
            .condition_expression("attribute_exists(id)")
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("ConditionalCheckFailedException") {
                    Err(ChallengeRepositoryError::NotFound)
                } else {
                    Err(ChallengeRepositoryError::DynamoDb(error_str))
                }
            }
        }
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, ChallengeRepositoryError> {
        let mut items = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| ChallengeRepositoryError::DynamoDb(e.to_string()))?;
            if let Some(batch) = output.items {
                items.extend(batch);
            }
            start_key = output.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        items
            .into_iter()
            .map(|item| {
                from_item(item).map_err(|e| ChallengeRepositoryError::Serialization(e.to_string()))
            })
            .collect()
    }
}
