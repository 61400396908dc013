use std::collections::HashMap;

use crate::models::game::Game;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};

#[cfg(test)]
use mockall::automock;

/// Games are partitioned by the calendar day they were played, with the game
/// id as sort key. The partition attribute is derived from the record here so
/// the model itself stays bucket-agnostic.
pub struct DynamoDbGameRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client) -> Self {
        let table_name =
            std::env::var("GAMES_TABLE").expect("GAMES_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait GameRepository: Send + Sync {
    async fn put_game(&self, game: &Game) -> Result<(), GameRepositoryError>;
    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError>;
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn put_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let mut item: HashMap<String, AttributeValue> =
            to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        item.insert(
            "played_on".to_string(),
            AttributeValue::S(game.bucket_key()),
        );
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError> {
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
                .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;
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
                from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))
            })
            .collect()
    }
}
