use std::collections::HashMap;

use crate::models::player::Player;
use crate::repositories::errors::player_repository_errors::PlayerRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_attribute_value, to_item};

#[cfg(test)]
use mockall::automock;

pub struct DynamoDbPlayerRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbPlayerRepository {
    pub fn new(client: Client) -> Self {
        let table_name = std::env::var("PLAYERS_TABLE")
            .expect("PLAYERS_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait PlayerRepository: Send + Sync {
    async fn put_player(&self, player: &Player) -> Result<(), PlayerRepositoryError>;
    async fn get_player(&self, username: &str) -> Result<Option<Player>, PlayerRepositoryError>;
    async fn list_players(&self) -> Result<Vec<Player>, PlayerRepositoryError>;
}

#[async_trait]
impl PlayerRepository for DynamoDbPlayerRepository {
    async fn put_player(&self, player: &Player) -> Result<(), PlayerRepositoryError> {
        let item: HashMap<String, AttributeValue> =
            to_item(player).map_err(|e| PlayerRepositoryError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| PlayerRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn get_player(&self, username: &str) -> Result<Option<Player>, PlayerRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                "username",
                to_attribute_value(username)
                    .map_err(|e| PlayerRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| PlayerRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = output.item {
            let player: Player =
                from_item(item).map_err(|e| PlayerRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(player))
        } else {
            Ok(None)
        }
    }

    async fn list_players(&self) -> Result<Vec<Player>, PlayerRepositoryError> {
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
                .map_err(|e| PlayerRepositoryError::DynamoDb(e.to_string()))?;
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
                from_item(item).map_err(|e| PlayerRepositoryError::Serialization(e.to_string()))
            })
            .collect()
    }
}
