use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rating::Rating;

/// A club member and their per-time-control ratings, keyed by time control
/// id. Identity and credentials live with the surrounding system; the core
/// only tracks what it needs to rate games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub ratings: HashMap<String, Rating>,
}

impl Player {
    pub fn new(username: &str) -> Self {
        Player {
            username: username.to_string(),
            created_at: Utc::now(),
            ratings: HashMap::new(),
        }
    }

    pub fn rating(&self, time_control_id: &str) -> Option<&Rating> {
        self.ratings.get(time_control_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::elo::EloRating;

    #[test]
    fn test_new_player_has_no_ratings() {
        let player = Player::new("alice");
        assert_eq!(player.username, "alice");
        assert!(player.ratings.is_empty());
        assert!(player.rating("blitz").is_none());
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut player = Player::new("bob");
        player
            .ratings
            .insert("blitz".to_string(), Rating::Elo(EloRating::zero()));

        let serialized = serde_json::to_string(&player).unwrap();
        let deserialized: Player = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, player);
    }
}
