use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rating::Rating;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    WhiteWins,
    Draw,
    BlackWins,
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::WhiteWins => write!(f, "white_wins"),
            GameResult::Draw => write!(f, "draw"),
            GameResult::BlackWins => write!(f, "black_wins"),
        }
    }
}

/// An immutable finalized match record.
///
/// The embedded ratings are value snapshots taken *before* the game was
/// applied, so history can be replayed and increments recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub white: String,
    pub white_rating_before: Rating,
    pub black: String,
    pub black_rating_before: Rating,
    pub result: GameResult,
    pub time_control_id: String,
    pub time_control_name: String,
    pub played_at: DateTime<Utc>,
}

impl Game {
    /// Calendar day the game was played, used as the ledger partition key.
    pub fn bucket_key(&self) -> String {
        self.played_at.format("%Y-%m-%d").to_string()
    }

    pub fn involves(&self, username: &str) -> bool {
        self.white == username || self.black == username
    }
}

/// A game that has not yet been committed to the ledger. The ledger assigns
/// the id when it appends the record.
#[derive(Debug, Clone)]
pub struct GameDraft {
    pub white: String,
    pub white_rating_before: Rating,
    pub black: String,
    pub black_rating_before: Rating,
    pub result: GameResult,
    pub time_control_id: String,
    pub time_control_name: String,
    pub played_at: DateTime<Utc>,
}

impl GameDraft {
    pub fn into_game(self, id: u64) -> Game {
        Game {
            id,
            white: self.white,
            white_rating_before: self.white_rating_before,
            black: self.black,
            black_rating_before: self.black_rating_before,
            result: self.result,
            time_control_id: self.time_control_id,
            time_control_name: self.time_control_name,
            played_at: self.played_at,
        }
    }
}
