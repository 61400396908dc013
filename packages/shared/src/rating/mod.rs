pub mod elo;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::game::Game;
use crate::rating::elo::{EloRating, EloStrategy};

/// A per-player, per-time-control rating record. Each variant belongs to one
/// registered strategy; the enum is untagged so records keep the strategy's
/// own flat field names on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Elo(EloRating),
}

impl Rating {
    pub fn value(&self) -> f64 {
        match self {
            Rating::Elo(rating) => rating.value,
        }
    }

    pub fn games_played(&self) -> u32 {
        match self {
            Rating::Elo(rating) => rating.games_played,
        }
    }
}

#[derive(Debug)]
pub enum RatingError {
    UnknownSystem(String),
    Malformed(String),
}

impl std::fmt::Display for RatingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingError::UnknownSystem(name) => {
                write!(f, "Unknown rating system: {}", name)
            }
            RatingError::Malformed(msg) => write!(f, "Malformed rating record: {}", msg),
        }
    }
}

impl std::error::Error for RatingError {}

/// A pluggable rating formula.
///
/// `compute` is a pure function over the before-game snapshots embedded in
/// the game record; it returns new records and never mutates shared state.
/// The caller commits the result to the player store.
pub trait RatingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// The record a player starts from before their first rated game.
    fn zero(&self) -> Rating;

    /// Maps a finalized game to the two updated ratings, white first.
    fn compute(&self, game: &Game) -> Result<(Rating, Rating), RatingError>;

    /// Strict deserialization of a stored record. Missing or malformed
    /// fields are an error, never defaulted.
    fn deserialize(&self, value: &serde_json::Value) -> Result<Rating, RatingError>;
}

/// All strategies known to this build, keyed by configuration name.
pub fn registry() -> HashMap<&'static str, Arc<dyn RatingStrategy>> {
    let mut systems: HashMap<&'static str, Arc<dyn RatingStrategy>> = HashMap::new();
    let elo = EloStrategy;
    systems.insert(elo.name(), Arc::new(elo));
    systems
}

/// Resolves the configured rating system once at startup.
pub fn resolve(name: &str) -> Result<Arc<dyn RatingStrategy>, RatingError> {
    registry()
        .remove(name)
        .ok_or_else(|| RatingError::UnknownSystem(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_elo() {
        let strategy = resolve("elo").unwrap();
        assert_eq!(strategy.name(), "elo");
    }

    #[test]
    fn test_registry_rejects_unknown_system() {
        let result = resolve("glicko2");
        assert!(matches!(result, Err(RatingError::UnknownSystem(name)) if name == "glicko2"));
    }

    #[test]
    fn test_rating_serializes_flat() {
        let rating = resolve("elo").unwrap().zero();
        let json = serde_json::to_value(&rating).unwrap();

        // Untagged: the record keeps the strategy's field names at top level.
        assert!(json.get("value").is_some());
        assert!(json.get("K").is_some());
        assert!(json.get("Elo").is_none());
    }
}
