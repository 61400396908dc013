use serde::{Deserialize, Serialize};

use crate::models::game::{Game, GameResult};
use crate::rating::{Rating, RatingError, RatingStrategy};

/// Rating every player starts from before their first rated game.
pub const STARTING_VALUE: f64 = 1500.0;

/// Players with fewer rated games than this keep the high provisional K.
const PROVISIONAL_GAMES: u32 = 30;

/// Crossing this rating with an established game count locks K at 10.
const MASTER_THRESHOLD: f64 = 2400.0;

const K_PROVISIONAL: u32 = 40;
const K_ESTABLISHED: u32 = 20;
const K_MASTER: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloRating {
    pub value: f64,
    pub games_played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    #[serde(rename = "K")]
    pub k: u32,
    pub surpassed_threshold: bool,
}

impl EloRating {
    pub fn zero() -> Self {
        EloRating {
            value: STARTING_VALUE,
            games_played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            k: K_PROVISIONAL,
            surpassed_threshold: false,
        }
    }
}

enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    fn score(&self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Loss => 0.0,
        }
    }
}

/// Probability of scoring against the given opponent.
pub fn expected_score(own: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - own) / 400.0))
}

pub struct EloStrategy;

impl EloStrategy {
    fn update(rating: &EloRating, outcome: Outcome, opponent_value: f64) -> EloRating {
        let expected = expected_score(rating.value, opponent_value);
        let mut next = rating.clone();

        next.value = rating.value + f64::from(rating.k) * (outcome.score() - expected);
        next.games_played += 1;
        match outcome {
            Outcome::Win => next.won += 1,
            Outcome::Draw => next.drawn += 1,
            Outcome::Loss => next.lost += 1,
        }

        // K transition runs on the *updated* record. The surpassed flag is a
        // one-way ratchet: once a player has crossed the master threshold,
        // dropping back under it never restores a higher K.
        let (k, surpassed) = Self::next_k(&next);
        next.k = k;
        next.surpassed_threshold = surpassed;
        next
    }

    fn next_k(rating: &EloRating) -> (u32, bool) {
        if rating.surpassed_threshold {
            (K_MASTER, true)
        } else if rating.games_played < PROVISIONAL_GAMES {
            (K_PROVISIONAL, false)
        } else if rating.value < MASTER_THRESHOLD {
            (K_ESTABLISHED, false)
        } else {
            (K_MASTER, true)
        }
    }
}

impl RatingStrategy for EloStrategy {
    fn name(&self) -> &'static str {
        "elo"
    }

    fn zero(&self) -> Rating {
        Rating::Elo(EloRating::zero())
    }

    fn compute(&self, game: &Game) -> Result<(Rating, Rating), RatingError> {
        let Rating::Elo(white) = &game.white_rating_before;
        let Rating::Elo(black) = &game.black_rating_before;

        let (white_outcome, black_outcome) = match game.result {
            GameResult::WhiteWins => (Outcome::Win, Outcome::Loss),
            GameResult::Draw => (Outcome::Draw, Outcome::Draw),
            GameResult::BlackWins => (Outcome::Loss, Outcome::Win),
        };

        let new_white = Self::update(white, white_outcome, black.value);
        let new_black = Self::update(black, black_outcome, white.value);
        Ok((Rating::Elo(new_white), Rating::Elo(new_black)))
    }

    fn deserialize(&self, value: &serde_json::Value) -> Result<Rating, RatingError> {
        serde_json::from_value::<EloRating>(value.clone())
            .map(Rating::Elo)
            .map_err(|e| RatingError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use test_case::test_case;

    fn game_between(white: EloRating, black: EloRating, result: GameResult) -> Game {
        Game {
            id: 1,
            white: "alice".to_string(),
            white_rating_before: Rating::Elo(white),
            black: "bob".to_string(),
            black_rating_before: Rating::Elo(black),
            result,
            time_control_id: "blitz".to_string(),
            time_control_name: "Blitz".to_string(),
            played_at: Utc::now(),
        }
    }

    fn rating(value: f64, games_played: u32, k: u32, surpassed: bool) -> EloRating {
        // Spread prior results over the win/draw/loss counters so the
        // games_played invariant holds in every fixture.
        EloRating {
            value,
            games_played,
            won: games_played,
            drawn: 0,
            lost: 0,
            k,
            surpassed_threshold: surpassed,
        }
    }

    fn unwrap_elo(rating: Rating) -> EloRating {
        let Rating::Elo(inner) = rating;
        inner
    }

    #[test]
    fn test_expected_score_is_half_for_equal_ratings() {
        assert_eq!(expected_score(1500.0, 1500.0), 0.5);
        assert!(expected_score(1700.0, 1500.0) > 0.5);
        assert!(expected_score(1500.0, 1700.0) < 0.5);
    }

    #[test_case(GameResult::WhiteWins, 1520.0, 1480.0 ; "white win moves twenty points")]
    #[test_case(GameResult::Draw, 1500.0, 1500.0 ; "draw between equals moves nothing")]
    #[test_case(GameResult::BlackWins, 1480.0, 1520.0 ; "black win moves twenty points")]
    fn test_round_numbers_for_equal_fresh_players(
        result: GameResult,
        expected_white: f64,
        expected_black: f64,
    ) {
        let game = game_between(EloRating::zero(), EloRating::zero(), result);
        let (white, black) = EloStrategy.compute(&game).unwrap();

        assert_eq!(white.value(), expected_white);
        assert_eq!(black.value(), expected_black);
    }

    #[test]
    fn test_counters_track_the_result() {
        let game = game_between(EloRating::zero(), EloRating::zero(), GameResult::WhiteWins);
        let (white, black) = EloStrategy.compute(&game).unwrap();
        let (white, black) = (unwrap_elo(white), unwrap_elo(black));

        assert_eq!((white.games_played, white.won, white.lost), (1, 1, 0));
        assert_eq!((black.games_played, black.lost, black.won), (1, 1, 0));
        assert_eq!(
            white.games_played,
            white.won + white.drawn + white.lost
        );
    }

    #[test_case(0, 1500.0, 40 ; "fresh player keeps provisional k")]
    #[test_case(28, 1500.0, 40 ; "twenty ninth game still provisional")]
    #[test_case(29, 1500.0, 20 ; "thirtieth game drops to established k")]
    fn test_k_transition_on_updated_game_count(games_before: u32, value: f64, expected_k: u32) {
        let white = rating(value, games_before, 40, false);
        let game = game_between(white, rating(value, 40, 20, false), GameResult::Draw);
        let (white, _) = EloStrategy.compute(&game).unwrap();

        assert_eq!(unwrap_elo(white).k, expected_k);
    }

    #[test]
    fn test_crossing_threshold_on_thirtieth_game_locks_master_k() {
        // 2390 + 40 * (1 - 0.5) = 2410 on the updated record.
        let white = rating(2390.0, 29, 40, false);
        let black = rating(2390.0, 100, 20, false);
        let game = game_between(white, black, GameResult::WhiteWins);

        let (white, _) = EloStrategy.compute(&game).unwrap();
        let white = unwrap_elo(white);

        assert!(white.value >= MASTER_THRESHOLD);
        assert_eq!(white.k, K_MASTER);
        assert!(white.surpassed_threshold);
    }

    #[test]
    fn test_established_player_crossing_threshold_locks_master_k() {
        let white = rating(2395.0, 80, 20, false);
        let black = rating(2395.0, 80, 20, false);
        let game = game_between(white, black, GameResult::WhiteWins);

        let (white, _) = EloStrategy.compute(&game).unwrap();
        let white = unwrap_elo(white);

        assert_eq!(white.value, 2405.0);
        assert_eq!(white.k, K_MASTER);
        assert!(white.surpassed_threshold);
    }

    #[test]
    fn test_ratchet_keeps_master_k_below_threshold() {
        // A long losing streak takes the player well under 2400 again; the
        // flag and K must not move.
        let mut white = rating(2405.0, 50, 10, true);
        for _ in 0..10 {
            let game = game_between(
                white.clone(),
                rating(2405.0, 50, 10, true),
                GameResult::BlackWins,
            );
            let (updated, _) = EloStrategy.compute(&game).unwrap();
            white = unwrap_elo(updated);
        }

        assert!(white.value < MASTER_THRESHOLD);
        assert_eq!(white.k, K_MASTER);
        assert!(white.surpassed_threshold);
    }

    #[test]
    fn test_strict_deserialization_rejects_missing_fields() {
        let missing_k = serde_json::json!({
            "value": 1500.0,
            "games_played": 0,
            "won": 0,
            "drawn": 0,
            "lost": 0,
            "surpassed_threshold": false
        });
        assert!(matches!(
            EloStrategy.deserialize(&missing_k),
            Err(RatingError::Malformed(_))
        ));
    }

    #[test]
    fn test_deserialization_round_trip() {
        let original = EloStrategy.zero();
        let value = serde_json::to_value(&original).unwrap();
        let restored = EloStrategy.deserialize(&value).unwrap();
        assert_eq!(restored, original);
    }

    proptest! {
        #[test]
        fn prop_delta_matches_formula_exactly(
            white_value in 100.0f64..2800.0,
            black_value in 100.0f64..2800.0,
            result_index in 0usize..3,
        ) {
            let result = [GameResult::WhiteWins, GameResult::Draw, GameResult::BlackWins][result_index];
            let white = rating(white_value, 10, 40, false);
            let black = rating(black_value, 10, 40, false);
            let game = game_between(white.clone(), black.clone(), result);

            let (new_white, new_black) = EloStrategy.compute(&game).unwrap();
            let (new_white, new_black) = (unwrap_elo(new_white), unwrap_elo(new_black));

            let white_score = match result {
                GameResult::WhiteWins => 1.0,
                GameResult::Draw => 0.5,
                GameResult::BlackWins => 0.0,
            };
            let expected_white =
                white.value + f64::from(white.k) * (white_score - expected_score(white.value, black.value));
            let expected_black = black.value
                + f64::from(black.k) * ((1.0 - white_score) - expected_score(black.value, white.value));

            prop_assert_eq!(new_white.value, expected_white);
            prop_assert_eq!(new_black.value, expected_black);
            prop_assert_eq!(new_white.games_played, new_white.won + new_white.drawn + new_white.lost);
            prop_assert_eq!(new_black.games_played, new_black.won + new_black.drawn + new_black.lost);
        }

        #[test]
        fn prop_draw_deltas_cancel_for_equal_k(
            white_value in 1000.0f64..2000.0,
            black_value in 1000.0f64..2000.0,
        ) {
            let white = rating(white_value, 10, 40, false);
            let black = rating(black_value, 10, 40, false);
            let game = game_between(white.clone(), black.clone(), GameResult::Draw);

            let (new_white, new_black) = EloStrategy.compute(&game).unwrap();
            let total_delta =
                (new_white.value() - white.value) + (new_black.value() - black.value);

            prop_assert!(total_delta.abs() < 1e-9);
        }
    }
}
