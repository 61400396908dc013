use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::game::GameResult;

/// A proposed outcome attached to a pending challenge.
///
/// The fields in this group only ever exist together: proposing a result
/// populates all of them in one update and retracting it clears the whole
/// group. Keeping them in a single optional struct makes a half-populated
/// proposal unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultProposal {
    pub white: String,
    pub black: String,
    pub result: GameResult,
    pub time_control_id: String,
    pub time_control_name: String,
    pub result_set_by: String,
    pub result_set_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_accepted_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_accepted_at: Option<DateTime<Utc>>,
}

/// A pending negotiation between two club members, from the initial send up
/// to (but not including) the finalized game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub proposal: Option<ResultProposal>,
}

impl Challenge {
    pub fn new(id: String, sender: &str, receiver: &str) -> Self {
        Challenge {
            id,
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            sent_at: Utc::now(),
            accepted_at: None,
            proposal: None,
        }
    }

    /// Challenge ids are zero-padded so that lexicographic order matches
    /// numeric order in the active set and in the persisted table.
    pub fn format_id(counter: u64) -> String {
        format!("{:08}", counter)
    }

    pub fn parse_id(id: &str) -> Option<u64> {
        id.parse::<u64>().ok()
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_at.is_some()
    }

    pub fn involves(&self, username: &str) -> bool {
        self.sender == username || self.receiver == username
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn challenge_with_proposal() -> Challenge {
        let mut challenge = Challenge::new(Challenge::format_id(4), "alice", "bob");
        challenge.accepted_at = Some(Utc::now());
        challenge.proposal = Some(ResultProposal {
            white: "alice".to_string(),
            black: "bob".to_string(),
            result: GameResult::WhiteWins,
            time_control_id: "blitz".to_string(),
            time_control_name: "Blitz".to_string(),
            result_set_by: "alice".to_string(),
            result_set_at: Utc::now(),
            result_accepted_by: None,
            result_accepted_at: None,
        });
        challenge
    }

    #[test]
    fn test_id_formatting_is_zero_padded_and_ordered() {
        assert_eq!(Challenge::format_id(0), "00000000");
        assert_eq!(Challenge::format_id(42), "00000042");
        assert!(Challenge::format_id(9) < Challenge::format_id(10));
        assert_eq!(Challenge::parse_id("00000042"), Some(42));
        assert_eq!(Challenge::parse_id("not-a-number"), None);
    }

    #[test]
    fn test_involves_matches_sender_and_receiver_only() {
        let challenge = Challenge::new(Challenge::format_id(0), "alice", "bob");
        assert!(challenge.involves("alice"));
        assert!(challenge.involves("bob"));
        assert!(!challenge.involves("carol"));
    }

    #[test]
    fn test_fresh_challenge_serializes_without_optional_fields() {
        let challenge = Challenge::new(Challenge::format_id(0), "alice", "bob");
        let json = serde_json::to_value(&challenge).unwrap();

        assert_eq!(json["id"], "00000000");
        assert_eq!(json["sender"], "alice");
        assert!(json.get("accepted_at").is_none());
        assert!(json.get("white").is_none());
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_proposal_fields_serialize_flat() {
        let challenge = challenge_with_proposal();
        let json = serde_json::to_value(&challenge).unwrap();

        // The proposal group keeps the record's original flat field names.
        assert_eq!(json["white"], "alice");
        assert_eq!(json["black"], "bob");
        assert_eq!(json["result"], "white_wins");
        assert_eq!(json["time_control_id"], "blitz");
        assert_eq!(json["result_set_by"], "alice");
        assert!(json.get("proposal").is_none());
        assert!(json.get("result_accepted_by").is_none());
    }

    #[test]
    fn test_round_trip_from_string_and_value_forms() {
        for challenge in [
            Challenge::new(Challenge::format_id(7), "carol", "dave"),
            challenge_with_proposal(),
        ] {
            let serialized = serde_json::to_string(&challenge).unwrap();
            let from_str: Challenge = serde_json::from_str(&serialized).unwrap();
            assert_eq!(from_str, challenge);

            let value = serde_json::to_value(&challenge).unwrap();
            let from_value: Challenge = serde_json::from_value(value).unwrap();
            assert_eq!(from_value, challenge);
        }
    }

    #[test]
    fn test_partial_proposal_is_rejected() {
        // A record with only some of the proposal fields is malformed and
        // must not deserialize into a half-populated proposal.
        let json = r#"{
            "id": "00000001",
            "sender": "alice",
            "receiver": "bob",
            "sent_at": "2024-03-01T12:00:00Z",
            "white": "alice"
        }"#;
        assert!(serde_json::from_str::<Challenge>(json).is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip_preserves_equality(
            counter in 0u64..10_000,
            sender in "[a-z]{3,10}",
            receiver in "[a-z]{3,10}",
        ) {
            let challenge = Challenge::new(Challenge::format_id(counter), &sender, &receiver);
            let serialized = serde_json::to_string(&challenge).unwrap();
            let deserialized: Challenge = serde_json::from_str(&serialized).unwrap();
            prop_assert_eq!(deserialized, challenge);
        }
    }
}
