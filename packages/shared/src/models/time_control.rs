use serde::{Deserialize, Serialize};

/// A named game-speed category (e.g. Blitz) under which ratings are tracked
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    pub id: String,
    pub name: String,
}

/// Configuration may list several time controls sharing one id under
/// different display names. Ratings are keyed by id, so the unique-id set is
/// what matters; the first name listed for an id wins.
pub fn unique_by_id(controls: &[TimeControl]) -> Vec<TimeControl> {
    let mut seen = std::collections::HashSet::new();
    controls
        .iter()
        .filter(|tc| seen.insert(tc.id.clone()))
        .cloned()
        .collect()
}
