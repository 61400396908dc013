use crate::models::time_control::{self, TimeControl};

/// Runtime configuration for the rating core: which rating system is active
/// and which time controls the club tracks.
#[derive(Debug, Clone)]
pub struct Config {
    pub rating_system: String,
    pub time_controls: Vec<TimeControl>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(String),
    Malformed(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(name) => {
                write!(f, "{} environment variable must be set", name)
            }
            ConfigError::Malformed(msg) => write!(f, "Malformed configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn new(rating_system: &str, time_controls: Vec<TimeControl>) -> Self {
        Config {
            rating_system: rating_system.to_string(),
            time_controls,
        }
    }

    /// Reads `RATING_SYSTEM` (defaults to "elo") and `TIME_CONTROLS`, a JSON
    /// array of `{id, name}` pairs.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rating_system =
            std::env::var("RATING_SYSTEM").unwrap_or_else(|_| "elo".to_string());
        let raw = std::env::var("TIME_CONTROLS")
            .map_err(|_| ConfigError::MissingVar("TIME_CONTROLS".to_string()))?;
        let time_controls: Vec<TimeControl> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Ok(Config {
            rating_system,
            time_controls,
        })
    }

    /// Time controls with duplicate ids collapsed; ratings are keyed by id.
    pub fn unique_time_controls(&self) -> Vec<TimeControl> {
        time_control::unique_by_id(&self.time_controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_time_controls_deduplicates_ids() {
        let config = Config::new(
            "elo",
            vec![
                TimeControl {
                    id: "blitz".to_string(),
                    name: "Blitz".to_string(),
                },
                TimeControl {
                    id: "blitz".to_string(),
                    name: "Blitz 3+2".to_string(),
                },
            ],
        );

        let unique = config.unique_time_controls();
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].name, "Blitz");
    }

    #[test]
    fn test_time_controls_parse_from_json() {
        let raw = r#"[{"id": "blitz", "name": "Blitz"}, {"id": "rapid", "name": "Rapid"}]"#;
        let parsed: Vec<TimeControl> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].id, "rapid");
    }
}
