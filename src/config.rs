use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

const ENV_PREFIX: &str = "LISTING_SCOUT";
const SETTINGS_FILE: &str = "listing_scout";

/// Runtime settings, layered from an optional `listing_scout.{toml,json,yaml}`
/// in the working directory and `LISTING_SCOUT_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Label table file; the embedded table is used when unset.
    pub labels_path: Option<PathBuf>,
    /// How many leading lines the boundary detector inspects.
    pub boundary_window: usize,
    /// How far past a toolbar marker the "Product" header may appear.
    pub header_lookahead: usize,
    /// Lookahead window between the Sales / number / Revenue lines in Trends.
    pub trend_lookahead: usize,
    pub weights: ScoreWeights,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            labels_path: None,
            boundary_window: 60,
            header_lookahead: 10,
            trend_lookahead: 3,
            weights: ScoreWeights::default(),
        }
    }
}

/// Weights of the keyword opportunity score.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub searches: f64,
    pub ctr: f64,
    pub competition: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            searches: 0.4,
            ctr: 0.3,
            competition: 0.3,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::with_name(SETTINGS_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|source| ConfigError::Load {
                what: "settings".to_string(),
                source,
            })?;

        built
            .try_deserialize::<Settings>()
            .map_err(|source| ConfigError::Load {
                what: "settings".to_string(),
                source,
            })
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_windows() {
        let s = Settings::default();
        assert_eq!(s.boundary_window, 60);
        assert_eq!(s.header_lookahead, 10);
        assert_eq!(s.trend_lookahead, 3);
        assert!(s.labels_path.is_none());
    }

    #[test]
    fn default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        assert!((w.searches + w.ctr + w.competition - 1.0).abs() < 1e-9);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let built = config::Config::builder()
            .add_source(config::File::from_str(
                "boundary_window = 20\n[weights]\nctr = 0.5\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let s: Settings = built.try_deserialize().unwrap();
        assert_eq!(s.boundary_window, 20);
        assert_eq!(s.trend_lookahead, 3);
        assert_eq!(s.weights.ctr, 0.5);
        assert_eq!(s.weights.searches, 0.4);
    }
}
