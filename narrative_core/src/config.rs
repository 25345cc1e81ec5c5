//! Thresholds for classification, pivot detection and context notes.

use cricket_rules::{ConfigError, RulesConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable thresholds read by the classifier and context assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// A wide or no-ball is an extra gift when the chase needs at most this many.
    pub extra_gift_runs_needed: u32,

    /// Consecutive dots that make a pressure builder.
    pub pressure_dot_balls: u32,

    /// Required rate above which a chase is under pressure.
    pub pressure_rrr: f64,

    /// Smallest change in required rate worth reporting.
    pub equation_shift_min: f64,

    /// A dismissed batter with at least this many was set.
    pub set_batter_runs: u32,

    /// Wickets down, after the ball, from which the tail is exposed.
    pub tail_wickets: u32,

    /// Runs per ball needed in the death overs for a four to swing the match.
    pub death_runs_per_ball: f64,

    /// A wide or no-ball is a pivot with at most this many balls left...
    pub tight_finish_balls: u32,

    /// ...and at most this many runs needed.
    pub tight_finish_runs: u32,

    /// Stand size above which a broken partnership is noted.
    pub partnership_note_runs: u32,

    /// Legal balls between wickets that count as a quick follow-up.
    pub quick_wicket_balls: u32,

    /// Commentary lines checked for already-noted observations.
    pub dedup_lookback_lines: usize,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            extra_gift_runs_needed: 30,
            pressure_dot_balls: 3,
            pressure_rrr: 12.0,
            equation_shift_min: 0.5,
            set_batter_runs: 30,
            tail_wickets: 7,
            death_runs_per_ball: 1.5,
            tight_finish_balls: 12,
            tight_finish_runs: 20,
            partnership_note_runs: 10,
            quick_wicket_balls: 6,
            dedup_lookback_lines: 3,
        }
    }
}

impl NarrativeConfig {
    /// Parse from a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded narrative config");
        Ok(config)
    }
}

/// One file for a whole replay: `[rules]` and `[narrative]` tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub rules: RulesConfig,
    pub narrative: NarrativeConfig,
}

impl ReplayConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ReplayConfig = toml::from_str(content)?;
        config.rules.format.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            overs = config.rules.format.overs,
            "loaded replay config"
        );
        Ok(config)
    }
}
