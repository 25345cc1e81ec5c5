//! Format and threshold configuration for match-state accumulation.
//!
//! Every value has a T20 default, so an empty TOML document is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::mechanics::{MatchPhase, BALLS_PER_OVER};

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid match format: {0}")]
    InvalidFormat(String),
}

/// Overs in an innings and where the phases split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchFormat {
    pub overs: u32,
    /// Last over (1-indexed) of the powerplay.
    pub powerplay_overs: u32,
    /// Last over (1-indexed) of the middle phase.
    pub middle_overs_end: u32,
}

impl Default for MatchFormat {
    fn default() -> Self {
        Self::t20()
    }
}

impl MatchFormat {
    pub fn t20() -> Self {
        Self {
            overs: 20,
            powerplay_overs: 6,
            middle_overs_end: 15,
        }
    }

    pub fn total_balls(&self) -> u32 {
        self.overs * BALLS_PER_OVER
    }

    /// Phase of an over, numbered from 1. Over 0 (nothing bowled yet) is
    /// still the powerplay.
    pub fn phase(&self, over: u32) -> MatchPhase {
        if over <= self.powerplay_overs {
            MatchPhase::Powerplay
        } else if over <= self.middle_overs_end {
            MatchPhase::Middle
        } else {
            MatchPhase::Death
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overs == 0 {
            return Err(ConfigError::InvalidFormat("overs must be positive".into()));
        }
        if self.powerplay_overs > self.middle_overs_end {
            return Err(ConfigError::InvalidFormat(format!(
                "powerplay ({}) ends after the middle overs ({})",
                self.powerplay_overs, self.middle_overs_end
            )));
        }
        if self.middle_overs_end > self.overs {
            return Err(ConfigError::InvalidFormat(format!(
                "middle overs end ({}) beyond innings length ({})",
                self.middle_overs_end, self.overs
            )));
        }
        Ok(())
    }
}

/// Settings the accumulator and its derived signals read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub format: MatchFormat,

    /// Legal balls without a four or six that count as a drought.
    pub boundary_drought_balls: u32,

    /// A collapse is three wickets within this many legal balls (inclusive).
    pub collapse_window_balls: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            format: MatchFormat::t20(),
            boundary_drought_balls: 18,
            collapse_window_balls: 18,
        }
    }
}

impl RulesConfig {
    /// Parse from a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RulesConfig = toml::from_str(content)?;
        config.format.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
