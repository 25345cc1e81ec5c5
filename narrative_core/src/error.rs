//! Errors raised at the replay boundary.

use cricket_rules::{ConfigError, DeliveryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("innings has no deliveries")]
    EmptyInnings,

    #[error("delivery {index} is malformed: {source}")]
    InvalidDelivery {
        index: usize,
        #[source]
        source: DeliveryError,
    },

    #[error("delivery {index} was never reached, replay stopped after {played}")]
    TargetNotReached { index: usize, played: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
