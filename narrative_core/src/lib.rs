//! # Narrative Core
//!
//! Turns the ball-by-ball state kept by `cricket_rules` into narrative
//! signals for commentary generation. Nothing here writes prose; it decides
//! what kind of moment a delivery is and gathers the facts worth mentioning.
//!
//! ## Core Components
//!
//! - **classifier**: Narrative branch, pivot flag and required-rate shift per delivery
//! - **context_assembler**: Ordered context notes and match-situation labels
//! - **events**: Triggers for milestones, new batters, over and phase ends, results
//! - **replay**: Drives a whole innings and produces per-delivery frames and records
//!
//! ## Design Philosophy
//!
//! - **State-Driven**: Every decision reads the state right after the delivery
//! - **Deterministic**: The same deliveries always replay to the same frames
//! - **Tunable**: Thresholds live in [`NarrativeConfig`] and load from TOML

pub mod classifier;
pub mod config;
pub mod context_assembler;
pub mod error;
pub mod events;
pub mod replay;

pub use classifier::*;
pub use config::*;
pub use context_assembler::*;
pub use error::*;
pub use events::*;
pub use replay::*;
