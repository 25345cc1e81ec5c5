//! # Cricket Rules
//!
//! The scorebook crate - delivery events, player records, match formats and the
//! ball-by-ball accumulator that turns a feed into match state.
//! This crate is the single source of truth for match state and does not contain any
//! narrative logic.

pub mod config;
pub mod entities;
pub mod match_state;
pub mod mechanics;

pub use config::*;
pub use entities::*;
pub use match_state::*;
pub use mechanics::*;
