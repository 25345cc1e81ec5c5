//! Narrative classifier - tags every delivery with a narrative branch.
//!
//! The classifier reads the state after a ball together with the ball itself
//! and produces a [`LogicResult`]: the branch, a pivot flag, an optional
//! equation shift and the context notes for the text generator. It never
//! mutates state, so calling it twice with the same inputs gives the same
//! result.

mod pivot;

pub use pivot::*;

use cricket_rules::{DeliveryEvent, MatchPhase, MatchState};
use serde::{Deserialize, Serialize};

use crate::config::NarrativeConfig;
use crate::context_assembler::ContextAssembler;

/// The narrative category of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeBranch {
    #[default]
    Routine,
    BoundaryMomentum,
    WicketDrama,
    PressureBuilder,
    OverTransition,
    ExtraGift,
}

impl NarrativeBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeBranch::Routine => "routine",
            NarrativeBranch::BoundaryMomentum => "boundary_momentum",
            NarrativeBranch::WicketDrama => "wicket_drama",
            NarrativeBranch::PressureBuilder => "pressure_builder",
            NarrativeBranch::OverTransition => "over_transition",
            NarrativeBranch::ExtraGift => "extra_gift",
        }
    }
}

impl std::fmt::Display for NarrativeBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicResult {
    pub branch: NarrativeBranch,
    pub is_pivot: bool,
    pub equation_shift: Option<String>,
    /// Observations joined with ". ", most decision-relevant first.
    pub context_notes: String,
}

/// The rule-based classifier.
#[derive(Debug, Clone)]
pub struct LogicEngine {
    config: NarrativeConfig,
    assembler: ContextAssembler,
}

impl LogicEngine {
    pub fn new(config: NarrativeConfig) -> Self {
        Self {
            assembler: ContextAssembler::new(config.clone()),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(NarrativeConfig::default())
    }

    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    /// Classify a delivery. `state` must be the state right after `ball`.
    pub fn analyze(&self, state: &MatchState, ball: &DeliveryEvent) -> LogicResult {
        LogicResult {
            branch: self.classify_branch(state, ball),
            is_pivot: detect_pivot(state, ball, &self.config),
            equation_shift: equation_shift(state, ball, &self.config),
            context_notes: self.assembler.build_notes(state, ball),
        }
    }

    /// First matching rule wins; every delivery gets exactly one branch.
    pub fn classify_branch(&self, state: &MatchState, ball: &DeliveryEvent) -> NarrativeBranch {
        let config = &self.config;

        if ball.is_wicket {
            return NarrativeBranch::WicketDrama;
        }

        if ball.extras_kind.is_illegal() {
            let close_chase =
                state.is_chase() && state.runs_needed() <= config.extra_gift_runs_needed;
            if close_chase || state.match_phase() == MatchPhase::Death {
                return NarrativeBranch::ExtraGift;
            }
        }

        if ball.is_four_or_six() {
            return NarrativeBranch::BoundaryMomentum;
        }

        let climbing_rate =
            state.is_chase() && state.rrr() > config.pressure_rrr && ball.runs <= 1;
        if state.consecutive_dots >= config.pressure_dot_balls || climbing_rate {
            return NarrativeBranch::PressureBuilder;
        }

        if completed_over(state, ball) {
            return NarrativeBranch::OverTransition;
        }

        NarrativeBranch::Routine
    }
}

impl Default for LogicEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// True when this legal ball was the sixth of its over.
pub fn completed_over(state: &MatchState, ball: &DeliveryEvent) -> bool {
    ball.is_legal() && state.balls_in_current_over == 0 && state.overs_completed > 0
}
