//! End-of-innings records for persistence.

use cricket_rules::{BatterStats, BowlerStats, ExtrasTally, FallOfWicket, MatchState, Partnership};
use serde::{Deserialize, Serialize};

/// Team-level totals for one innings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsSummary {
    pub batting_team: String,
    pub bowling_team: String,
    /// Zero for a first innings.
    pub target: u32,
    pub total_runs: u32,
    pub wickets: u32,
    pub overs: String,
    pub extras: ExtrasTally,
    pub fours: u32,
    pub sixes: u32,
    /// Runs from completed overs in each phase.
    pub phase_runs: PhaseRuns,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRuns {
    pub powerplay: u32,
    pub middle: u32,
    pub death: u32,
}

impl InningsSummary {
    pub fn from_state(state: &MatchState) -> Self {
        Self {
            batting_team: state.batting_team.clone(),
            bowling_team: state.bowling_team.clone(),
            target: state.target,
            total_runs: state.total_runs,
            wickets: state.wickets,
            overs: state.innings_overs(),
            extras: state.extras,
            fours: state.total_fours,
            sixes: state.total_sixes,
            phase_runs: PhaseRuns {
                powerplay: state.powerplay_runs(),
                middle: state.middle_overs_runs(),
                death: state.death_overs_runs(),
            },
        }
    }

    /// Target for the side batting second.
    pub fn target_to_set(&self) -> u32 {
        self.total_runs + 1
    }
}

/// Everything a scorecard needs once the innings is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsRecord {
    pub summary: InningsSummary,
    /// In batting order.
    pub batters: Vec<BatterStats>,
    /// In the order they came on.
    pub bowlers: Vec<BowlerStats>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub partnerships: Vec<Partnership>,
}

impl InningsRecord {
    pub fn from_state(state: &MatchState) -> Self {
        Self {
            summary: InningsSummary::from_state(state),
            batters: state.batters_in_order().into_iter().cloned().collect(),
            bowlers: state.bowlers_in_order().into_iter().cloned().collect(),
            fall_of_wickets: state.fall_of_wickets.clone(),
            partnerships: state.partnerships(),
        }
    }
}
