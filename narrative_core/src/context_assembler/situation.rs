//! Match-situation labels for a chase.

use cricket_rules::{MatchState, BALLS_PER_OVER, MAX_WICKETS};
use serde::{Deserialize, Serialize};

/// An honest one-line read of where a chase stands.
///
/// Variants are listed in evaluation order: decided outcomes first, then the
/// most severe required-rate bands down to the comfortable ones, then the
/// last-over overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum MatchSituation {
    Won,
    AllOut,
    /// The overs ran out with runs still needed.
    OversExhausted { needed: u32 },
    TailExposed { rrr: f64 },
    OutOfWickets { rrr: f64, wickets_left: u32 },
    DeepTrouble { rrr: f64, wickets: u32 },
    NearImpossible { needed: u32, balls: u32 },
    LastGasp { needed: u32, balls: u32, rrr: f64 },
    Uphill { rrr: f64, wickets: u32 },
    Tough { rrr: f64 },
    Tight { needed: u32, balls: u32, rrr: f64 },
    Comfortable { rrr: f64 },
    InControl { rrr: f64 },
    LastOverThriller { needed: u32, balls: u32 },
    LastOverBoundaries { needed: u32, balls: u32 },
    LastOverImpossible { needed: u32, balls: u32 },
}

impl MatchSituation {
    /// Read the situation from the state; `None` outside a chase or when the
    /// contest has no notable shape.
    pub fn assess(state: &MatchState) -> Option<Self> {
        if !state.is_chase() {
            return None;
        }

        let rrr = state.rrr();
        let wickets = state.wickets;
        let balls = state.balls_remaining();
        let needed = state.runs_needed();

        let situation = if needed == 0 {
            Self::Won
        } else if wickets >= MAX_WICKETS {
            Self::AllOut
        } else if balls == 0 {
            Self::OversExhausted { needed }
        } else if wickets >= 8 && rrr > 15.0 {
            Self::TailExposed { rrr }
        } else if wickets >= 7 && rrr > 18.0 {
            Self::OutOfWickets {
                rrr,
                wickets_left: MAX_WICKETS - wickets,
            }
        } else if wickets >= 6 && rrr > 15.0 {
            Self::DeepTrouble { rrr, wickets }
        } else if rrr > 20.0 && balls <= 12 {
            Self::NearImpossible { needed, balls }
        } else if rrr > 15.0 && balls <= 18 {
            Self::LastGasp { needed, balls, rrr }
        } else if rrr > 12.0 && wickets >= 5 {
            Self::Uphill { rrr, wickets }
        } else if rrr > 12.0 {
            Self::Tough { rrr }
        } else if (9.0..=12.0).contains(&rrr) && balls <= 30 {
            Self::Tight { needed, balls, rrr }
        } else if rrr < 6.0 && wickets <= 4 {
            Self::Comfortable { rrr }
        } else if rrr < 8.0 && wickets <= 3 {
            Self::InControl { rrr }
        } else if balls <= BALLS_PER_OVER {
            if needed <= 6 {
                Self::LastOverThriller { needed, balls }
            } else if needed <= 12 {
                Self::LastOverBoundaries { needed, balls }
            } else {
                Self::LastOverImpossible { needed, balls }
            }
        } else {
            return None;
        };
        Some(situation)
    }

    /// Short machine-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::AllOut => "all_out",
            Self::OversExhausted { .. } => "overs_exhausted",
            Self::TailExposed { .. } => "tail_exposed",
            Self::OutOfWickets { .. } => "out_of_wickets",
            Self::DeepTrouble { .. } => "deep_trouble",
            Self::NearImpossible { .. } => "near_impossible",
            Self::LastGasp { .. } => "last_gasp",
            Self::Uphill { .. } => "uphill",
            Self::Tough { .. } => "tough",
            Self::Tight { .. } => "tight",
            Self::Comfortable { .. } => "comfortable",
            Self::InControl { .. } => "in_control",
            Self::LastOverThriller { .. } => "last_over_thriller",
            Self::LastOverBoundaries { .. } => "last_over_boundaries",
            Self::LastOverImpossible { .. } => "last_over_impossible",
        }
    }
}

impl std::fmt::Display for MatchSituation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Won => write!(f, "MATCH WON by batting team"),
            Self::AllOut => write!(f, "ALL OUT - batting team loses"),
            Self::OversExhausted { needed } => {
                write!(f, "OVERS UP - batting team finished {} short of the target", needed)
            }
            Self::TailExposed { rrr } => write!(
                f,
                "GAME OVER - virtually impossible, tail exposed, need {:.1} RPO",
                rrr
            ),
            Self::OutOfWickets { rrr, wickets_left } => write!(
                f,
                "GAME OVER - need {:.1} RPO with only {} wickets left",
                rrr, wickets_left
            ),
            Self::DeepTrouble { rrr, wickets } => write!(
                f,
                "DEEP TROUBLE - need {:.1} RPO with {} down, odds stacked against batting team",
                rrr, wickets
            ),
            Self::NearImpossible { needed, balls } => write!(
                f,
                "GAME OVER - need {} off {} balls, mathematically near-impossible",
                needed, balls
            ),
            Self::LastGasp { needed, balls, rrr } => write!(
                f,
                "LAST GASP - need {} off {} balls at {:.1} RPO, need boundaries every ball",
                needed, balls, rrr
            ),
            Self::Uphill { rrr, wickets } => write!(
                f,
                "UPHILL - need {:.1} RPO with {} down, batting team in serious trouble",
                rrr, wickets
            ),
            Self::Tough { rrr } => write!(
                f,
                "TOUGH - need {:.1} RPO but wickets in hand, need big hitting",
                rrr
            ),
            Self::Tight { needed, balls, rrr } => write!(
                f,
                "TIGHT - need {} off {} balls at {:.1} RPO, game in the balance",
                needed, balls, rrr
            ),
            Self::Comfortable { rrr } => write!(
                f,
                "COMFORTABLE - batting team cruising at {:.1} RPO with wickets in hand",
                rrr
            ),
            Self::InControl { rrr } => write!(
                f,
                "IN CONTROL - batting team on track, {:.1} RPO required",
                rrr
            ),
            Self::LastOverThriller { needed, balls } => write!(
                f,
                "LAST OVER THRILLER - need {} off {} balls, anyone's game!",
                needed, balls
            ),
            Self::LastOverBoundaries { needed, balls } => write!(
                f,
                "LAST OVER - need {} off {} balls, need boundaries",
                needed, balls
            ),
            Self::LastOverImpossible { needed, balls } => write!(
                f,
                "LAST OVER - need {} off {} balls, virtually impossible",
                needed, balls
            ),
        }
    }
}
