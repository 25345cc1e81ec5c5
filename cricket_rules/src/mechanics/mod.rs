//! Game mechanics: extras, dismissals, innings phases and rate arithmetic.

use serde::{Deserialize, Serialize};

/// Legal deliveries in one over.
pub const BALLS_PER_OVER: u32 = 6;

/// Wickets that end an innings.
pub const MAX_WICKETS: u32 = 10;

/// Kinds of extra runs a delivery can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtrasKind {
    #[default]
    None,
    Wide,
    #[serde(alias = "no_ball")]
    NoBall,
    Bye,
    #[serde(alias = "leg_bye")]
    LegBye,
}

impl ExtrasKind {
    /// Wides and no-balls do not count toward the over.
    pub fn is_illegal(&self) -> bool {
        matches!(self, ExtrasKind::Wide | ExtrasKind::NoBall)
    }
}

/// How a batter was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WicketKind {
    Bowled,
    Caught,
    Lbw,
    RunOut,
    Stumped,
    HitWicket,
    /// Anything the feed reports that we do not model separately,
    /// `"unknown"` included.
    #[serde(other)]
    Other,
}

impl WicketKind {
    /// Run-outs are not credited to the bowler.
    pub fn credited_to_bowler(&self) -> bool {
        !matches!(self, WicketKind::RunOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WicketKind::Bowled => "bowled",
            WicketKind::Caught => "caught",
            WicketKind::Lbw => "lbw",
            WicketKind::RunOut => "run out",
            WicketKind::Stumped => "stumped",
            WicketKind::HitWicket => "hit wicket",
            WicketKind::Other => "out",
        }
    }
}

impl std::fmt::Display for WicketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse stage of an innings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    #[default]
    Powerplay,
    Middle,
    Death,
}

impl MatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPhase::Powerplay => "powerplay",
            MatchPhase::Middle => "middle",
            MatchPhase::Death => "death",
        }
    }

    /// Title used when announcing the phase ("Middle Overs").
    pub fn title(&self) -> &'static str {
        match self {
            MatchPhase::Powerplay => "Powerplay Overs",
            MatchPhase::Middle => "Middle Overs",
            MatchPhase::Death => "Death Overs",
        }
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the scoring rate over the last four completed overs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMomentum {
    /// Fewer than four overs completed.
    Early,
    Accelerating,
    Steady,
    Decelerating,
}

impl ScoringMomentum {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMomentum::Early => "early",
            ScoringMomentum::Accelerating => "accelerating",
            ScoringMomentum::Steady => "steady",
            ScoringMomentum::Decelerating => "decelerating",
        }
    }
}

/// Runs per over for `runs` scored across `balls` legal deliveries, to 2 dp.
/// Zero when no balls have been bowled.
pub fn runs_per_over(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    let overs = balls as f64 / BALLS_PER_OVER as f64;
    round_to(runs as f64 / overs, 2)
}

/// Percentage of `part` in `whole`, to 1 dp.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1)
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Render a rate the way scorecards print it: at least one decimal, at most two.
pub fn format_rate(value: f64) -> String {
    let text = format!("{:.2}", value);
    let trimmed = text.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// "O.B" for a count of legal deliveries.
pub fn overs_display(balls: u32) -> String {
    format!("{}.{}", balls / BALLS_PER_OVER, balls % BALLS_PER_OVER)
}
