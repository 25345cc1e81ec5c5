//! Bowler records.

use serde::{Deserialize, Serialize};

use crate::mechanics::{overs_display, runs_per_over};

/// Figures for one bowler across the innings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlerStats {
    pub name: String,
    /// Legal deliveries only.
    pub balls_bowled: u32,
    /// Every run scored off this bowler, extras included.
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
    pub dots: u32,
    pub fours_conceded: u32,
    pub sixes_conceded: u32,
    /// Runs conceded as wides.
    pub wides: u32,
    /// Runs conceded as no-ball extras.
    pub noballs: u32,
}

impl BowlerStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            balls_bowled: 0,
            runs_conceded: 0,
            wickets: 0,
            maidens: 0,
            dots: 0,
            fours_conceded: 0,
            sixes_conceded: 0,
            wides: 0,
            noballs: 0,
        }
    }

    pub fn overs_display(&self) -> String {
        overs_display(self.balls_bowled)
    }

    pub fn economy(&self) -> f64 {
        runs_per_over(self.runs_conceded, self.balls_bowled)
    }

    pub fn boundaries_conceded(&self) -> u32 {
        self.fours_conceded + self.sixes_conceded
    }

    /// "W/R (O.B)".
    pub fn figures(&self) -> String {
        format!(
            "{}/{} ({})",
            self.wickets,
            self.runs_conceded,
            self.overs_display()
        )
    }
}
