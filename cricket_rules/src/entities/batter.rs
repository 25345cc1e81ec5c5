//! Batter records.

use serde::{Deserialize, Serialize};

use crate::mechanics::percentage;

/// Runs scored, balls faced and dismissal status for one batter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterStats {
    pub name: String,
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dots: u32,
    pub is_out: bool,
    /// Batting order position, 1-indexed.
    pub position: u32,
}

impl BatterStats {
    /// Create a fresh record at the given batting position.
    pub fn new(name: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            runs: 0,
            balls_faced: 0,
            fours: 0,
            sixes: 0,
            dots: 0,
            is_out: false,
            position,
        }
    }

    /// Runs per hundred balls, to 2 dp.
    pub fn strike_rate(&self) -> f64 {
        if self.balls_faced == 0 {
            return 0.0;
        }
        crate::mechanics::round_to(self.runs as f64 / self.balls_faced as f64 * 100.0, 2)
    }

    pub fn dot_percentage(&self) -> f64 {
        percentage(self.dots, self.balls_faced)
    }

    pub fn boundary_runs(&self) -> u32 {
        self.fours * 4 + self.sixes * 6
    }

    pub fn approaching_fifty(&self) -> bool {
        (40..50).contains(&self.runs)
    }

    pub fn approaching_hundred(&self) -> bool {
        (90..100).contains(&self.runs)
    }
}
