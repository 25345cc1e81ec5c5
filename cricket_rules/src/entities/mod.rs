//! Entity definitions: deliveries, player records and the innings logs built from them.

mod batter;
mod bowler;
mod delivery;

pub use batter::*;
pub use bowler::*;
pub use delivery::*;

use serde::{Deserialize, Serialize};

use crate::mechanics::WicketKind;

/// A fall-of-wicket entry, captured at the moment the wicket falls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallOfWicket {
    /// 1-indexed.
    pub wicket_number: u32,
    pub batter: String,
    /// The dismissed batter's score.
    pub batter_runs: u32,
    pub team_score: u32,
    /// "O.B" at the fall, before any over rollover.
    pub overs: String,
    /// Over (0-indexed) in which the wicket fell.
    pub over: u32,
    /// Legal balls bowled in the innings when the wicket fell.
    pub legal_balls: u32,
    pub bowler: String,
    pub how: Option<WicketKind>,
    /// The batter left at the crease.
    pub partner: Option<String>,
    /// Runs of the stand this wicket ended.
    pub partnership_runs: u32,
    pub partnership_balls: u32,
}

impl FallOfWicket {
    /// "2/45 (6.3)" style short form.
    pub fn short(&self) -> String {
        format!("{}/{}({})", self.wicket_number, self.team_score, self.overs)
    }
}

/// A completed or unbroken stand between two batters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partnership {
    /// The wicket this stand was for (1st wicket stand, 2nd, ...).
    pub wicket_number: u32,
    pub batter1: String,
    pub batter2: String,
    pub runs: u32,
    pub balls: u32,
    /// False for the stand still in progress.
    pub broken: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fall_of_wicket_short_form() {
        let fow = FallOfWicket {
            wicket_number: 2,
            batter: "A".to_string(),
            batter_runs: 31,
            team_score: 45,
            overs: "6.3".to_string(),
            over: 6,
            legal_balls: 39,
            bowler: "X".to_string(),
            how: Some(WicketKind::Caught),
            partner: Some("B".to_string()),
            partnership_runs: 20,
            partnership_balls: 14,
        };
        assert_eq!(fow.short(), "2/45(6.3)");
    }
}
