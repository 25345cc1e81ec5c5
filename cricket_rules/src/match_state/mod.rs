//! Match state - the aggregate the accumulator builds one delivery at a time.

mod accumulator;

pub use accumulator::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::RulesConfig;
use crate::entities::{BatterStats, BowlerStats, FallOfWicket, Partnership};
use crate::mechanics::{
    overs_display, percentage, round_to, runs_per_over, ExtrasKind, MatchPhase, ScoringMomentum,
    MAX_WICKETS,
};

/// Legal deliveries kept in the rolling recent-runs window.
pub const RECENT_BALLS_WINDOW: usize = 6;

/// Commentary lines retained for de-duplication hints.
pub const COMMENTARY_HISTORY_LIMIT: usize = 6;

/// Extras conceded, in total and by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtrasTally {
    pub total: u32,
    pub wides: u32,
    pub noballs: u32,
    pub byes: u32,
    pub legbyes: u32,
}

impl ExtrasTally {
    /// Add extra runs of the given kind.
    pub fn record(&mut self, kind: ExtrasKind, runs: u32) {
        if runs == 0 {
            return;
        }
        self.total += runs;
        match kind {
            ExtrasKind::Wide => self.wides += runs,
            ExtrasKind::NoBall => self.noballs += runs,
            ExtrasKind::Bye => self.byes += runs,
            ExtrasKind::LegBye => self.legbyes += runs,
            ExtrasKind::None => {}
        }
    }
}

/// What changed between the previous delivery and this one.
///
/// Recomputed on every update; never carried over as match history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransitionFlags {
    pub is_new_bowler: bool,
    pub is_new_over: bool,
    pub is_strike_change: bool,
    /// Set when a batter not seen before appears at either end.
    pub new_batter: Option<String>,
}

impl TransitionFlags {
    pub fn is_new_batter(&self) -> bool {
        self.new_batter.is_some()
    }
}

/// The complete state of one innings after the most recent delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub config: RulesConfig,

    pub batting_team: String,
    pub bowling_team: String,
    /// Runs required to win; 0 in a first innings.
    pub target: u32,

    // Score
    pub total_runs: u32,
    pub wickets: u32,
    pub total_balls_bowled: u32,
    pub balls_in_current_over: u32,
    pub overs_completed: u32,
    pub extras: ExtrasTally,
    pub total_fours: u32,
    pub total_sixes: u32,

    // Streaks
    /// Runs off the bat on the last six legal deliveries, oldest first.
    pub last_6_balls: Vec<u32>,
    pub consecutive_dots: u32,
    pub balls_since_last_boundary: u32,
    pub balls_since_last_wicket: u32,

    // Over in progress
    pub current_over_runs: u32,
    pub current_over_wickets: u32,
    pub previous_over_summary: Option<String>,

    // Partnership since the last wicket
    pub partnership_runs: u32,
    pub partnership_balls: u32,
    /// 1 for the first-wicket stand, 2 for the second, ...
    pub partnership_number: u32,

    pub batters: BTreeMap<String, BatterStats>,
    pub bowlers: BTreeMap<String, BowlerStats>,
    pub batting_order: Vec<String>,
    pub bowling_order: Vec<String>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    /// Runs in each completed over.
    pub over_runs_history: Vec<u32>,

    // Players at the crease
    pub current_batter: Option<String>,
    pub current_bowler: Option<String>,
    pub non_striker: Option<String>,
    pub previous_batter: Option<String>,
    pub previous_bowler: Option<String>,

    pub transitions: TransitionFlags,

    /// Recent commentary lines, supplied by the caller.
    pub commentary_history: Vec<String>,
}

impl MatchState {
    /// Create the state for the start of an innings.
    pub fn new(
        batting_team: impl Into<String>,
        bowling_team: impl Into<String>,
        target: u32,
        config: RulesConfig,
    ) -> Self {
        Self {
            config,
            batting_team: batting_team.into(),
            bowling_team: bowling_team.into(),
            target,
            total_runs: 0,
            wickets: 0,
            total_balls_bowled: 0,
            balls_in_current_over: 0,
            overs_completed: 0,
            extras: ExtrasTally::default(),
            total_fours: 0,
            total_sixes: 0,
            last_6_balls: Vec::with_capacity(RECENT_BALLS_WINDOW + 1),
            consecutive_dots: 0,
            balls_since_last_boundary: 0,
            balls_since_last_wicket: 0,
            current_over_runs: 0,
            current_over_wickets: 0,
            previous_over_summary: None,
            partnership_runs: 0,
            partnership_balls: 0,
            partnership_number: 1,
            batters: BTreeMap::new(),
            bowlers: BTreeMap::new(),
            batting_order: Vec::new(),
            bowling_order: Vec::new(),
            fall_of_wickets: Vec::new(),
            over_runs_history: Vec::new(),
            current_batter: None,
            current_bowler: None,
            non_striker: None,
            previous_batter: None,
            previous_bowler: None,
            transitions: TransitionFlags::default(),
            commentary_history: Vec::new(),
        }
    }

    /// A second innings chasing a target.
    pub fn is_chase(&self) -> bool {
        self.target > 0
    }

    pub fn runs_needed(&self) -> u32 {
        self.target.saturating_sub(self.total_runs)
    }

    pub fn balls_remaining(&self) -> u32 {
        self.config
            .format
            .total_balls()
            .saturating_sub(self.total_balls_bowled)
    }

    /// "O.B" for the innings so far.
    pub fn overs_display(&self) -> String {
        format!("{}.{}", self.overs_completed, self.balls_in_current_over)
    }

    /// Current run rate.
    pub fn crr(&self) -> f64 {
        runs_per_over(self.total_runs, self.total_balls_bowled)
    }

    /// Required run rate; 0 once no balls remain.
    pub fn rrr(&self) -> f64 {
        runs_per_over(self.runs_needed(), self.balls_remaining())
    }

    /// The over in progress, numbered from 1. A completed over stays current
    /// until the next legal ball is bowled.
    pub fn current_over(&self) -> u32 {
        self.overs_completed + u32::from(self.balls_in_current_over > 0)
    }

    /// Phase of the over in progress.
    pub fn match_phase(&self) -> MatchPhase {
        self.config.format.phase(self.current_over())
    }

    /// Runs in completed overs `[from, to)` (0-indexed).
    fn runs_in_overs(&self, from: u32, to: u32) -> u32 {
        self.over_runs_history
            .iter()
            .skip(from as usize)
            .take(to.saturating_sub(from) as usize)
            .sum()
    }

    pub fn powerplay_runs(&self) -> u32 {
        self.runs_in_overs(0, self.config.format.powerplay_overs)
    }

    pub fn middle_overs_runs(&self) -> u32 {
        let format = self.config.format;
        self.runs_in_overs(format.powerplay_overs, format.middle_overs_end)
    }

    pub fn death_overs_runs(&self) -> u32 {
        let format = self.config.format;
        self.runs_in_overs(format.middle_overs_end, format.overs)
    }

    /// Average runs per over across the last `overs` completed overs.
    /// Zero until that many overs are complete.
    pub fn run_rate_last_overs(&self, overs: usize) -> f64 {
        if overs == 0 || self.over_runs_history.len() < overs {
            return 0.0;
        }
        let recent: u32 = self.over_runs_history.iter().rev().take(overs).sum();
        round_to(recent as f64 / overs as f64, 2)
    }

    /// Compare the last two completed overs with the two before them.
    pub fn scoring_momentum(&self) -> ScoringMomentum {
        let history = &self.over_runs_history;
        if history.len() < 4 {
            return ScoringMomentum::Early;
        }
        let n = history.len();
        let recent = (history[n - 1] + history[n - 2]) as f64 / 2.0;
        let previous = (history[n - 3] + history[n - 4]) as f64 / 2.0;
        let diff = recent - previous;
        if diff >= 3.0 {
            ScoringMomentum::Accelerating
        } else if diff <= -3.0 {
            ScoringMomentum::Decelerating
        } else {
            ScoringMomentum::Steady
        }
    }

    /// Dot balls faced as a share of legal deliveries.
    pub fn dot_ball_percentage(&self) -> f64 {
        let dots: u32 = self.batters.values().map(|b| b.dots).sum();
        percentage(dots, self.total_balls_bowled)
    }

    /// Share of the total that came from fours and sixes.
    pub fn boundary_runs_percentage(&self) -> f64 {
        percentage(self.total_fours * 4 + self.total_sixes * 6, self.total_runs)
    }

    pub fn is_boundary_drought(&self) -> bool {
        self.balls_since_last_boundary >= self.config.boundary_drought_balls
    }

    /// Three wickets inside the collapse window, measured from the
    /// third-most-recent wicket to the current ball.
    pub fn is_collapse(&self) -> bool {
        let count = self.fall_of_wickets.len();
        if count < 3 {
            return false;
        }
        let third_last = &self.fall_of_wickets[count - 3];
        self.total_balls_bowled.saturating_sub(third_last.legal_balls)
            <= self.config.collapse_window_balls
    }

    pub fn is_all_out(&self) -> bool {
        self.wickets >= MAX_WICKETS
    }

    /// All out, out of balls, or the target reached.
    pub fn is_innings_complete(&self) -> bool {
        self.is_all_out()
            || self.balls_remaining() == 0
            || (self.is_chase() && self.runs_needed() == 0)
    }

    /// Not-out batters in batting order, at most two.
    ///
    /// Should malformed input leave more than two not-out names, the two most
    /// recently added win.
    pub fn active_batters(&self) -> Vec<&str> {
        let not_out: Vec<&str> = self
            .batting_order
            .iter()
            .filter(|name| self.batters.get(*name).is_some_and(|b| !b.is_out))
            .map(|name| name.as_str())
            .collect();
        let skip = not_out.len().saturating_sub(2);
        not_out.into_iter().skip(skip).collect()
    }

    /// The active batter who is not `name`, most recently added first.
    pub fn other_active_batter(&self, name: &str) -> Option<String> {
        self.active_batters()
            .into_iter()
            .rev()
            .find(|other| *other != name)
            .map(str::to_string)
    }

    /// Replace the caller-maintained commentary lines, keeping the most recent.
    pub fn set_commentary_history(&mut self, lines: impl IntoIterator<Item = String>) {
        let mut lines: Vec<String> = lines.into_iter().collect();
        let excess = lines.len().saturating_sub(COMMENTARY_HISTORY_LIMIT);
        lines.drain(..excess);
        self.commentary_history = lines;
    }

    /// Stands so far: one per wicket, then the unbroken one if it has begun.
    pub fn partnerships(&self) -> Vec<Partnership> {
        let mut stands: Vec<Partnership> = self
            .fall_of_wickets
            .iter()
            .map(|fow| Partnership {
                wicket_number: fow.wicket_number,
                batter1: fow.batter.clone(),
                batter2: fow.partner.clone().unwrap_or_default(),
                runs: fow.partnership_runs,
                balls: fow.partnership_balls,
                broken: true,
            })
            .collect();

        if !self.is_all_out() && (self.partnership_runs > 0 || self.partnership_balls > 0) {
            let active = self.active_batters();
            stands.push(Partnership {
                wicket_number: self.partnership_number,
                batter1: active.first().map(|s| s.to_string()).unwrap_or_default(),
                batter2: active.get(1).map(|s| s.to_string()).unwrap_or_default(),
                runs: self.partnership_runs,
                balls: self.partnership_balls,
                broken: false,
            });
        }
        stands
    }

    /// Batters in batting order.
    pub fn batters_in_order(&self) -> Vec<&BatterStats> {
        self.batting_order
            .iter()
            .filter_map(|name| self.batters.get(name))
            .collect()
    }

    /// Bowlers in the order they came on.
    pub fn bowlers_in_order(&self) -> Vec<&BowlerStats> {
        self.bowling_order
            .iter()
            .filter_map(|name| self.bowlers.get(name))
            .collect()
    }

    /// Overs bowled as "O.B".
    pub fn innings_overs(&self) -> String {
        overs_display(self.total_balls_bowled)
    }

    /// Position the next new batter will take.
    pub fn next_batting_position(&self) -> u32 {
        self.batting_order.len() as u32 + 1
    }

    /// Fetch a batter record, creating it at the next batting position.
    fn batter_entry(&mut self, name: &str) -> &mut BatterStats {
        let position = self.next_batting_position();
        let order = &mut self.batting_order;
        self.batters.entry(name.to_string()).or_insert_with(|| {
            order.push(name.to_string());
            BatterStats::new(name, position)
        })
    }

    /// Fetch a bowler record, creating it on first appearance.
    fn bowler_entry(&mut self, name: &str) -> &mut BowlerStats {
        let order = &mut self.bowling_order;
        self.bowlers.entry(name.to_string()).or_insert_with(|| {
            order.push(name.to_string());
            BowlerStats::new(name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chase(target: u32) -> MatchState {
        MatchState::new("Chasers", "Defenders", target, RulesConfig::default())
    }

    #[test]
    fn test_runs_needed_and_balls_remaining() {
        let mut state = chase(151);
        assert_eq!(state.runs_needed(), 151);
        assert_eq!(state.balls_remaining(), 120);

        state.total_runs = 160;
        state.total_balls_bowled = 125;
        assert_eq!(state.runs_needed(), 0);
        assert_eq!(state.balls_remaining(), 0);
        assert_eq!(state.rrr(), 0.0);
    }

    #[test]
    fn test_required_rate() {
        let mut state = chase(100);
        state.total_runs = 35;
        state.total_balls_bowled = 90;
        // 65 off 30 balls
        assert_eq!(state.rrr(), 13.0);
        assert_eq!(state.crr(), 2.33);
    }

    #[test]
    fn test_first_innings_has_no_requirement() {
        let state = chase(0);
        assert!(!state.is_chase());
        assert_eq!(state.runs_needed(), 0);
        assert_eq!(state.rrr(), 0.0);
    }

    #[test]
    fn test_momentum() {
        let mut state = chase(0);
        state.over_runs_history = vec![6, 6, 6];
        assert_eq!(state.scoring_momentum(), ScoringMomentum::Early);

        state.over_runs_history = vec![4, 6, 10, 12];
        assert_eq!(state.scoring_momentum(), ScoringMomentum::Accelerating);

        state.over_runs_history = vec![12, 10, 4, 6];
        assert_eq!(state.scoring_momentum(), ScoringMomentum::Decelerating);

        state.over_runs_history = vec![8, 8, 9, 9];
        assert_eq!(state.scoring_momentum(), ScoringMomentum::Steady);
    }

    #[test]
    fn test_phase_runs() {
        let mut state = chase(0);
        state.over_runs_history = vec![10; 17];
        assert_eq!(state.powerplay_runs(), 60);
        assert_eq!(state.middle_overs_runs(), 90);
        assert_eq!(state.death_overs_runs(), 20);
        assert_eq!(state.run_rate_last_overs(3), 10.0);
        assert_eq!(state.run_rate_last_overs(30), 0.0);
    }

    #[test]
    fn test_boundary_drought_threshold() {
        let mut state = chase(0);
        state.balls_since_last_boundary = 17;
        assert!(!state.is_boundary_drought());
        state.balls_since_last_boundary = 18;
        assert!(state.is_boundary_drought());
    }

    #[test]
    fn test_commentary_history_is_bounded() {
        let mut state = chase(0);
        state.set_commentary_history((0..10).map(|i| format!("line {}", i)));
        assert_eq!(state.commentary_history.len(), COMMENTARY_HISTORY_LIMIT);
        assert_eq!(state.commentary_history[0], "line 4");
        assert_eq!(state.commentary_history[5], "line 9");
    }

    #[test]
    fn test_active_batters_prefers_most_recent() {
        let mut state = chase(0);
        for name in ["A", "B", "C"] {
            state.batter_entry(name);
        }
        assert_eq!(state.active_batters(), vec!["B", "C"]);
        assert_eq!(state.other_active_batter("C").as_deref(), Some("B"));

        state.batters.get_mut("B").unwrap().is_out = true;
        assert_eq!(state.active_batters(), vec!["A", "C"]);
        assert_eq!(state.other_active_batter("A").as_deref(), Some("C"));
    }

    #[test]
    fn test_extras_tally() {
        let mut tally = ExtrasTally::default();
        tally.record(ExtrasKind::Wide, 1);
        tally.record(ExtrasKind::LegBye, 2);
        tally.record(ExtrasKind::NoBall, 0);
        assert_eq!(tally.total, 3);
        assert_eq!(tally.wides, 1);
        assert_eq!(tally.legbyes, 2);
        assert_eq!(tally.noballs, 0);
    }
}
