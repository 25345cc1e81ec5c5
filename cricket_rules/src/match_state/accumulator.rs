//! The ball-by-ball accumulator: the only writer of [`MatchState`].

use super::{MatchState, TransitionFlags, RECENT_BALLS_WINDOW};
use crate::config::RulesConfig;
use crate::entities::{DeliveryEvent, FallOfWicket};
use crate::mechanics::{overs_display, ExtrasKind, BALLS_PER_OVER, MAX_WICKETS};

/// Folds delivery events into a [`MatchState`], one at a time, in order.
#[derive(Debug, Clone)]
pub struct Accumulator {
    state: MatchState,
}

impl Accumulator {
    /// Start an innings with the default T20 rules. `target` is 0 for a
    /// first innings.
    pub fn new(batting_team: impl Into<String>, bowling_team: impl Into<String>, target: u32) -> Self {
        Self::with_config(batting_team, bowling_team, target, RulesConfig::default())
    }

    pub fn with_config(
        batting_team: impl Into<String>,
        bowling_team: impl Into<String>,
        target: u32,
        config: RulesConfig,
    ) -> Self {
        Self {
            state: MatchState::new(batting_team, bowling_team, target, config),
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn into_state(self) -> MatchState {
        self.state
    }

    /// Hand the caller's recent commentary to the state for de-duplication.
    pub fn set_commentary_history(&mut self, lines: impl IntoIterator<Item = String>) {
        self.state.set_commentary_history(lines);
    }

    /// Apply one delivery and return the updated state.
    pub fn update(&mut self, ball: &DeliveryEvent) -> &MatchState {
        self.state.transitions = self.detect_transitions(ball);

        let s = &mut self.state;
        let total_ball_runs = ball.total_runs();
        let is_legal = ball.is_legal();
        let is_dot = ball.is_dot();

        s.total_runs += total_ball_runs;
        s.extras.record(ball.extras_kind, ball.extras);

        if is_legal {
            s.balls_in_current_over += 1;
            s.total_balls_bowled += 1;
            s.last_6_balls.push(ball.runs);
            if s.last_6_balls.len() > RECENT_BALLS_WINDOW {
                s.last_6_balls.remove(0);
            }
        }

        if is_dot {
            s.consecutive_dots += 1;
        } else {
            s.consecutive_dots = 0;
        }

        s.current_over_runs += total_ball_runs;
        if ball.is_wicket {
            s.current_over_wickets += 1;
        }

        if ball.is_four_or_six() {
            s.balls_since_last_boundary = 0;
            if ball.is_four() {
                s.total_fours += 1;
            }
            if ball.is_six {
                s.total_sixes += 1;
            }
        } else if is_legal {
            s.balls_since_last_boundary += 1;
        }

        if is_legal {
            s.balls_since_last_wicket += 1;
        }

        let striker = s.batter_entry(&ball.batter);
        if is_legal {
            striker.balls_faced += 1;
            if is_dot {
                striker.dots += 1;
            }
        }
        striker.runs += ball.runs;
        if ball.is_four() {
            striker.fours += 1;
        }
        if ball.is_six {
            striker.sixes += 1;
        }
        if let Some(non_striker) = &ball.non_striker {
            s.batter_entry(non_striker);
        }

        let bowler = s.bowler_entry(&ball.bowler);
        bowler.runs_conceded += total_ball_runs;
        if is_legal {
            bowler.balls_bowled += 1;
            if is_dot {
                bowler.dots += 1;
            }
        }
        if ball.is_four() {
            bowler.fours_conceded += 1;
        }
        if ball.is_six {
            bowler.sixes_conceded += 1;
        }
        match ball.extras_kind {
            ExtrasKind::Wide => bowler.wides += ball.extras,
            ExtrasKind::NoBall => bowler.noballs += ball.extras,
            _ => {}
        }
        if ball.is_wicket && ball.wicket_kind.map_or(true, |k| k.credited_to_bowler()) {
            bowler.wickets += 1;
        }

        s.partnership_runs += total_ball_runs;
        if is_legal {
            s.partnership_balls += 1;
        }

        if ball.is_wicket {
            self.record_wicket(ball);
        }

        if self.state.balls_in_current_over >= BALLS_PER_OVER {
            self.complete_over(&ball.bowler);
        }

        let s = &mut self.state;
        s.previous_batter = s.current_batter.replace(ball.batter.clone());
        s.previous_bowler = s.current_bowler.replace(ball.bowler.clone());
        s.non_striker = match &ball.non_striker {
            Some(name) => Some(name.clone()),
            None => s.other_active_batter(&ball.batter),
        };

        self.check_invariants();
        &self.state
    }

    /// Compare the incoming delivery with the previous one. Nothing is
    /// flagged on the first ball of the innings.
    fn detect_transitions(&self, ball: &DeliveryEvent) -> TransitionFlags {
        let s = &self.state;
        let mut flags = TransitionFlags::default();
        let Some(current_bowler) = s.current_bowler.as_deref() else {
            return flags;
        };

        if ball.bowler != current_bowler {
            flags.is_new_bowler = true;
            flags.is_new_over = true;
        }
        if s.current_batter.as_deref().is_some_and(|b| b != ball.batter) {
            flags.is_strike_change = true;
        }
        if !s.batters.contains_key(&ball.batter) {
            flags.new_batter = Some(ball.batter.clone());
        }
        if let Some(non_striker) = &ball.non_striker {
            if !s.batters.contains_key(non_striker) {
                flags.new_batter = Some(non_striker.clone());
            }
        }
        flags
    }

    fn record_wicket(&mut self, ball: &DeliveryEvent) {
        let s = &mut self.state;
        s.wickets += 1;

        let dismissed = ball.dismissed_batter().to_string();
        let batter = s.batter_entry(&dismissed);
        batter.is_out = true;
        let batter_runs = batter.runs;
        let partner = s.other_active_batter(&dismissed);

        s.fall_of_wickets.push(FallOfWicket {
            wicket_number: s.wickets,
            batter: dismissed,
            batter_runs,
            team_score: s.total_runs,
            overs: overs_display(s.total_balls_bowled),
            over: s.overs_completed,
            legal_balls: s.total_balls_bowled,
            bowler: ball.bowler.clone(),
            how: ball.wicket_kind,
            partner,
            partnership_runs: s.partnership_runs,
            partnership_balls: s.partnership_balls,
        });

        s.partnership_runs = 0;
        s.partnership_balls = 0;
        s.partnership_number += 1;
        s.balls_since_last_wicket = 0;
    }

    fn complete_over(&mut self, bowler_name: &str) {
        let s = &mut self.state;
        let over_runs = s.current_over_runs;
        let over_wickets = s.current_over_wickets;

        let figures = match s.bowlers.get_mut(bowler_name) {
            Some(bowler) => {
                if over_runs == 0 {
                    bowler.maidens += 1;
                }
                bowler.figures()
            }
            None => String::new(),
        };

        s.over_runs_history.push(over_runs);
        s.previous_over_summary = Some(format!(
            "Over {}: {} runs, {} wicket(s). Bowler: {} - figures: {}",
            s.overs_completed + 1,
            over_runs,
            over_wickets,
            bowler_name,
            figures
        ));

        s.overs_completed += 1;
        s.balls_in_current_over = 0;
        s.current_over_runs = 0;
        s.current_over_wickets = 0;
    }

    fn check_invariants(&self) {
        let s = &self.state;
        debug_assert_eq!(
            s.total_balls_bowled,
            s.overs_completed * BALLS_PER_OVER + s.balls_in_current_over
        );
        debug_assert!(s.wickets <= MAX_WICKETS);
        debug_assert!(s.balls_in_current_over < BALLS_PER_OVER);
        debug_assert!(s.last_6_balls.len() <= RECENT_BALLS_WINDOW);
        debug_assert_eq!(s.fall_of_wickets.len() as u32, s.wickets);
        debug_assert_eq!(s.over_runs_history.len() as u32, s.overs_completed);
        debug_assert_eq!(
            s.total_runs,
            s.batters.values().map(|b| b.runs).sum::<u32>() + s.extras.total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanics::{MatchPhase, WicketKind};

    fn ball(over: u32, ball: u32, batter: &str, bowler: &str) -> DeliveryEvent {
        DeliveryEvent::new(over, ball, batter, bowler).with_non_striker(if batter == "A" {
            "B"
        } else {
            "A"
        })
    }

    /// Six legal dots from `bowler` to "A".
    fn maiden(acc: &mut Accumulator, over: u32, bowler: &str) {
        for b in 1..=6 {
            acc.update(&ball(over, b, "A", bowler));
        }
    }

    #[test]
    fn test_wide_does_not_count_as_a_ball() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        let state = acc.update(&ball(0, 1, "A", "X").with_extras(ExtrasKind::Wide, 1));

        assert_eq!(state.total_runs, 1);
        assert_eq!(state.extras.wides, 1);
        assert_eq!(state.total_balls_bowled, 0);
        assert_eq!(state.balls_in_current_over, 0);
        assert_eq!(state.bowlers["X"].runs_conceded, 1);
        assert_eq!(state.bowlers["X"].wides, 1);
        assert_eq!(state.batters["A"].balls_faced, 0);
        assert_eq!(state.consecutive_dots, 0);
        assert!(state.last_6_balls.is_empty());
    }

    #[test]
    fn test_maiden_over_completion() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        maiden(&mut acc, 0, "X");
        let state = acc.state();

        assert_eq!(state.overs_completed, 1);
        assert_eq!(state.balls_in_current_over, 0);
        assert_eq!(state.over_runs_history, vec![0]);
        assert_eq!(state.bowlers["X"].maidens, 1);
        assert_eq!(state.consecutive_dots, 6);
        assert_eq!(state.batters["A"].dots, 6);
        assert_eq!(
            state.previous_over_summary.as_deref(),
            Some("Over 1: 0 runs, 0 wicket(s). Bowler: X - figures: 0/0 (1.0)")
        );
    }

    #[test]
    fn test_four_resets_drought() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        acc.update(&ball(0, 1, "A", "X"));
        acc.update(&ball(0, 2, "A", "X"));
        assert_eq!(acc.state().balls_since_last_boundary, 2);

        let state = acc.update(&ball(0, 3, "A", "X").with_runs(4));
        assert_eq!(state.balls_since_last_boundary, 0);
        assert_eq!(state.total_fours, 1);
        assert_eq!(state.batters["A"].fours, 1);
        assert_eq!(state.bowlers["X"].fours_conceded, 1);
        assert_eq!(state.consecutive_dots, 0);
        assert_eq!(state.last_6_balls, vec![0, 0, 4]);
    }

    #[test]
    fn test_run_out_of_non_striker() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        acc.update(&ball(0, 1, "A", "X").with_runs(1));
        acc.update(&ball(0, 2, "B", "X").with_runs(2));
        let state = acc.update(
            &ball(0, 3, "A", "X")
                .with_run_runs(1)
                .with_wicket(WicketKind::RunOut)
                .with_dismissed("B"),
        );

        assert_eq!(state.wickets, 1);
        assert!(state.batters["B"].is_out);
        assert!(!state.batters["A"].is_out);
        assert_eq!(state.bowlers["X"].wickets, 0);

        let fow = &state.fall_of_wickets[0];
        assert_eq!(fow.batter, "B");
        assert_eq!(fow.batter_runs, 2);
        assert_eq!(fow.team_score, 4);
        assert_eq!(fow.overs, "0.3");
        assert_eq!(fow.partner.as_deref(), Some("A"));
        assert_eq!(fow.partnership_runs, 4);
        assert_eq!(fow.partnership_balls, 3);

        assert_eq!(state.partnership_runs, 0);
        assert_eq!(state.partnership_number, 2);
        assert_eq!(state.balls_since_last_wicket, 0);
    }

    #[test]
    fn test_bowled_credits_bowler() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        let state = acc.update(&ball(0, 1, "A", "X").with_wicket(WicketKind::Bowled));
        assert_eq!(state.bowlers["X"].wickets, 1);
        assert_eq!(state.fall_of_wickets[0].partner.as_deref(), Some("B"));
        assert_eq!(state.consecutive_dots, 0);
        assert_eq!(state.batters["A"].balls_faced, 1);
        assert_eq!(state.batters["A"].dots, 0);
    }

    #[test]
    fn test_wicket_on_last_ball_of_over_reads_as_completed_over() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        for b in 1..=5 {
            acc.update(&ball(0, b, "A", "X"));
        }
        let state = acc.update(&ball(0, 6, "A", "X").with_wicket(WicketKind::Bowled));

        let fow = &state.fall_of_wickets[0];
        assert_eq!(fow.overs, "1.0");
        assert_eq!(fow.over, 0);
        assert_eq!(fow.legal_balls, 6);
        assert_eq!(fow.short(), "1/0(1.0)");
    }

    #[test]
    fn test_feed_six_is_not_a_four() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        let six: DeliveryEvent = serde_json::from_str(
            r#"{"over": 0, "ball": 1, "batsman": "A", "non_striker": "B", "bowler": "X",
                "runs": 6, "is_boundary": true, "is_six": true}"#,
        )
        .unwrap();
        let state = acc.update(&six);

        assert_eq!(state.total_sixes, 1);
        assert_eq!(state.total_fours, 0);
        assert_eq!(state.batters["A"].sixes, 1);
        assert_eq!(state.batters["A"].fours, 0);
        assert_eq!(state.bowlers["X"].fours_conceded, 0);
        assert_eq!(state.bowlers["X"].sixes_conceded, 1);
    }

    #[test]
    fn test_no_transitions_on_first_ball() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        let state = acc.update(&ball(0, 1, "A", "X"));
        assert_eq!(state.transitions, TransitionFlags::default());
    }

    #[test]
    fn test_transition_flags() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        maiden(&mut acc, 0, "X");

        let state = acc.update(&ball(1, 1, "B", "Y"));
        assert!(state.transitions.is_new_bowler);
        assert!(state.transitions.is_new_over);
        assert!(state.transitions.is_strike_change);
        assert!(!state.transitions.is_new_batter());
        assert_eq!(state.previous_bowler.as_deref(), Some("X"));
        assert_eq!(state.previous_batter.as_deref(), Some("A"));

        let state = acc.update(&ball(1, 2, "B", "Y").with_wicket(WicketKind::Lbw));
        assert!(!state.transitions.is_new_bowler);

        let state = acc.update(&DeliveryEvent::new(1, 3, "C", "Y").with_non_striker("A"));
        assert_eq!(state.transitions.new_batter.as_deref(), Some("C"));
        assert_eq!(state.batters["C"].position, 3);
    }

    #[test]
    fn test_non_striker_inferred_when_absent() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        acc.update(&ball(0, 1, "A", "X").with_runs(1));
        let state = acc.update(&DeliveryEvent::new(0, 2, "B", "X"));
        assert_eq!(state.non_striker.as_deref(), Some("A"));
    }

    #[test]
    fn test_chase_equation() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 20);
        for b in 1..=5 {
            acc.update(&ball(0, b, "A", "X").with_runs(4));
        }
        let state = acc.state();
        assert_eq!(state.runs_needed(), 0);
        assert!(state.is_innings_complete());
        assert_eq!(state.balls_remaining(), 115);
    }

    #[test]
    fn test_phase_follows_over_in_progress() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        for over in 0..6 {
            maiden(&mut acc, over, if over % 2 == 0 { "X" } else { "Y" });
        }
        // The sixth ball of over 6 still belongs to the powerplay
        assert_eq!(acc.state().overs_completed, 6);
        assert_eq!(acc.state().current_over(), 6);
        assert_eq!(acc.state().match_phase(), MatchPhase::Powerplay);

        // A wide does not start the next over
        acc.update(&ball(6, 1, "A", "X").with_extras(ExtrasKind::Wide, 1));
        assert_eq!(acc.state().match_phase(), MatchPhase::Powerplay);

        let state = acc.update(&ball(6, 1, "A", "X"));
        assert_eq!(state.current_over(), 7);
        assert_eq!(state.match_phase(), MatchPhase::Middle);
    }

    #[test]
    fn test_collapse_window() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        maiden(&mut acc, 0, "X");
        for (b, batter) in [(1, "A"), (2, "C"), (3, "D")] {
            acc.update(
                &DeliveryEvent::new(1, b, batter, "Y")
                    .with_wicket(WicketKind::Bowled)
                    .with_non_striker("B"),
            );
        }
        let state = acc.state();
        assert_eq!(state.wickets, 3);
        assert!(state.is_collapse());
        assert_eq!(state.active_batters(), vec!["B"]);
    }

    #[test]
    fn test_runs_reconcile_with_byes() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 0);
        acc.update(&ball(0, 1, "A", "X").with_extras(ExtrasKind::LegBye, 2));
        acc.update(&ball(0, 2, "A", "X").with_runs(3));
        let state = acc.update(&ball(0, 3, "B", "X").with_extras(ExtrasKind::NoBall, 1).with_runs(4));

        assert_eq!(state.total_runs, 10);
        assert_eq!(state.extras.total, 3);
        assert_eq!(state.extras.legbyes, 2);
        assert_eq!(state.total_balls_bowled, 2);
        assert_eq!(state.bowlers["X"].runs_conceded, 10);
        assert_eq!(state.batters["B"].balls_faced, 0);
        assert_eq!(state.batters["B"].runs, 4);
    }
}
