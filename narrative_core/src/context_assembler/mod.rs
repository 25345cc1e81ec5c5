//! Context Assembler - builds the context notes handed to the text generator.
//!
//! Notes are short, independent observations. Each is included only when its
//! condition holds, and they are emitted in a fixed group order so the most
//! decision-relevant facts come first:
//!
//! 1. **Transitions**: new over, bowling change, new batter, strike rotation
//! 2. **Situation**: phase, current over so far, match-situation label
//! 3. **Batters**: striker form and milestones, non-striker score
//! 4. **Bowler**: figures with economy, dots, leaks and extras
//! 5. **Partnership**: the current stand (not on wicket balls)
//! 6. **Wicket**: dismissal details, collapse and fall-of-wicket trail
//! 7. **Momentum**: recent runs, dots, droughts, run-rate trend (not on wicket balls)
//! 8. **Innings stats**: boundary tally, extras, dot share, powerplay close (not on wicket balls)
//! 9. **Equation**: runs needed in the death overs of a chase
//!
//! A routine ball yields a few notes; a significant one yields many.

mod situation;

pub use situation::*;

use cricket_rules::{
    format_rate, DeliveryEvent, MatchPhase, MatchState, ScoringMomentum, BALLS_PER_OVER,
    MAX_WICKETS, RECENT_BALLS_WINDOW,
};

use crate::config::NarrativeConfig;

/// Separator between notes.
pub const NOTE_SEPARATOR: &str = ". ";

/// Suffix for a soft observation that recent commentary already made.
pub const ALREADY_NOTED: &str = " (already noted recently)";

/// Fall-of-wicket entries shown in the trail.
const FOW_TRAIL_LEN: usize = 3;

/// Builds context notes from the state after a ball.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    config: NarrativeConfig,
}

impl ContextAssembler {
    pub fn new(config: NarrativeConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(NarrativeConfig::default())
    }

    /// Assemble every applicable note, joined with [`NOTE_SEPARATOR`].
    pub fn build_notes(&self, state: &MatchState, ball: &DeliveryEvent) -> String {
        self.collect_notes(state, ball).join(NOTE_SEPARATOR)
    }

    /// The individual notes, in group order.
    pub fn collect_notes(&self, state: &MatchState, ball: &DeliveryEvent) -> Vec<String> {
        let mut notes = Notes::new(state, self.config.dedup_lookback_lines);

        self.transition_notes(state, ball, &mut notes);
        self.situation_notes(state, &mut notes);
        self.batter_notes(state, ball, &mut notes);
        self.bowler_notes(state, ball, &mut notes);

        if ball.is_wicket {
            self.wicket_notes(state, ball, &mut notes);
        } else {
            self.partnership_notes(state, &mut notes);
            self.momentum_notes(state, &mut notes);
            self.innings_notes(state, ball, &mut notes);
        }

        self.equation_notes(state, &mut notes);
        notes.into_inner()
    }

    fn transition_notes(&self, state: &MatchState, ball: &DeliveryEvent, notes: &mut Notes) {
        let transitions = &state.transitions;

        if transitions.is_new_bowler {
            match state.previous_bowler.as_deref() {
                Some(previous) if balls_before(state, ball) > 0 => {
                    notes.push(format!(
                        "Bowling change: {} replaces {} mid-over",
                        ball.bowler, previous
                    ));
                }
                _ => {
                    notes.push(format!("NEW OVER: {} comes into the attack", ball.bowler));
                    if let Some(summary) = &state.previous_over_summary {
                        notes.push(format!("Previous: {}", summary));
                    }
                }
            }
        }

        if let Some(name) = &transitions.new_batter {
            let position = state
                .batters
                .get(name)
                .map(|b| b.position)
                .unwrap_or_else(|| state.next_batting_position());
            notes.push(format!("NEW BATTER: {} walks in at #{}", name, position));
        } else if transitions.is_strike_change && !transitions.is_new_over {
            if let Some(previous) = &state.previous_batter {
                notes.push(format!(
                    "Strike rotated: {} now facing (was {})",
                    ball.batter, previous
                ));
            }
        }
    }

    fn situation_notes(&self, state: &MatchState, notes: &mut Notes) {
        notes.push(format!("Phase: {}", state.match_phase()));
        if state.balls_in_current_over > 0 {
            notes.push(format!(
                "This over so far: {}/{}b",
                state.current_over_runs, state.balls_in_current_over
            ));
        }
        if let Some(situation) = MatchSituation::assess(state) {
            notes.push(format!("MATCH SITUATION: {}", situation));
        }
    }

    fn batter_notes(&self, state: &MatchState, ball: &DeliveryEvent, notes: &mut Notes) {
        let name = &ball.batter;
        if let Some(batter) = state.batters.get(name) {
            if batter.balls_faced == 0 {
                notes.push(format!("{} on strike, yet to face a ball", name));
            } else if batter.runs == 0 {
                notes.push_soft(
                    format!("{} struggling: 0({})", name, batter.balls_faced),
                    &["struggling"],
                );
            } else {
                let mut line = format!(
                    "{}: {}({}) SR {}",
                    name,
                    batter.runs,
                    batter.balls_faced,
                    format_rate(batter.strike_rate())
                );
                if batter.fours > 0 || batter.sixes > 0 {
                    line.push_str(&format!(" [{}x4, {}x6]", batter.fours, batter.sixes));
                }
                notes.push(line);
            }

            if batter.balls_faced >= 10 && batter.dot_percentage() >= 60.0 {
                notes.push_soft(
                    format!(
                        "{} dot% = {}% - struggling to rotate",
                        name,
                        format_rate(batter.dot_percentage())
                    ),
                    &["struggling", "rotate"],
                );
            }

            if batter.approaching_fifty() {
                notes.push(format!("MILESTONE: {} approaching 50 (on {})", name, batter.runs));
            } else if batter.approaching_hundred() {
                notes.push(format!("MILESTONE: {} approaching 100 (on {})", name, batter.runs));
            }
        }

        if let Some(non_striker) = state.non_striker.as_deref() {
            if let Some(batter) = state.batters.get(non_striker).filter(|b| !b.is_out) {
                notes.push(format!(
                    "Non-striker {}: {}({})",
                    non_striker, batter.runs, batter.balls_faced
                ));
            }
        }
    }

    fn bowler_notes(&self, state: &MatchState, ball: &DeliveryEvent, notes: &mut Notes) {
        let Some(bowler) = state.bowlers.get(&ball.bowler) else {
            return;
        };
        let mut line = format!(
            "Bowler {}: {} econ {}",
            ball.bowler,
            bowler.figures(),
            format_rate(bowler.economy())
        );
        if bowler.dots >= 6 {
            line.push_str(&format!(", {} dots", bowler.dots));
        }
        if bowler.boundaries_conceded() >= 3 {
            line.push_str(&format!(
                ", leaked {}x4 {}x6",
                bowler.fours_conceded, bowler.sixes_conceded
            ));
        }
        if bowler.wides + bowler.noballs >= 2 {
            line.push_str(&format!(", {}w {}nb extras", bowler.wides, bowler.noballs));
        }
        notes.push(line);
    }

    fn partnership_notes(&self, state: &MatchState, notes: &mut Notes) {
        if state.partnership_balls > 0 {
            notes.push(format!(
                "{} wicket partnership: {} off {}b",
                ordinal(state.partnership_number),
                state.partnership_runs,
                state.partnership_balls
            ));
        }
    }

    fn wicket_notes(&self, state: &MatchState, ball: &DeliveryEvent, notes: &mut Notes) {
        let config = &self.config;
        let dismissed = ball.dismissed_batter();

        if let Some(batter) = state.batters.get(dismissed) {
            notes.push(format!(
                "{} out for {}({}) [{}x4, {}x6]",
                dismissed, batter.runs, batter.balls_faced, batter.fours, batter.sixes
            ));
            if batter.runs >= config.set_batter_runs {
                notes.push("Set batter gone - was looking dangerous".to_string());
            }
            if state.wickets <= 3 {
                notes.push(format!("Top-order wicket, #{} down", state.wickets));
            } else if state.wickets >= config.tail_wickets {
                notes.push(format!(
                    "Tail exposed, only {} left",
                    MAX_WICKETS.saturating_sub(state.wickets)
                ));
            }
        }

        let fow = &state.fall_of_wickets;
        if let Some(last) = fow.last() {
            if last.partnership_runs > config.partnership_note_runs {
                notes.push(format!(
                    "{} wkt stand broken at {}",
                    ordinal(last.wicket_number),
                    last.partnership_runs
                ));
            }
        }

        if state.is_collapse() {
            notes.push(format!(
                "COLLAPSE: 3 wickets inside {} balls!",
                state.config.collapse_window_balls
            ));
        }

        if let [.., previous, last] = fow.as_slice() {
            let gap = last.legal_balls.saturating_sub(previous.legal_balls);
            if gap <= config.quick_wicket_balls {
                notes.push(format!("Back-to-back blow! Only {}b since last wicket", gap));
            }
        }

        if !fow.is_empty() {
            let trail: Vec<String> = fow
                .iter()
                .skip(fow.len().saturating_sub(FOW_TRAIL_LEN))
                .map(|f| f.short())
                .collect();
            notes.push(format!("FOW: {}", trail.join(", ")));
        }
    }

    fn momentum_notes(&self, state: &MatchState, notes: &mut Notes) {
        if state.last_6_balls.len() >= RECENT_BALLS_WINDOW {
            let total: u32 = state.last_6_balls.iter().sum();
            let runs: Vec<String> = state.last_6_balls.iter().map(|r| r.to_string()).collect();
            notes.push(format!("Last 6 balls: {} runs [{}]", total, runs.join(", ")));
        }

        if state.consecutive_dots >= self.config.pressure_dot_balls {
            notes.push_soft(
                format!("{} consecutive dot balls", state.consecutive_dots),
                &["dot ball", "dots in a row"],
            );
        }

        const DROUGHT_KEYS: &[&str] = &["drought", "without a boundary", "no boundary"];
        if state.is_boundary_drought() {
            notes.push_soft(
                format!(
                    "BOUNDARY DROUGHT: {} balls without a boundary!",
                    state.balls_since_last_boundary
                ),
                DROUGHT_KEYS,
            );
        } else if state.balls_since_last_boundary >= 12 {
            notes.push_soft(
                format!("No boundary for {} balls", state.balls_since_last_boundary),
                DROUGHT_KEYS,
            );
        }

        let momentum = state.scoring_momentum();
        if matches!(
            momentum,
            ScoringMomentum::Accelerating | ScoringMomentum::Decelerating
        ) {
            notes.push_soft(
                format!("Scoring is {}", momentum.as_str()),
                &[momentum.as_str()],
            );
        }

        let recent_rate = state.run_rate_last_overs(3);
        if recent_rate > 0.0 {
            notes.push(format!(
                "Last 3 overs: {} RPO (vs match CRR {})",
                format_rate(recent_rate),
                format_rate(state.crr())
            ));
        }
    }

    fn innings_notes(&self, state: &MatchState, ball: &DeliveryEvent, notes: &mut Notes) {
        if ball.is_four_or_six() {
            notes.push(format!(
                "Innings boundaries: {}x4, {}x6 ({:.0}% of runs from boundaries)",
                state.total_fours,
                state.total_sixes,
                state.boundary_runs_percentage()
            ));
        }

        if state.extras.total >= 5 {
            notes.push(format!(
                "Extras so far: {} ({}w, {}nb)",
                state.extras.total, state.extras.wides, state.extras.noballs
            ));
        }

        let dot_share = state.dot_ball_percentage();
        if state.match_phase() != MatchPhase::Powerplay && dot_share >= 50.0 {
            notes.push(format!("Innings dot%: {}%", format_rate(dot_share)));
        }

        let format = state.config.format;
        if ball.is_legal()
            && format.powerplay_overs > 0
            && state.overs_completed == format.powerplay_overs
            && state.balls_in_current_over == 0
        {
            notes.push(format!("Powerplay finished: {} runs", state.powerplay_runs()));
        }
    }

    fn equation_notes(&self, state: &MatchState, notes: &mut Notes) {
        if state.is_chase() && state.match_phase() == MatchPhase::Death {
            notes.push(format!(
                "Need {} from {} balls (RRR {})",
                state.runs_needed(),
                state.balls_remaining(),
                format_rate(state.rrr())
            ));
        }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Notes under construction, with the recent commentary used to flag
/// repeated soft observations.
struct Notes {
    notes: Vec<String>,
    recent: Vec<String>,
}

impl Notes {
    fn new(state: &MatchState, lookback: usize) -> Self {
        let history = &state.commentary_history;
        let recent = history
            .iter()
            .skip(history.len().saturating_sub(lookback))
            .map(|line| line.to_lowercase())
            .collect();
        Self {
            notes: Vec::new(),
            recent,
        }
    }

    fn push(&mut self, note: String) {
        self.notes.push(note);
    }

    /// Push an observation, marking it when recent commentary mentions any key.
    fn push_soft(&mut self, note: String, keys: &[&str]) {
        let repeated = keys
            .iter()
            .any(|key| self.recent.iter().any(|line| line.contains(key)));
        if repeated {
            self.notes.push(format!("{}{}", note, ALREADY_NOTED));
        } else {
            self.notes.push(note);
        }
    }

    fn into_inner(self) -> Vec<String> {
        self.notes
    }
}

/// Legal balls already bowled in the over when this ball was delivered.
fn balls_before(state: &MatchState, ball: &DeliveryEvent) -> u32 {
    if !ball.is_legal() {
        state.balls_in_current_over
    } else if state.balls_in_current_over == 0 {
        BALLS_PER_OVER - 1
    } else {
        state.balls_in_current_over - 1
    }
}

/// 1st, 2nd, 3rd, 4th, ... 11th, 12th, 13th, 21st.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_rules::{Accumulator, ExtrasKind, WicketKind};

    fn ball(over: u32, n: u32, batter: &str, bowler: &str) -> DeliveryEvent {
        let partner = if batter == "A" { "B" } else { "A" };
        DeliveryEvent::new(over, n, batter, bowler).with_non_striker(partner)
    }

    fn notes_after(acc: &mut Accumulator, delivery: &DeliveryEvent) -> Vec<String> {
        let state = acc.update(delivery);
        ContextAssembler::with_defaults().collect_notes(state, delivery)
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(21), "21st");
    }

    #[test]
    fn test_first_ball_notes() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        let notes = notes_after(&mut acc, &ball(0, 1, "A", "X").with_runs(1));
        assert_eq!(
            notes,
            vec![
                "Phase: powerplay",
                "This over so far: 1/1b",
                "A: 1(1) SR 100.0",
                "Non-striker B: 0(0)",
                "Bowler X: 0/1 (0.1) econ 6.0",
                "1st wicket partnership: 1 off 1b",
            ]
        );
    }

    #[test]
    fn test_new_over_announces_previous_summary() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        for n in 1..=6 {
            acc.update(&ball(0, n, "A", "X"));
        }
        let notes = notes_after(&mut acc, &ball(1, 1, "B", "Y"));
        assert_eq!(notes[0], "NEW OVER: Y comes into the attack");
        assert_eq!(
            notes[1],
            "Previous: Over 1: 0 runs, 0 wicket(s). Bowler: X - figures: 0/0 (1.0)"
        );
        assert!(!notes.iter().any(|n| n.starts_with("Strike rotated")));
    }

    #[test]
    fn test_mid_over_bowling_change() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        acc.update(&ball(0, 1, "A", "X"));
        let notes = notes_after(&mut acc, &ball(0, 2, "A", "Y"));
        assert_eq!(notes[0], "Bowling change: Y replaces X mid-over");
    }

    #[test]
    fn test_strike_rotation_and_new_batter() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        acc.update(&ball(0, 1, "A", "X").with_runs(1));
        let notes = notes_after(&mut acc, &ball(0, 2, "B", "X"));
        assert_eq!(notes[0], "Strike rotated: B now facing (was A)");

        acc.update(&ball(0, 3, "B", "X").with_wicket(WicketKind::Bowled));
        let notes = notes_after(
            &mut acc,
            &DeliveryEvent::new(0, 4, "C", "X").with_non_striker("A"),
        );
        assert_eq!(notes[0], "NEW BATTER: C walks in at #3");
        assert!(notes.contains(&"2nd wicket partnership: 0 off 1b".to_string()));
    }

    #[test]
    fn test_wicket_notes() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        for n in 1..=6 {
            acc.update(&ball(0, n, "A", "X").with_runs(6));
        }
        let wicket = ball(1, 1, "A", "Y").with_wicket(WicketKind::Caught);
        let notes = notes_after(&mut acc, &wicket);

        assert!(notes.contains(&"A out for 36(7) [0x4, 6x6]".to_string()));
        assert!(notes.contains(&"Set batter gone - was looking dangerous".to_string()));
        assert!(notes.contains(&"Top-order wicket, #1 down".to_string()));
        assert!(notes.contains(&"1st wkt stand broken at 36".to_string()));
        assert!(notes.contains(&"FOW: 1/36(1.1)".to_string()));
        // The dismissal is the story
        assert!(!notes.iter().any(|n| n.contains("partnership")));
        assert!(!notes.iter().any(|n| n.starts_with("Last 6 balls")));
    }

    #[test]
    fn test_back_to_back_wickets() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        acc.update(&ball(0, 1, "A", "X").with_wicket(WicketKind::Bowled));
        acc.update(&DeliveryEvent::new(0, 2, "C", "X").with_non_striker("B"));
        let notes = notes_after(
            &mut acc,
            &DeliveryEvent::new(0, 3, "C", "X")
                .with_wicket(WicketKind::Lbw)
                .with_non_striker("B"),
        );
        assert!(notes.contains(&"Back-to-back blow! Only 2b since last wicket".to_string()));
        assert!(notes.contains(&"FOW: 1/0(0.1), 2/0(0.3)".to_string()));
    }

    #[test]
    fn test_dots_and_dedup_hint() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        for n in 1..=2 {
            acc.update(&ball(0, n, "A", "X"));
        }
        acc.set_commentary_history(vec![
            "Great start".to_string(),
            "Another dot ball, the pressure mounts".to_string(),
        ]);
        let notes = notes_after(&mut acc, &ball(0, 3, "A", "X"));
        assert!(notes.contains(&"3 consecutive dot balls (already noted recently)".to_string()));
        assert!(notes.contains(&"A struggling: 0(3)".to_string()));
    }

    #[test]
    fn test_dedup_only_looks_at_recent_lines() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        for n in 1..=2 {
            acc.update(&ball(0, n, "A", "X"));
        }
        acc.set_commentary_history(vec![
            "Another dot ball".to_string(),
            "one".to_string(),
            "two".to_string(),
            "three".to_string(),
        ]);
        let notes = notes_after(&mut acc, &ball(0, 3, "A", "X"));
        assert!(notes.contains(&"3 consecutive dot balls".to_string()));
    }

    #[test]
    fn test_powerplay_finished_note() {
        let mut acc = Accumulator::new("Openers", "Fielders", 0);
        for over in 0..6 {
            let bowler = if over % 2 == 0 { "X" } else { "Y" };
            for n in 1..=5 {
                acc.update(&ball(over, n, "A", bowler).with_runs(1));
            }
            if over < 5 {
                acc.update(&ball(over, 6, "A", bowler).with_runs(1));
            }
        }
        // Wide before the last ball of the powerplay does not close it
        let notes = notes_after(
            &mut acc,
            &ball(5, 6, "A", "Y").with_extras(ExtrasKind::Wide, 1),
        );
        assert!(!notes.iter().any(|n| n.starts_with("Powerplay finished")));

        let notes = notes_after(&mut acc, &ball(5, 6, "A", "Y").with_runs(1));
        assert!(notes.contains(&"Powerplay finished: 37 runs".to_string()));
        assert_eq!(notes[0], "Phase: powerplay");
    }

    #[test]
    fn test_death_equation_in_chase() {
        let mut acc = Accumulator::new("Chasers", "Defenders", 200);
        for over in 0..15 {
            let bowler = if over % 2 == 0 { "X" } else { "Y" };
            for n in 1..=6 {
                acc.update(&ball(over, n, "A", bowler).with_runs(1));
            }
        }
        let notes = notes_after(&mut acc, &ball(15, 1, "A", "X").with_wicket(WicketKind::Bowled));
        assert_eq!(
            notes.last().map(String::as_str),
            Some("Need 110 from 29 balls (RRR 22.76)")
        );
    }
}
