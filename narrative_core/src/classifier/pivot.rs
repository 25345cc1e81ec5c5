//! Pivot detection and required-rate shifts.
//!
//! A pivot is a single delivery that swings the match equation far enough to
//! deserve the most intense treatment downstream.

use cricket_rules::{format_rate, round_to, DeliveryEvent, MatchPhase, MatchState, BALLS_PER_OVER};

use crate::config::NarrativeConfig;

/// Whether this delivery is a pivot. `state` is the state after the ball.
pub fn detect_pivot(state: &MatchState, ball: &DeliveryEvent, config: &NarrativeConfig) -> bool {
    let rrr = state.rrr();

    if ball.is_six && rrr > config.pressure_rrr {
        return true;
    }

    if ball.is_four() && state.is_chase() && state.match_phase() == MatchPhase::Death {
        let per_ball = state.runs_needed() as f64 / state.balls_remaining().max(1) as f64;
        if per_ball > config.death_runs_per_ball {
            return true;
        }
    }

    if ball.is_wicket {
        let set_batter = state
            .batters
            .get(ball.dismissed_batter())
            .is_some_and(|b| b.runs >= config.set_batter_runs);
        if set_batter || state.wickets >= config.tail_wickets {
            return true;
        }
    }

    if ball.is_four_or_six() && previous_ball_runs(state, ball).is_some_and(|runs| runs >= 4) {
        return true;
    }

    ball.extras_kind.is_illegal()
        && state.is_chase()
        && state.balls_remaining() <= config.tight_finish_balls
        && state.runs_needed() <= config.tight_finish_runs
}

/// Runs off the bat on the legal ball before this one.
///
/// Only legal balls enter the recent window, so for a wide or no-ball the
/// newest entry is already the previous ball.
fn previous_ball_runs(state: &MatchState, ball: &DeliveryEvent) -> Option<u32> {
    let window = &state.last_6_balls;
    let back = if ball.is_legal() { 2 } else { 1 };
    window.len().checked_sub(back).map(|i| window[i])
}

/// Describe how far the required rate moved on this ball, if it moved enough.
///
/// Only chases with more than one run off the ball are considered. The rate
/// before the ball is rebuilt by adding back its runs and, for a legal ball,
/// the ball itself.
pub fn equation_shift(
    state: &MatchState,
    ball: &DeliveryEvent,
    config: &NarrativeConfig,
) -> Option<String> {
    if !state.is_chase() {
        return None;
    }
    let ball_runs = ball.total_runs();
    if ball_runs <= 1 {
        return None;
    }

    let runs_before = state.target.saturating_sub(state.total_runs.saturating_sub(ball_runs));
    let balls_before = state.balls_remaining() + u32::from(ball.is_legal());
    if balls_before == 0 {
        return None;
    }

    let before = round_to(
        runs_before as f64 * BALLS_PER_OVER as f64 / balls_before as f64,
        1,
    );
    let after = state.rrr();

    // Rates are rounded, so compare with a little slack to keep an exact 0.5 in.
    if (before - after).abs() + 1e-9 < config.equation_shift_min {
        return None;
    }

    Some(format!(
        "From {} per over down to {}",
        format_rate(before),
        format_rate(after)
    ))
}
