//! Narrative triggers - the moments worth a dedicated piece of commentary.
//!
//! Triggers are found by comparing consecutive states across a replay: a
//! milestone passed on this ball, a new batter on the way in, an over or
//! phase completed, or the innings decided.

use cricket_rules::{DeliveryEvent, MatchPhase, MatchState, MAX_WICKETS};
use serde::{Deserialize, Serialize};

use crate::classifier::NarrativeBranch;
use crate::replay::InningsSummary;

/// Batting landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Fifty,
    Hundred,
}

impl MilestoneKind {
    pub fn runs(&self) -> u32 {
        match self {
            MilestoneKind::Fifty => 50,
            MilestoneKind::Hundred => 100,
        }
    }
}

/// A moment detected after a delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NarrativeTrigger {
    Milestone {
        kind: MilestoneKind,
        batter: String,
        runs: u32,
        balls: u32,
        fours: u32,
        sixes: u32,
        strike_rate: f64,
        situation: String,
    },
    NewBatter {
        /// Batting position the incoming batter will take.
        position: u32,
        /// Known only when a later delivery names them.
        incoming: Option<String>,
        partnership_broken: String,
        situation: String,
    },
    /// Announced when the first over of a new phase is complete.
    PhaseChange {
        new_phase: MatchPhase,
        /// "Middle Overs".
        title: String,
        summary: String,
    },
    EndOfOver {
        /// 1-based.
        over: u32,
        runs: u32,
        wickets: u32,
        bowler: String,
        bowler_figures: String,
        phase: MatchPhase,
    },
    InningsEnd {
        batting_team: String,
        total: u32,
        wickets: u32,
        overs: String,
    },
    MatchResult {
        result_text: String,
        highlights: Vec<String>,
    },
}

impl NarrativeTrigger {
    /// The branch a generator should use to voice this moment.
    pub fn branch(&self) -> NarrativeBranch {
        match self {
            NarrativeTrigger::Milestone { .. } => NarrativeBranch::BoundaryMomentum,
            NarrativeTrigger::NewBatter { .. } => NarrativeBranch::WicketDrama,
            NarrativeTrigger::PhaseChange { .. } | NarrativeTrigger::EndOfOver { .. } => {
                NarrativeBranch::OverTransition
            }
            NarrativeTrigger::InningsEnd { .. } | NarrativeTrigger::MatchResult { .. } => {
                NarrativeBranch::WicketDrama
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NarrativeTrigger::Milestone { .. } => "milestone",
            NarrativeTrigger::NewBatter { .. } => "new_batter",
            NarrativeTrigger::PhaseChange { .. } => "phase_change",
            NarrativeTrigger::EndOfOver { .. } => "end_of_over",
            NarrativeTrigger::InningsEnd { .. } => "innings_end",
            NarrativeTrigger::MatchResult { .. } => "match_result",
        }
    }
}

/// Tracks phase and over progress across a replay loop.
#[derive(Debug, Clone, Default)]
pub struct TriggerDetector {
    previous_phase: MatchPhase,
    previous_overs_completed: u32,
    first_innings: Option<InningsSummary>,
}

impl TriggerDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the first innings in the match-result highlights.
    pub fn with_first_innings(mut self, summary: InningsSummary) -> Self {
        self.first_innings = Some(summary);
        self
    }

    /// Triggers for one delivery, given the state after it.
    ///
    /// `innings_over` is whether this ball ended the innings; `incoming` is
    /// the next new batter if a later delivery names one.
    pub fn detect(
        &mut self,
        state: &MatchState,
        ball: &DeliveryEvent,
        innings_over: bool,
        incoming: Option<&str>,
    ) -> Vec<NarrativeTrigger> {
        let mut triggers = Vec::new();

        if !innings_over {
            if let Some(trigger) = self.milestone(state, ball) {
                triggers.push(trigger);
            }
            if ball.is_wicket && state.wickets < MAX_WICKETS {
                triggers.push(self.new_batter(state, ball, incoming));
            }
            if state.overs_completed > self.previous_overs_completed {
                triggers.push(self.over_completed(state, ball));
            }
        }

        if innings_over {
            triggers.push(if state.is_chase() {
                self.match_result(state)
            } else {
                NarrativeTrigger::InningsEnd {
                    batting_team: state.batting_team.clone(),
                    total: state.total_runs,
                    wickets: state.wickets,
                    overs: state.overs_display(),
                }
            });
        }

        if state.overs_completed > self.previous_overs_completed {
            self.previous_phase = state.match_phase();
            self.previous_overs_completed = state.overs_completed;
        }

        triggers
    }

    fn milestone(&self, state: &MatchState, ball: &DeliveryEvent) -> Option<NarrativeTrigger> {
        let batter = state.batters.get(&ball.batter)?;
        let before = batter.runs.saturating_sub(ball.runs);
        let crossed = |kind: MilestoneKind| before < kind.runs() && batter.runs >= kind.runs();

        let kind = if crossed(MilestoneKind::Hundred) {
            MilestoneKind::Hundred
        } else if crossed(MilestoneKind::Fifty) && batter.runs < MilestoneKind::Hundred.runs() {
            MilestoneKind::Fifty
        } else {
            return None;
        };

        Some(NarrativeTrigger::Milestone {
            kind,
            batter: batter.name.clone(),
            runs: batter.runs,
            balls: batter.balls_faced,
            fours: batter.fours,
            sixes: batter.sixes,
            strike_rate: batter.strike_rate(),
            situation: situation_line(state),
        })
    }

    fn new_batter(
        &self,
        state: &MatchState,
        ball: &DeliveryEvent,
        incoming: Option<&str>,
    ) -> NarrativeTrigger {
        let partnership_broken = state
            .fall_of_wickets
            .last()
            .map(|fow| {
                format!(
                    "{} out for {} at {}/{}",
                    ball.dismissed_batter(),
                    fow.batter_runs,
                    fow.team_score,
                    fow.wicket_number
                )
            })
            .unwrap_or_default();

        let mut situation = situation_line(state);
        if state.is_collapse() {
            situation.push_str(" - collapse in progress!");
        }

        NarrativeTrigger::NewBatter {
            position: state.next_batting_position(),
            incoming: incoming.map(str::to_string),
            partnership_broken,
            situation,
        }
    }

    fn over_completed(&self, state: &MatchState, ball: &DeliveryEvent) -> NarrativeTrigger {
        let phase = state.match_phase();
        if phase != self.previous_phase {
            let summary = match self.previous_phase {
                MatchPhase::Powerplay => format!(
                    "Powerplay done: {} runs, {} wickets",
                    state.powerplay_runs(),
                    state.wickets
                ),
                MatchPhase::Middle => {
                    format!("Middle overs done: {} runs scored", state.middle_overs_runs())
                }
                MatchPhase::Death => String::new(),
            };
            return NarrativeTrigger::PhaseChange {
                new_phase: phase,
                title: phase.title().to_string(),
                summary,
            };
        }

        let over_index = state.overs_completed - 1;
        NarrativeTrigger::EndOfOver {
            over: state.overs_completed,
            runs: state.over_runs_history.last().copied().unwrap_or(0),
            wickets: state
                .fall_of_wickets
                .iter()
                .filter(|fow| fow.over == over_index)
                .count() as u32,
            bowler: ball.bowler.clone(),
            bowler_figures: state
                .bowlers
                .get(&ball.bowler)
                .map(|b| b.figures())
                .unwrap_or_default(),
            phase,
        }
    }

    fn match_result(&self, state: &MatchState) -> NarrativeTrigger {
        let needed = state.runs_needed();
        let result_text = if needed == 0 {
            format!(
                "{} WIN by {} wicket(s)! They chased down {} with {} balls to spare.",
                state.batting_team,
                MAX_WICKETS.saturating_sub(state.wickets),
                state.target,
                state.balls_remaining()
            )
        } else if needed == 1 {
            format!(
                "Match TIED! {} finished level on {}.",
                state.batting_team, state.total_runs
            )
        } else if state.is_all_out() {
            format!(
                "{} WIN by {} runs! {} all out for {}.",
                state.bowling_team,
                needed - 1,
                state.batting_team,
                state.total_runs
            )
        } else {
            format!(
                "{} WIN by {} runs! {} could only manage {}/{} in {} overs.",
                state.bowling_team,
                needed - 1,
                state.batting_team,
                state.total_runs,
                state.wickets,
                state.overs_display()
            )
        };

        let mut highlights = Vec::new();
        let top_scorer = state
            .batters_in_order()
            .into_iter()
            .fold(None, |best: Option<&cricket_rules::BatterStats>, b| match best {
                Some(top) if top.runs >= b.runs => Some(top),
                _ => Some(b),
            });
        if let Some(top) = top_scorer.filter(|b| b.runs >= 15) {
            highlights.push(format!(
                "Top scorer: {} {}({})",
                top.name, top.runs, top.balls_faced
            ));
        }

        let best_bowler = state
            .bowlers_in_order()
            .into_iter()
            .filter(|b| b.wickets > 0)
            .fold(None, |best: Option<&cricket_rules::BowlerStats>, b| match best {
                Some(top)
                    if (top.wickets, std::cmp::Reverse(top.runs_conceded))
                        >= (b.wickets, std::cmp::Reverse(b.runs_conceded)) =>
                {
                    Some(top)
                }
                _ => Some(b),
            });
        if let Some(best) = best_bowler {
            highlights.push(format!("Best bowler: {} {}", best.name, best.figures()));
        }

        if let Some(first) = &self.first_innings {
            highlights.push(format!(
                "First innings: {} {}/{}",
                first.batting_team, first.total_runs, first.wickets
            ));
        }

        NarrativeTrigger::MatchResult {
            result_text,
            highlights,
        }
    }
}

/// "Need N from B balls" in a chase, the score otherwise.
fn situation_line(state: &MatchState) -> String {
    if state.is_chase() {
        format!(
            "Need {} from {} balls",
            state.runs_needed(),
            state.balls_remaining()
        )
    } else {
        format!(
            "{}/{} after {} overs",
            state.total_runs,
            state.wickets,
            state.overs_display()
        )
    }
}
