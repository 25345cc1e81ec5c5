//! Innings replay - drives the accumulator, classifier and trigger detector
//! over an ordered list of deliveries.
//!
//! State is only ever rebuilt by replaying from the first ball, so resuming
//! at delivery N means replaying 0..=N ([`InningsReplay::run_until`]).

mod crease;
mod records;

pub use crease::*;
pub use records::*;

use cricket_rules::{Accumulator, DeliveryEvent, MatchPhase, MatchState, RulesConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::classifier::{LogicEngine, LogicResult};
use crate::config::{NarrativeConfig, ReplayConfig};
use crate::error::ReplayError;
use crate::events::{NarrativeTrigger, TriggerDetector};

/// Who is batting, what they chase and how the innings is judged.
#[derive(Debug, Clone, PartialEq)]
pub struct InningsSetup {
    pub batting_team: String,
    pub bowling_team: String,
    /// Zero for a first innings.
    pub target: u32,
    pub rules: RulesConfig,
    pub narrative: NarrativeConfig,
    /// Quoted in the match-result highlights of a chase.
    pub first_innings: Option<InningsSummary>,
}

impl InningsSetup {
    /// A first innings with default configuration.
    pub fn new(batting_team: impl Into<String>, bowling_team: impl Into<String>) -> Self {
        Self {
            batting_team: batting_team.into(),
            bowling_team: bowling_team.into(),
            target: 0,
            rules: RulesConfig::default(),
            narrative: NarrativeConfig::default(),
            first_innings: None,
        }
    }

    /// The second innings chasing the side summarised in `first`.
    pub fn chasing(first: &InningsSummary) -> Self {
        Self::new(first.bowling_team.clone(), first.batting_team.clone())
            .with_target(first.target_to_set())
            .with_first_innings(first.clone())
    }

    pub fn with_target(mut self, target: u32) -> Self {
        self.target = target;
        self
    }

    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_narrative(mut self, narrative: NarrativeConfig) -> Self {
        self.narrative = narrative;
        self
    }

    pub fn with_first_innings(mut self, summary: InningsSummary) -> Self {
        self.first_innings = Some(summary);
        self
    }

    pub fn with_config(self, config: ReplayConfig) -> Self {
        self.with_rules(config.rules).with_narrative(config.narrative)
    }

    pub fn with_config_file(self, path: &Path) -> Result<Self, ReplayError> {
        Ok(self.with_config(ReplayConfig::load(path)?))
    }
}

/// Scoreboard figures right after a delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySnapshot {
    pub total_runs: u32,
    pub wickets: u32,
    pub overs_completed: u32,
    pub balls_in_current_over: u32,
    pub crr: f64,
    pub rrr: f64,
    pub runs_needed: u32,
    pub balls_remaining: u32,
    pub phase: MatchPhase,
    pub non_striker: Option<String>,
}

impl DeliverySnapshot {
    pub fn capture(state: &MatchState) -> Self {
        Self {
            total_runs: state.total_runs,
            wickets: state.wickets,
            overs_completed: state.overs_completed,
            balls_in_current_over: state.balls_in_current_over,
            crr: state.crr(),
            rrr: state.rrr(),
            runs_needed: state.runs_needed(),
            balls_remaining: state.balls_remaining(),
            phase: state.match_phase(),
            non_striker: state.non_striker.clone(),
        }
    }
}

/// One replayed delivery with everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFrame {
    /// Position in the input list.
    pub index: usize,
    pub snapshot: DeliverySnapshot,
    pub logic: LogicResult,
    pub description: String,
    pub innings_over: bool,
    pub triggers: Vec<NarrativeTrigger>,
}

#[derive(Serialize)]
struct FrameContext<'a> {
    ball: &'a str,
    state: &'a DeliverySnapshot,
    branch: &'a str,
    is_pivot: bool,
    equation_shift: Option<&'a str>,
    context: &'a str,
    triggers: &'a [NarrativeTrigger],
}

impl DeliveryFrame {
    /// Compact JSON handed to text generation and stored with the commentary.
    pub fn context_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&FrameContext {
            ball: &self.description,
            state: &self.snapshot,
            branch: self.logic.branch.as_str(),
            is_pivot: self.logic.is_pivot,
            equation_shift: self.logic.equation_shift.as_deref(),
            context: &self.logic.context_notes,
            triggers: &self.triggers,
        })
    }
}

/// The result of a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub frames: Vec<DeliveryFrame>,
    /// State after the last replayed delivery.
    pub state: MatchState,
    pub record: InningsRecord,
    /// Deliveries after the innings ended that were not replayed.
    pub ignored_events: usize,
}

impl ReplayOutcome {
    pub fn summary(&self) -> &InningsSummary {
        &self.record.summary
    }

    pub fn innings_over(&self) -> bool {
        self.frames.last().is_some_and(|f| f.innings_over)
    }

    /// Every trigger fired, with the index of its delivery.
    pub fn triggers(&self) -> impl Iterator<Item = (usize, &NarrativeTrigger)> {
        self.frames
            .iter()
            .flat_map(|f| f.triggers.iter().map(move |t| (f.index, t)))
    }
}

/// Replays one innings.
#[derive(Debug, Clone)]
pub struct InningsReplay {
    setup: InningsSetup,
    engine: LogicEngine,
}

impl InningsReplay {
    pub fn new(setup: InningsSetup) -> Self {
        Self {
            engine: LogicEngine::new(setup.narrative.clone()),
            setup,
        }
    }

    pub fn setup(&self) -> &InningsSetup {
        &self.setup
    }

    /// Replay until the events run out or the innings is over.
    pub fn run(&self, events: &[DeliveryEvent]) -> Result<ReplayOutcome, ReplayError> {
        self.replay(events, None)
    }

    /// Replay up to and including the delivery at `index`.
    pub fn run_until(
        &self,
        events: &[DeliveryEvent],
        index: usize,
    ) -> Result<ReplayOutcome, ReplayError> {
        let outcome = self.replay(events, Some(index))?;
        if outcome.frames.len() <= index {
            return Err(ReplayError::TargetNotReached {
                index,
                played: outcome.frames.len(),
            });
        }
        Ok(outcome)
    }

    fn replay(
        &self,
        events: &[DeliveryEvent],
        stop_at: Option<usize>,
    ) -> Result<ReplayOutcome, ReplayError> {
        if events.is_empty() {
            return Err(ReplayError::EmptyInnings);
        }
        for (index, event) in events.iter().enumerate() {
            event
                .validate()
                .map_err(|source| ReplayError::InvalidDelivery { index, source })?;
        }

        let mut events = events.to_vec();
        resolve_crease(&mut events);

        let setup = &self.setup;
        info!(
            batting = %setup.batting_team,
            bowling = %setup.bowling_team,
            target = setup.target,
            deliveries = events.len(),
            "replaying innings"
        );

        let mut accumulator = Accumulator::with_config(
            setup.batting_team.clone(),
            setup.bowling_team.clone(),
            setup.target,
            setup.rules,
        );
        let mut detector = match &setup.first_innings {
            Some(first) => TriggerDetector::new().with_first_innings(first.clone()),
            None => TriggerDetector::new(),
        };

        let mut frames = Vec::with_capacity(events.len());
        let mut ignored_events = 0;

        for (index, ball) in events.iter().enumerate() {
            let state = accumulator.update(ball);
            let innings_over = state.is_innings_complete();
            let logic = self.engine.analyze(state, ball);
            let incoming = if ball.is_wicket {
                incoming_batter(&events[index + 1..], state)
            } else {
                None
            };
            let triggers = detector.detect(state, ball, innings_over, incoming);
            for trigger in &triggers {
                debug!(index, kind = trigger.kind(), "trigger fired");
            }

            frames.push(DeliveryFrame {
                index,
                snapshot: DeliverySnapshot::capture(state),
                logic,
                description: ball.describe(),
                innings_over,
                triggers,
            });

            if innings_over {
                ignored_events = events.len() - index - 1;
                if ignored_events > 0 {
                    warn!(
                        ignored = ignored_events,
                        "deliveries after the end of the innings were ignored"
                    );
                }
                break;
            }
            if stop_at == Some(index) {
                break;
            }
        }

        let state = accumulator.into_state();
        info!(
            total = state.total_runs,
            wickets = state.wickets,
            overs = %state.innings_overs(),
            "innings replayed"
        );

        Ok(ReplayOutcome {
            record: InningsRecord::from_state(&state),
            frames,
            state,
            ignored_events,
        })
    }
}

/// The next batter not yet seen in this innings, if a later delivery names one.
fn incoming_batter<'a>(rest: &'a [DeliveryEvent], state: &MatchState) -> Option<&'a str> {
    rest.iter()
        .flat_map(|e| std::iter::once(e.batter.as_str()).chain(e.non_striker.as_deref()))
        .find(|name| !state.batters.contains_key(*name))
}
