//! Delivery events - one ball's outcome as reported by the feed.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::mechanics::{ExtrasKind, WicketKind, BALLS_PER_OVER};

/// A single ball delivery.
///
/// Produced by ingestion and consumed once by the accumulator. Optional
/// fields (`wicket_kind`, `dismissed`, `non_striker`) are absent when they do
/// not apply or the feed did not report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    /// Over number, 0-indexed.
    pub over: u32,
    /// Ball number within the over, 1-6 for legal deliveries.
    pub ball: u32,
    #[serde(alias = "batsman")]
    pub batter: String,
    pub bowler: String,
    /// Runs off the bat.
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub extras: u32,
    #[serde(default, alias = "extras_type", deserialize_with = "nullable_extras")]
    pub extras_kind: ExtrasKind,
    #[serde(default)]
    pub is_wicket: bool,
    #[serde(default, alias = "wicket_type")]
    pub wicket_kind: Option<WicketKind>,
    /// Dismissed batter when different from the striker.
    #[serde(default, alias = "dismissal_batter", alias = "dismissal_batsman")]
    pub dismissed: Option<String>,
    /// A boundary. Some feeds also set this on a six; see [`Self::is_four`].
    #[serde(default)]
    pub is_boundary: bool,
    #[serde(default)]
    pub is_six: bool,
    #[serde(default, alias = "non_batter")]
    pub non_striker: Option<String>,
}

impl DeliveryEvent {
    /// Create a legal delivery with no runs scored.
    pub fn new(over: u32, ball: u32, batter: impl Into<String>, bowler: impl Into<String>) -> Self {
        Self {
            over,
            ball,
            batter: batter.into(),
            bowler: bowler.into(),
            runs: 0,
            extras: 0,
            extras_kind: ExtrasKind::None,
            is_wicket: false,
            wicket_kind: None,
            dismissed: None,
            is_boundary: false,
            is_six: false,
            non_striker: None,
        }
    }

    /// Runs off the bat. Four and six are flagged automatically.
    pub fn with_runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self.is_boundary = runs == 4;
        self.is_six = runs == 6;
        self
    }

    /// Runs off the bat that are never boundaries (e.g. four all-run).
    pub fn with_run_runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self.is_boundary = false;
        self.is_six = false;
        self
    }

    pub fn with_extras(mut self, kind: ExtrasKind, extras: u32) -> Self {
        self.extras_kind = kind;
        self.extras = extras;
        self
    }

    pub fn with_wicket(mut self, kind: WicketKind) -> Self {
        self.is_wicket = true;
        self.wicket_kind = Some(kind);
        self
    }

    pub fn with_dismissed(mut self, name: impl Into<String>) -> Self {
        self.dismissed = Some(name.into());
        self
    }

    pub fn with_non_striker(mut self, name: impl Into<String>) -> Self {
        self.non_striker = Some(name.into());
        self
    }

    /// Wides and no-balls are not legal deliveries.
    pub fn is_legal(&self) -> bool {
        !self.extras_kind.is_illegal()
    }

    /// Runs off the bat plus extras.
    pub fn total_runs(&self) -> u32 {
        self.runs + self.extras
    }

    /// No runs of any kind and no wicket.
    pub fn is_dot(&self) -> bool {
        self.runs == 0 && self.extras == 0 && !self.is_wicket
    }

    /// A four. A six flagged as a boundary too is still only a six.
    pub fn is_four(&self) -> bool {
        self.is_boundary && !self.is_six
    }

    pub fn is_four_or_six(&self) -> bool {
        self.is_boundary || self.is_six
    }

    /// The dismissed batter: the explicit name, or the striker.
    pub fn dismissed_batter(&self) -> &str {
        self.dismissed.as_deref().unwrap_or(&self.batter)
    }

    /// Terse factual description of what happened.
    pub fn describe(&self) -> String {
        if self.is_wicket {
            let how = self.wicket_kind.map(|k| k.as_str()).unwrap_or("out");
            return format!("WICKET - {} {}", self.dismissed_batter(), how);
        }
        match self.extras_kind {
            ExtrasKind::Wide => return "Wide ball".to_string(),
            ExtrasKind::NoBall => return "No ball, free hit next".to_string(),
            _ => {}
        }
        if self.is_six {
            return "SIX".to_string();
        }
        if self.is_four() {
            return "FOUR".to_string();
        }
        match self.runs {
            0 => "Dot ball".to_string(),
            1 => "Single".to_string(),
            2 => "Two runs".to_string(),
            3 => "Three runs".to_string(),
            n => format!("{} runs", n),
        }
    }

    /// Check the event is well formed before it is accumulated.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        if self.batter.trim().is_empty() {
            return Err(DeliveryError::MissingBatter);
        }
        if self.bowler.trim().is_empty() {
            return Err(DeliveryError::MissingBowler);
        }
        if self.is_legal() && !(1..=BALLS_PER_OVER).contains(&self.ball) {
            return Err(DeliveryError::BallOutOfRange {
                over: self.over,
                ball: self.ball,
            });
        }
        if !self.is_wicket && (self.wicket_kind.is_some() || self.dismissed.is_some()) {
            return Err(DeliveryError::DismissalWithoutWicket);
        }
        if self.extras_kind.is_illegal() && self.extras == 0 {
            return Err(DeliveryError::ExtrasKindWithoutRuns(self.extras_kind));
        }
        if self.extras > 0 && self.extras_kind == ExtrasKind::None {
            return Err(DeliveryError::ExtrasWithoutKind(self.extras));
        }
        Ok(())
    }
}

/// Feeds send `null` for "no extras".
fn nullable_extras<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ExtrasKind, D::Error> {
    Ok(Option::<ExtrasKind>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reasons a delivery is rejected by [`DeliveryEvent::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("delivery has no batter")]
    MissingBatter,

    #[error("delivery has no bowler")]
    MissingBowler,

    #[error("ball {over}.{ball} is outside 1-6")]
    BallOutOfRange { over: u32, ball: u32 },

    #[error("dismissal details on a delivery without a wicket")]
    DismissalWithoutWicket,

    #[error("{0:?} reported with no extra runs")]
    ExtrasKindWithoutRuns(ExtrasKind),

    #[error("{0} extra run(s) reported without an extras kind")]
    ExtrasWithoutKind(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags_boundaries() {
        let four = DeliveryEvent::new(0, 1, "A", "X").with_runs(4);
        assert!(four.is_boundary);
        assert!(!four.is_six);

        let six = DeliveryEvent::new(0, 2, "A", "X").with_runs(6);
        assert!(six.is_six);
        assert!(six.is_four_or_six());

        let all_run = DeliveryEvent::new(0, 3, "A", "X").with_run_runs(4);
        assert!(!all_run.is_four_or_six());
    }

    #[test]
    fn test_six_flagged_as_boundary_is_not_a_four() {
        let json = r#"{"over": 0, "ball": 2, "batsman": "A", "bowler": "X",
            "runs": 6, "is_boundary": true, "is_six": true}"#;
        let six: DeliveryEvent = serde_json::from_str(json).unwrap();
        assert!(six.validate().is_ok());
        assert!(!six.is_four());
        assert!(six.is_four_or_six());
        assert_eq!(six.describe(), "SIX");
    }

    #[test]
    fn test_unknown_wicket_type_is_other() {
        let json = r#"{"over": 4, "ball": 3, "batsman": "A", "bowler": "X",
            "is_wicket": true, "wicket_type": "unknown"}"#;
        let ball: DeliveryEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ball.wicket_kind, Some(WicketKind::Other));
        assert!(ball.validate().is_ok());
        assert_eq!(ball.describe(), "WICKET - A out");

        let json = r#"{"over": 4, "ball": 3, "batsman": "A", "bowler": "X",
            "is_wicket": true, "wicket_type": "obstructing the field"}"#;
        let ball: DeliveryEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ball.wicket_kind, Some(WicketKind::Other));
    }

    #[test]
    fn test_dot_and_legal() {
        let dot = DeliveryEvent::new(0, 1, "A", "X");
        assert!(dot.is_dot());
        assert!(dot.is_legal());

        let wide = DeliveryEvent::new(0, 2, "A", "X").with_extras(ExtrasKind::Wide, 1);
        assert!(!wide.is_dot());
        assert!(!wide.is_legal());
        assert_eq!(wide.total_runs(), 1);

        let wicket = DeliveryEvent::new(0, 3, "A", "X").with_wicket(WicketKind::Bowled);
        assert!(!wicket.is_dot());
    }

    #[test]
    fn test_dismissed_defaults_to_striker() {
        let ball = DeliveryEvent::new(0, 1, "A", "X").with_wicket(WicketKind::Bowled);
        assert_eq!(ball.dismissed_batter(), "A");

        let run_out = DeliveryEvent::new(0, 1, "A", "X")
            .with_wicket(WicketKind::RunOut)
            .with_dismissed("B");
        assert_eq!(run_out.dismissed_batter(), "B");
    }

    #[test]
    fn test_describe() {
        let ball = DeliveryEvent::new(0, 1, "A", "X").with_wicket(WicketKind::Caught);
        assert_eq!(ball.describe(), "WICKET - A caught");
        let wide = DeliveryEvent::new(0, 1, "A", "X").with_extras(ExtrasKind::Wide, 1);
        assert_eq!(wide.describe(), "Wide ball");
        assert_eq!(DeliveryEvent::new(0, 1, "A", "X").with_runs(6).describe(), "SIX");
        assert_eq!(DeliveryEvent::new(0, 1, "A", "X").describe(), "Dot ball");
        assert_eq!(DeliveryEvent::new(0, 1, "A", "X").with_runs(2).describe(), "Two runs");
        assert_eq!(DeliveryEvent::new(0, 1, "A", "X").with_run_runs(5).describe(), "5 runs");
    }

    #[test]
    fn test_validate() {
        assert!(DeliveryEvent::new(0, 1, "A", "X").validate().is_ok());
        assert_eq!(
            DeliveryEvent::new(0, 7, "A", "X").validate(),
            Err(DeliveryError::BallOutOfRange { over: 0, ball: 7 })
        );
        assert_eq!(
            DeliveryEvent::new(0, 1, "", "X").validate(),
            Err(DeliveryError::MissingBatter)
        );
        assert_eq!(
            DeliveryEvent::new(0, 1, "A", "X").with_dismissed("B").validate(),
            Err(DeliveryError::DismissalWithoutWicket)
        );
        assert_eq!(
            DeliveryEvent::new(0, 1, "A", "X")
                .with_extras(ExtrasKind::Wide, 0)
                .validate(),
            Err(DeliveryError::ExtrasKindWithoutRuns(ExtrasKind::Wide))
        );

        // A wide may carry a ball number past six in some feeds.
        let wide = DeliveryEvent::new(0, 7, "A", "X").with_extras(ExtrasKind::Wide, 1);
        assert!(wide.validate().is_ok());
    }

    #[test]
    fn test_deserialize_feed_row() {
        let json = r#"{
            "over": 3, "ball": 2, "batsman": "A", "bowler": "X",
            "runs": 0, "extras": 1, "extras_type": "noball",
            "non_batter": "B"
        }"#;
        let ball: DeliveryEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ball.batter, "A");
        assert_eq!(ball.extras_kind, ExtrasKind::NoBall);
        assert_eq!(ball.non_striker.as_deref(), Some("B"));
        assert!(!ball.is_legal());

        let json = r#"{"over": 0, "ball": 1, "batter": "A", "bowler": "X", "extras_type": null}"#;
        let ball: DeliveryEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ball.extras_kind, ExtrasKind::None);
    }
}
