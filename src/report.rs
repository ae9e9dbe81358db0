use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::profile::{Profile, ProfileKind};
use crate::engine::{Action, Evaluation, Field};

/// Round to 2 decimals, half away from zero on the decimal value.
///
/// The nudge absorbs binary representation error so that e.g. a computed
/// `106.57499999999999` (105 × 1.015) reports as `106.58`.
pub fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    (scaled + scaled.signum() * 1e-7).round() / 100.0
}

/// Buy screen answer of a profile that does not distinguish Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Yes,
    No,
}

/// Flat output record for one evaluated symbol. Numbers are rounded to cents;
/// unset trade prices serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "FastMA")]
    pub fast_ma: f64,
    #[serde(rename = "SlowMA")]
    pub slow_ma: f64,
    #[serde(rename = "RSI")]
    pub rsi: f64,
    #[serde(rename = "Action")]
    pub action: Action,
    #[serde(rename = "Entry")]
    pub entry: Option<f64>,
    #[serde(rename = "Target")]
    pub target: Option<f64>,
    #[serde(rename = "StopLoss")]
    pub stop_loss: Option<f64>,
    #[serde(rename = "TrailingStop")]
    pub trailing_stop: Option<f64>,
    /// Only set for screening profiles, mirroring the `Buy: Yes/No` line.
    #[serde(rename = "Buy", skip_serializing_if = "Option::is_none")]
    pub buy: Option<Verdict>,
}

impl SignalRecord {
    pub fn new(eval: &Evaluation, profile: &Profile) -> Self {
        let r = &eval.readings;
        let buy = (!profile.distinguish_sell).then_some(if eval.action == Action::Buy {
            Verdict::Yes
        } else {
            Verdict::No
        });
        Self {
            close: round_cents(r.close),
            fast_ma: round_cents(r.fast_ma),
            slow_ma: round_cents(r.slow_ma),
            rsi: round_cents(r.rsi),
            action: eval.action,
            entry: eval.entry.map(round_cents),
            target: eval.levels.map(|l| round_cents(l.target)),
            stop_loss: eval.levels.map(|l| round_cents(l.stop_loss)),
            trailing_stop: eval.levels.map(|l| round_cents(l.trailing_stop)),
            buy,
        }
    }
}

/// Result for one symbol in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Evaluated(SignalRecord),
    /// The price source returned no bars.
    Unavailable,
    /// Not enough history for the listed indicators.
    InsufficientData {
        missing: Vec<Field>,
        available: usize,
        required: usize,
    },
    Failed {
        reason: String,
    },
}

impl Outcome {
    pub fn failed(reason: &impl fmt::Display) -> Self {
        Self::Failed {
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Evaluated(_) => "evaluated",
            Self::Unavailable => "unavailable",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: Outcome,
}

/// Everything one evaluation cycle produced, in input symbol order.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub profile: ProfileKind,
    pub fast_window: usize,
    pub slow_window: usize,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<SymbolReport>,
}

impl CycleReport {
    pub fn count(&self, kind: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.kind() == kind)
            .count()
    }

    pub fn count_action(&self, action: Action) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(&e.outcome, Outcome::Evaluated(r) if r.action == action))
            .count()
    }
}
