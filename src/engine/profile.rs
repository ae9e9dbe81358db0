use std::fmt;

use serde::{Deserialize, Serialize};

/// Which rule set a cycle runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Intraday,
    Swing,
}

impl ProfileKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "intraday" => Some(Self::Intraday),
            "swing" => Some(Self::Swing),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intraday => "intraday",
            Self::Swing => "swing",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Oscillator band. Readings strictly inside `(oversold, overbought)` are
/// healthy; the bounds themselves are not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiBands {
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiBands {
    pub fn contains(&self, rsi: f64) -> bool {
        rsi > self.oversold && rsi < self.overbought
    }
}

impl Default for RsiBands {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

/// Percentages used to derive entry, target and stops for a Buy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePlan {
    pub profit_target_pct: f64,
    pub stop_loss_pct: f64,
    /// Number of most recent closes (current bar included) scanned for the
    /// trailing-stop peak.
    pub trailing_lookback: usize,
}

impl Default for TradePlan {
    fn default() -> Self {
        Self {
            profit_target_pct: 1.5,
            stop_loss_pct: 1.0,
            trailing_lookback: 5,
        }
    }
}

/// Parameters for one instance of the decision engine.
///
/// The intraday and swing rule sets are both expressed as a `Profile`; they
/// differ only in the values below.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub kind: ProfileKind,
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_window: usize,
    pub bands: RsiBands,
    /// Value substituted for an undefined slow moving average. `None` makes
    /// the slow average mandatory.
    pub slow_fallback: Option<f64>,
    /// When false, every non-Buy reading is reported as Hold.
    pub distinguish_sell: bool,
    /// Trade-price derivation; `None` disables entry/target/stops entirely.
    pub trade_plan: Option<TradePlan>,
}

impl Profile {
    /// SMA 20 / SMA 50 / RSI 14 with Buy/Sell/Hold and trade levels.
    pub fn intraday(plan: TradePlan) -> Self {
        Self {
            kind: ProfileKind::Intraday,
            fast_window: 20,
            slow_window: 50,
            rsi_window: 14,
            bands: RsiBands::default(),
            slow_fallback: None,
            distinguish_sell: true,
            trade_plan: Some(plan),
        }
    }

    /// SMA 50 / SMA 200 / RSI 14 buy screen. An undefined SMA 200 reads 0.
    pub fn swing() -> Self {
        Self {
            kind: ProfileKind::Swing,
            fast_window: 50,
            slow_window: 200,
            rsi_window: 14,
            bands: RsiBands::default(),
            slow_fallback: Some(0.0),
            distinguish_sell: false,
            trade_plan: None,
        }
    }

    /// Bars needed for every indicator of this profile to be defined.
    pub fn required_bars(&self) -> usize {
        let lookback = self.trade_plan.map_or(0, |p| p.trailing_lookback);
        self.fast_window
            .max(self.slow_window)
            .max(self.rsi_window + 1)
            .max(lookback)
    }
}
