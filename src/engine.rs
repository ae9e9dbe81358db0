//! Signal decision engine.
//!
//! Pure functions from an [`IndicatorSnapshot`] to an [`Evaluation`]. Nothing
//! here holds state between calls.

pub mod classify;
pub mod levels;
pub mod profile;
pub mod snapshot;

use std::fmt;

use serde::{Deserialize, Serialize};

use classify::{Readings, classify};
use levels::TradeLevels;
use profile::Profile;
use snapshot::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Hold => write!(f, "Hold"),
        }
    }
}

/// An indicator required for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FastMa,
    SlowMa,
    Rsi,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastMa => write!(f, "fast_ma"),
            Self::SlowMa => write!(f, "slow_ma"),
            Self::Rsi => write!(f, "rsi"),
        }
    }
}

/// Indicators that were undefined for the snapshot, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReadings(pub Vec<Field>);

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub readings: Readings,
    pub action: Action,
    /// Latest close for any action of a profile with a trade plan.
    pub entry: Option<f64>,
    /// Present only for Buy under a profile with a trade plan.
    pub levels: Option<TradeLevels>,
}

/// Classify a snapshot and derive trade levels under `profile`.
pub fn evaluate(
    snapshot: &IndicatorSnapshot,
    profile: &Profile,
) -> Result<Evaluation, MissingReadings> {
    let slow_ma = snapshot.slow_ma.or(profile.slow_fallback);

    let (Some(fast_ma), Some(slow_ma), Some(rsi)) = (snapshot.fast_ma, slow_ma, snapshot.rsi)
    else {
        let missing = [
            (Field::FastMa, snapshot.fast_ma),
            (Field::SlowMa, slow_ma),
            (Field::Rsi, snapshot.rsi),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.is_none().then_some(field))
        .collect();
        return Err(MissingReadings(missing));
    };

    let readings = Readings {
        close: snapshot.close,
        fast_ma,
        slow_ma,
        rsi,
    };
    let action = classify(&readings, profile.bands, profile.distinguish_sell);

    let (entry, levels) = match profile.trade_plan {
        Some(plan) => {
            let levels = (action == Action::Buy)
                .then(|| TradeLevels::derive(snapshot.close, &snapshot.recent_closes, &plan));
            (Some(snapshot.close), levels)
        }
        None => (None, None),
    };

    Ok(Evaluation {
        readings,
        action,
        entry,
        levels,
    })
}
