use crate::engine::profile::TradePlan;

/// Trade-management prices attached to a Buy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    pub entry: f64,
    pub target: f64,
    pub stop_loss: f64,
    pub trailing_stop: f64,
}

impl TradeLevels {
    /// Derive levels for an entry at `entry`, ratcheting the trailing stop
    /// off the highest of `recent_closes`.
    pub fn derive(entry: f64, recent_closes: &[f64], plan: &TradePlan) -> Self {
        let target = entry * (1.0 + plan.profit_target_pct / 100.0);
        let stop_loss = entry * (1.0 - plan.stop_loss_pct / 100.0);
        let peak = recent_closes.iter().copied().reduce(f64::max);

        Self {
            entry,
            target,
            stop_loss,
            trailing_stop: trailing_stop(entry, stop_loss, peak, plan.stop_loss_pct),
        }
    }
}

/// The trailing stop starts at `stop_loss` and is only re-based on `peak`
/// when the peak is strictly above the entry.
pub fn trailing_stop(entry: f64, stop_loss: f64, peak: Option<f64>, stop_loss_pct: f64) -> f64 {
    match peak {
        Some(peak) if peak > entry => peak * (1.0 - stop_loss_pct / 100.0),
        _ => stop_loss,
    }
}
