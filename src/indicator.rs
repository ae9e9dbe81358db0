pub mod ma;
pub mod rsi;

use error_stack::Report;

use crate::error::IndicatorError;
use crate::model::Bar;

/// A technical analysis indicator that operates on a slice of bars.
///
/// Bars must be in ascending chronological order (oldest first).
pub trait Indicator: Send + Sync {
    /// Unique name of this indicator (e.g., "rsi", "sma").
    #[allow(dead_code)]
    fn name(&self) -> &str;

    /// Minimum number of bars required to produce at least one output value.
    fn required_bars(&self) -> usize;

    /// Calculate indicator values from bars.
    ///
    /// The output is aligned to the tail of the input: the last value
    /// corresponds to the last bar.
    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>>;

    /// Value at the most recent bar, or `None` when the history is shorter
    /// than the lookback.
    fn latest(&self, bars: &[Bar]) -> Option<f64> {
        if bars.len() < self.required_bars() {
            return None;
        }
        self.calculate(bars)
            .ok()
            .and_then(|values| values.last().copied())
            .filter(|v| v.is_finite())
    }
}

/// Extract close prices from a slice of bars.
pub fn close_prices(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
pub(crate) fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = chrono::Utc::now();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            timestamp: start + chrono::Duration::minutes(5 * i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: 1.0,
        })
        .collect()
}
