use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::Bar;

/// RSI (Relative Strength Index) using Wilder's smoothing method.
///
/// The first value is seeded with the simple average of the first `period`
/// gains and losses. A window with no movement at all reads 0.
#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>> {
        let prices = close_prices(bars);
        if prices.len() < self.required_bars() {
            bail!(IndicatorError::InsufficientData {
                required: self.required_bars(),
                available: prices.len(),
            });
        }

        let period = self.period as f64;
        let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        let (seed, rest) = deltas.split_at(self.period);

        let mut avg_gain = seed.iter().map(|&d| d.max(0.0)).sum::<f64>() / period;
        let mut avg_loss = seed.iter().map(|&d| (-d).max(0.0)).sum::<f64>() / period;

        let mut values = Vec::with_capacity(rest.len() + 1);
        values.push(rsi_value(avg_gain, avg_loss));

        for &delta in rest {
            avg_gain = (avg_gain * (period - 1.0) + delta.max(0.0)) / period;
            avg_loss = (avg_loss * (period - 1.0) + (-delta).max(0.0)) / period;
            values.push(rsi_value(avg_gain, avg_loss));
        }

        Ok(values)
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let total = avg_gain + avg_loss;
    if total == 0.0 {
        return 0.0;
    }
    100.0 * avg_gain / total
}
