use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices};
use crate::model::Bar;

/// Simple Moving Average over close prices.
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Rolling mean over `prices`, one value per full window.
    pub fn calculate_prices(&self, prices: &[f64]) -> Result<Vec<f64>, Report<IndicatorError>> {
        if prices.len() < self.period {
            bail!(IndicatorError::InsufficientData {
                required: self.period,
                available: prices.len(),
            });
        }

        let n = self.period as f64;
        let mut sum: f64 = prices[..self.period].iter().sum();
        let mut values = Vec::with_capacity(prices.len() - self.period + 1);
        values.push(sum / n);

        for (i, &price) in prices[self.period..].iter().enumerate() {
            sum += price - prices[i];
            values.push(sum / n);
        }

        Ok(values)
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        "sma"
    }

    fn required_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Result<Vec<f64>, Report<IndicatorError>> {
        self.calculate_prices(&close_prices(bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::bars_from_closes;

    #[test]
    fn sma_period_zero_invalid() {
        assert!(Sma::new(0).is_err());
    }

    #[test]
    fn sma_insufficient_data() {
        let sma = Sma::new(20).unwrap();
        assert!(sma.calculate(&bars_from_closes(&[1.0; 19])).is_err());
        assert_eq!(sma.latest(&bars_from_closes(&[1.0; 19])), None);
    }

    #[test]
    fn sma_rolling_values() {
        let sma = Sma::new(3).unwrap();
        let values = sma
            .calculate(&bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 8.0]))
            .unwrap();
        assert_eq!(values.len(), 3);
        assert!((values[0] - 2.0).abs() < 1e-9);
        assert!((values[1] - 3.0).abs() < 1e-9);
        assert!((values[2] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn sma_latest_uses_last_window() {
        let sma = Sma::new(2).unwrap();
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 50.0]);
        assert_eq!(sma.latest(&bars), Some(40.0));
    }

    #[test]
    fn sma_exact_window_yields_one_value() {
        let sma = Sma::new(50).unwrap();
        let closes: Vec<f64> = (1..=50).map(f64::from).collect();
        let values = sma.calculate(&bars_from_closes(&closes)).unwrap();
        assert_eq!(values.len(), 1);
        assert!((values[0] - 25.5).abs() < 1e-9);
    }
}
