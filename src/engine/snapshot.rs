use error_stack::{Report, bail};

use crate::engine::profile::Profile;
use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::ma::Sma;
use crate::indicator::rsi::Rsi;
use crate::model::Bar;

/// Indicator values at the most recent bar of a price window.
///
/// Averages and RSI are `None` when the window is shorter than their lookback.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub rsi: Option<f64>,
    /// Last closes, oldest first, current bar included.
    pub recent_closes: Vec<f64>,
}

impl IndicatorSnapshot {
    pub fn from_bars(bars: &[Bar], profile: &Profile) -> Result<Self, Report<IndicatorError>> {
        let Some(last) = bars.last() else {
            bail!(IndicatorError::InsufficientData {
                required: 1,
                available: 0,
            });
        };

        let fast = Sma::new(profile.fast_window)?;
        let slow = Sma::new(profile.slow_window)?;
        let rsi = Rsi::new(profile.rsi_window)?;

        let lookback = profile.trade_plan.map_or(0, |p| p.trailing_lookback);
        let start = bars.len().saturating_sub(lookback);
        let recent_closes = bars[start..].iter().map(|b| b.close).collect();

        Ok(Self {
            close: last.close,
            fast_ma: fast.latest(bars),
            slow_ma: slow.latest(bars),
            rsi: rsi.latest(bars),
            recent_closes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::profile::TradePlan;
    use crate::indicator::bars_from_closes;

    #[test]
    fn empty_window_is_an_error() {
        let profile = Profile::intraday(TradePlan::default());
        assert!(IndicatorSnapshot::from_bars(&[], &profile).is_err());
    }

    #[test]
    fn short_window_leaves_slow_average_undefined() {
        let profile = Profile::intraday(TradePlan::default());
        let bars = bars_from_closes(&[100.0; 30]);
        let snapshot = IndicatorSnapshot::from_bars(&bars, &profile).unwrap();
        assert_eq!(snapshot.close, 100.0);
        assert_eq!(snapshot.fast_ma, Some(100.0));
        assert_eq!(snapshot.slow_ma, None);
        assert!(snapshot.rsi.is_some());
    }

    #[test]
    fn recent_closes_take_trailing_lookback() {
        let profile = Profile::intraday(TradePlan::default());
        let closes: Vec<f64> = (1..=60).map(f64::from).collect();
        let snapshot = IndicatorSnapshot::from_bars(&bars_from_closes(&closes), &profile).unwrap();
        assert_eq!(snapshot.recent_closes, vec![56.0, 57.0, 58.0, 59.0, 60.0]);
        assert_eq!(snapshot.close, 60.0);
        // mean of 41..=60 and 11..=60
        assert_eq!(snapshot.fast_ma, Some(50.5));
        assert_eq!(snapshot.slow_ma, Some(35.5));
        assert_eq!(snapshot.rsi, Some(100.0));
    }

    #[test]
    fn recent_closes_shorter_than_lookback() {
        let profile = Profile::intraday(TradePlan::default());
        let snapshot = IndicatorSnapshot::from_bars(&bars_from_closes(&[5.0, 6.0]), &profile).unwrap();
        assert_eq!(snapshot.recent_closes, vec![5.0, 6.0]);
        assert_eq!(snapshot.fast_ma, None);
        assert_eq!(snapshot.rsi, None);
    }

    #[test]
    fn swing_profile_keeps_no_recent_closes() {
        let snapshot =
            IndicatorSnapshot::from_bars(&bars_from_closes(&[1.0; 60]), &Profile::swing()).unwrap();
        assert!(snapshot.recent_closes.is_empty());
        assert_eq!(snapshot.fast_ma, Some(1.0));
        assert_eq!(snapshot.slow_ma, None);
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut profile = Profile::swing();
        profile.fast_window = 0;
        assert!(IndicatorSnapshot::from_bars(&bars_from_closes(&[1.0; 10]), &profile).is_err());
    }
}
