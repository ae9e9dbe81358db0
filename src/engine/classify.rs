use crate::engine::Action;
use crate::engine::profile::RsiBands;

/// Fully defined indicator values for one evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub close: f64,
    pub fast_ma: f64,
    pub slow_ma: f64,
    pub rsi: f64,
}

/// Price above a rising average stack with a healthy oscillator.
pub fn is_buy(r: &Readings, bands: RsiBands) -> bool {
    r.close > r.fast_ma && r.fast_ma > r.slow_ma && bands.contains(r.rsi)
}

/// Any one of: price under the fast average, averages inverted, oscillator
/// outside the band.
pub fn is_sell(r: &Readings, bands: RsiBands) -> bool {
    r.close < r.fast_ma
        || r.fast_ma < r.slow_ma
        || r.rsi > bands.overbought
        || r.rsi < bands.oversold
}

pub fn classify(r: &Readings, bands: RsiBands, distinguish_sell: bool) -> Action {
    let buy = is_buy(r, bands);
    if !distinguish_sell {
        return if buy { Action::Buy } else { Action::Hold };
    }

    let sell = is_sell(r, bands);
    if buy && !sell {
        Action::Buy
    } else if sell && !buy {
        Action::Sell
    } else {
        Action::Hold
    }
}
