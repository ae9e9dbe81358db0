use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::engine::profile::Profile;
use crate::engine::snapshot::IndicatorSnapshot;
use crate::engine::{self, Action, MissingReadings};
use crate::model::{Bar, Window};
use crate::report::{CycleReport, Outcome, SignalRecord, SymbolReport};
use crate::source::PriceSource;

/// Evaluate every symbol once and collect one outcome per symbol.
///
/// Each symbol runs in its own task; the source's rate limiter keeps request
/// volume in check. A failure or panic for one symbol is recorded as
/// `Outcome::Failed` and never affects the others. Entries follow the order
/// of `symbols`.
pub async fn run_cycle(
    source: Arc<dyn PriceSource>,
    symbols: &[String],
    profile: Arc<Profile>,
    window: Window,
) -> CycleReport {
    info!(
        profile = %profile.kind,
        source = source.name(),
        symbols = symbols.len(),
        period = %window.period,
        interval = %window.interval,
        "starting evaluation cycle"
    );

    let handles: Vec<_> = symbols
        .iter()
        .map(|symbol| {
            let source = Arc::clone(&source);
            let profile = Arc::clone(&profile);
            let symbol = symbol.clone();
            tokio::spawn(async move { evaluate_symbol(source.as_ref(), &symbol, &profile, window).await })
        })
        .collect();

    let mut entries = Vec::with_capacity(symbols.len());
    for (symbol, handle) in symbols.iter().zip(handles) {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "symbol evaluation aborted");
                Outcome::failed(&format!("evaluation aborted: {e}"))
            }
        };
        entries.push(SymbolReport {
            symbol: symbol.clone(),
            outcome,
        });
    }

    let report = CycleReport {
        profile: profile.kind,
        fast_window: profile.fast_window,
        slow_window: profile.slow_window,
        generated_at: Utc::now(),
        entries,
    };

    info!(
        buy = report.count_action(Action::Buy),
        sell = report.count_action(Action::Sell),
        hold = report.count_action(Action::Hold),
        unavailable = report.count("unavailable"),
        insufficient = report.count("insufficient_data"),
        failed = report.count("failed"),
        "evaluation cycle complete"
    );

    report
}

/// Fetch one symbol's window and evaluate it.
pub async fn evaluate_symbol(
    source: &dyn PriceSource,
    symbol: &str,
    profile: &Profile,
    window: Window,
) -> Outcome {
    match source
        .fetch_bars(symbol, window.period, window.interval)
        .await
    {
        Ok(bars) => evaluate_window(symbol, &bars, profile),
        Err(report) => {
            warn!(symbol, error = ?report, "price fetch failed");
            Outcome::failed(report.current_context())
        }
    }
}

/// Evaluate an already fetched window.
pub fn evaluate_window(symbol: &str, bars: &[Bar], profile: &Profile) -> Outcome {
    if bars.is_empty() {
        return Outcome::Unavailable;
    }

    let snapshot = match IndicatorSnapshot::from_bars(bars, profile) {
        Ok(snapshot) => snapshot,
        Err(report) => {
            warn!(symbol, error = ?report, "indicator computation failed");
            return Outcome::failed(report.current_context());
        }
    };

    match engine::evaluate(&snapshot, profile) {
        Ok(evaluation) => Outcome::Evaluated(SignalRecord::new(&evaluation, profile)),
        Err(MissingReadings(missing)) => {
            tracing::debug!(
                symbol,
                available = bars.len(),
                required = profile.required_bars(),
                "insufficient history for indicators"
            );
            Outcome::InsufficientData {
                missing,
                available: bars.len(),
                required: profile.required_bars(),
            }
        }
    }
}
