use std::fmt::Write;

use chrono::Local;

use crate::engine::Action;
use crate::engine::profile::ProfileKind;
use crate::notifier::{Notifier, write_stdout};
use crate::report::{CycleReport, Outcome, SignalRecord};

const RULE_WIDTH: usize = 70;

/// Human-readable report on stdout.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn publish(&self, report: &CycleReport) {
        write_stdout(&render(report));
    }
}

pub fn render(report: &CycleReport) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let title = match report.profile {
        ProfileKind::Intraday => "Intraday Trading Signals",
        ProfileKind::Swing => "Swing Trading Signals",
    };

    let mut out = String::new();
    let _ = writeln!(out, "\n{title} (as of now):");
    let _ = writeln!(out, "{rule}");

    for entry in &report.entries {
        let symbol = &entry.symbol;
        match &entry.outcome {
            Outcome::Evaluated(record) => {
                let _ = writeln!(out, "Stock: {symbol}");
                render_record(&mut out, report, record);
            }
            Outcome::Unavailable => {
                let _ = writeln!(out, "Stock: {symbol} - Data not available");
            }
            Outcome::InsufficientData {
                available,
                required,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "Stock: {symbol} - Insufficient data ({available} bars, need {required})"
                );
            }
            Outcome::Failed { reason } => {
                let _ = writeln!(out, "Stock: {symbol} - Error: {reason}");
            }
        }
        let _ = writeln!(out, "{rule}");
    }

    let updated = report.generated_at.with_timezone(&Local);
    let _ = writeln!(out, "Last updated: {}", updated.format("%a %b %e %H:%M:%S %Y"));
    out
}

fn render_record(out: &mut String, report: &CycleReport, r: &SignalRecord) {
    let _ = writeln!(
        out,
        "Close: {:.2}, SMA{}: {:.2}, SMA{}: {:.2}, RSI: {:.2}",
        r.close, report.fast_window, r.fast_ma, report.slow_window, r.slow_ma, r.rsi
    );

    if report.profile == ProfileKind::Swing {
        let verdict = if r.action == Action::Buy { "Yes" } else { "No" };
        let _ = writeln!(out, "Buy: {verdict}");
        return;
    }

    let _ = writeln!(out, "Action: {}", r.action);
    if let (Action::Buy | Action::Sell, Some(entry)) = (r.action, r.entry) {
        let _ = writeln!(out, "Entry: {entry:.2}");
    }
    if let (Some(target), Some(stop), Some(trailing)) = (r.target, r.stop_loss, r.trailing_stop) {
        let _ = writeln!(
            out,
            "Target: {target:.2}, Stop Loss: {stop:.2}, Trailing Stop: {trailing:.2}"
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::engine::Field;
    use crate::report::{SymbolReport, Verdict};

    fn record(action: Action, levels: Option<(f64, f64, f64)>) -> SignalRecord {
        SignalRecord {
            close: 105.0,
            fast_ma: 100.0,
            slow_ma: 95.0,
            rsi: 50.0,
            action,
            entry: Some(105.0),
            target: levels.map(|l| l.0),
            stop_loss: levels.map(|l| l.1),
            trailing_stop: levels.map(|l| l.2),
            buy: None,
        }
    }

    fn report(profile: ProfileKind, entries: Vec<SymbolReport>) -> CycleReport {
        let (fast_window, slow_window) = match profile {
            ProfileKind::Intraday => (20, 50),
            ProfileKind::Swing => (50, 200),
        };
        CycleReport {
            profile,
            fast_window,
            slow_window,
            generated_at: Utc::now(),
            entries,
        }
    }

    fn entry(symbol: &str, outcome: Outcome) -> SymbolReport {
        SymbolReport {
            symbol: symbol.into(),
            outcome,
        }
    }

    #[test]
    fn buy_lists_entry_and_levels() {
        let text = render(&report(
            ProfileKind::Intraday,
            vec![entry(
                "RELIANCE",
                Outcome::Evaluated(record(Action::Buy, Some((106.58, 103.95, 103.95)))),
            )],
        ));
        assert!(text.contains("Intraday Trading Signals (as of now):"));
        assert!(text.contains("Stock: RELIANCE\n"));
        assert!(text.contains("Close: 105.00, SMA20: 100.00, SMA50: 95.00, RSI: 50.00"));
        assert!(text.contains("Action: Buy"));
        assert!(text.contains("Entry: 105.00"));
        assert!(text.contains("Target: 106.58, Stop Loss: 103.95, Trailing Stop: 103.95"));
        assert!(text.contains("Last updated: "));
    }

    #[test]
    fn hold_omits_entry_and_levels() {
        let text = render(&report(
            ProfileKind::Intraday,
            vec![entry("SBIN", Outcome::Evaluated(record(Action::Hold, None)))],
        ));
        assert!(text.contains("Action: Hold"));
        assert!(!text.contains("Entry:"));
        assert!(!text.contains("Target:"));
    }

    #[test]
    fn sell_shows_entry_only() {
        let text = render(&report(
            ProfileKind::Intraday,
            vec![entry("SBIN", Outcome::Evaluated(record(Action::Sell, None)))],
        ));
        assert!(text.contains("Entry: 105.00"));
        assert!(!text.contains("Target:"));
    }

    #[test]
    fn swing_prints_buy_verdict() {
        let mut rec = record(Action::Hold, None);
        rec.entry = None;
        rec.buy = Some(Verdict::No);
        let text = render(&report(
            ProfileKind::Swing,
            vec![entry("TITAN", Outcome::Evaluated(rec))],
        ));
        assert!(text.contains("Swing Trading Signals"));
        assert!(text.contains("SMA50: 100.00, SMA200: 95.00"));
        assert!(text.contains("Buy: No"));
        assert!(!text.contains("Action:"));
    }

    #[test]
    fn non_evaluated_outcomes_are_one_liners() {
        let text = render(&report(
            ProfileKind::Intraday,
            vec![
                entry("A", Outcome::Unavailable),
                entry(
                    "B",
                    Outcome::Failed {
                        reason: "request to yahoo failed".into(),
                    },
                ),
                entry(
                    "C",
                    Outcome::InsufficientData {
                        missing: vec![Field::SlowMa],
                        available: 30,
                        required: 50,
                    },
                ),
            ],
        ));
        assert!(text.contains("Stock: A - Data not available"));
        assert!(text.contains("Stock: B - Error: request to yahoo failed"));
        assert!(text.contains("Stock: C - Insufficient data (30 bars, need 50)"));
    }

    #[test]
    fn terminal_notifier_does_not_panic() {
        let notifier = TerminalNotifier;
        notifier.publish(&report(ProfileKind::Intraday, vec![entry("A", Outcome::Unavailable)]));
    }
}
