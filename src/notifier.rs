pub mod json;
pub mod terminal;

use std::io::Write;

use crate::report::CycleReport;

/// Sink for finished cycle reports.
pub trait Notifier: Send + Sync {
    fn publish(&self, report: &CycleReport);
}

/// Write a rendered report to stdout, logging instead of failing on a closed
/// pipe.
fn write_stdout(rendered: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
    {
        tracing::warn!(error = %e, "failed to write report to stdout");
    }
}
