use crate::notifier::{Notifier, write_stdout};
use crate::report::CycleReport;

/// One JSON document per cycle on stdout, newline terminated.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn publish(&self, report: &CycleReport) {
        match serde_json::to_string(report) {
            Ok(mut line) => {
                line.push('\n');
                write_stdout(&line);
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize cycle report"),
        }
    }
}
