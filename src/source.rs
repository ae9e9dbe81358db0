pub mod yahoo;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::SourceError;
use crate::model::{Bar, Interval, Period};

/// Abstraction over a historical price provider.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn PriceSource`).
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` covering `period` at `interval`, oldest first.
    ///
    /// An empty vector means the provider has no data for the window; errors
    /// are reserved for transport, HTTP and unknown-symbol failures.
    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> BoxFuture<'_, Result<Vec<Bar>, Report<SourceError>>>;
}
