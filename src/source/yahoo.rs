use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::model::{Bar, Interval, Period};
use crate::source::PriceSource;

const PROVIDER: &str = "yahoo";
const NOT_FOUND: &str = "Not Found";
const USER_AGENT: &str = concat!("equity-signals/", env!("CARGO_PKG_VERSION"));

/// Yahoo Finance chart API (`/v8/finance/chart/{symbol}`).
pub struct YahooFinance {
    client: reqwest::Client,
    base_url: String,
    symbol_suffix: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl YahooFinance {
    pub fn new(config: &SourceConfig) -> Result<Self, Report<SourceError>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .change_context(SourceError::Client {
                provider: PROVIDER.into(),
            })?;

        let per_second = std::num::NonZeroU32::new(config.requests_per_second)
            .unwrap_or(nonzero!(4u32));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            symbol_suffix: config.symbol_suffix.clone(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
        })
    }

    /// Append the exchange suffix to bare symbols (`RELIANCE` -> `RELIANCE.NS`).
    /// Symbols that already carry a suffix are left alone.
    pub fn qualify(&self, symbol: &str) -> String {
        if self.symbol_suffix.is_empty() || symbol.contains('.') {
            symbol.to_owned()
        } else {
            format!("{symbol}{}", self.symbol_suffix)
        }
    }
}

impl PriceSource for YahooFinance {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> BoxFuture<'_, Result<Vec<Bar>, Report<SourceError>>> {
        let ticker = self.qualify(symbol);
        Box::pin(async move {
            self.rate_limiter.until_ready().await;

            let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
            let params = [("range", period.as_str()), ("interval", interval.as_str())];

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .map_err(|e| request_error(&e))
                .attach_with(|| format!("symbol: {ticker}"))?;

            let status = response.status();
            let body = response.text().await.map_err(|e| request_error(&e))?;
            let bars = parse_chart(status, &body, &ticker)?;

            if bars.is_empty() {
                debug!(symbol = %ticker, "no bars in window");
            }
            info!(
                symbol = %ticker,
                period = %period,
                interval = %interval,
                fetched = bars.len(),
                "yahoo chart fetch complete"
            );

            Ok(bars)
        })
    }
}

fn request_error(err: &reqwest::Error) -> Report<SourceError> {
    let reason = if err.is_timeout() {
        "timed out".to_owned()
    } else if err.is_connect() {
        "connection failed".to_owned()
    } else if let Some(status) = err.status() {
        format!("HTTP {status}")
    } else {
        err.to_string()
    };
    Report::new(SourceError::Request {
        provider: PROVIDER.into(),
        reason,
    })
    .attach(err.to_string())
}

/// Turn one chart response into bars.
///
/// Unknown symbols come back as 404 with a `chart.error` payload, so the body
/// is inspected before the status code. A failed status without an error
/// payload is reported as the status itself.
fn parse_chart(
    status: StatusCode,
    body: &str,
    ticker: &str,
) -> Result<Vec<Bar>, Report<SourceError>> {
    let status_error = || {
        Report::new(SourceError::Status {
            provider: PROVIDER.into(),
            status: status.as_u16(),
        })
        .attach(format!("symbol: {ticker}"))
    };

    match serde_json::from_str::<ChartEnvelope>(body) {
        Ok(envelope) if status.is_success() || envelope.chart.error.is_some() => {
            envelope.into_bars(ticker)
        }
        Ok(_) => Err(status_error()),
        Err(e) if status.is_success() => {
            Err(Report::new(e).change_context(SourceError::ResponseParse {
                provider: PROVIDER.into(),
            }))
        }
        Err(_) => Err(status_error()),
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartEnvelope {
    fn into_bars(self, ticker: &str) -> Result<Vec<Bar>, Report<SourceError>> {
        if let Some(err) = self.chart.error {
            let context = if err.code == NOT_FOUND {
                SourceError::NotFound {
                    symbol: ticker.to_owned(),
                }
            } else {
                SourceError::Provider {
                    provider: PROVIDER.into(),
                    code: err.code.clone(),
                    description: err.description.clone(),
                }
            };
            return Err(Report::new(context).attach(format!("{}: {}", err.code, err.description)));
        }

        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

        let bars = result
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let close = at(&quote.close, i).filter(|c| c.is_finite())?;
                let timestamp = DateTime::from_timestamp(ts, 0)?;
                Some(Bar {
                    timestamp,
                    open: at(&quote.open, i).unwrap_or(close),
                    high: at(&quote.high, i).unwrap_or(close),
                    low: at(&quote.low, i).unwrap_or(close),
                    close,
                    volume: at(&quote.volume, i).unwrap_or(0.0),
                })
            })
            .collect();

        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(suffix: &str) -> YahooFinance {
        let config = SourceConfig {
            symbol_suffix: suffix.into(),
            ..SourceConfig::default()
        };
        YahooFinance::new(&config).unwrap()
    }

    #[test]
    fn chart_payload_parses_into_bars() {
        let body = r#"{"chart":{"result":[{
            "meta":{"symbol":"RELIANCE.NS"},
            "timestamp":[1704067200,1704067500,1704067800],
            "indicators":{"quote":[{
                "open":[100.0,101.0,null],
                "high":[101.5,102.0,null],
                "low":[99.5,100.5,null],
                "close":[101.0,101.8,null],
                "volume":[1200,900,null]
            }]}
        }],"error":null}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        let bars = envelope.into_bars("RELIANCE.NS").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].volume, 1200.0);
        assert_eq!(bars[1].close, 101.8);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn missing_ohlc_defaults_to_close() {
        let body = r#"{"chart":{"result":[{
            "timestamp":[1704067200],
            "indicators":{"quote":[{"close":[50.25]}]}
        }],"error":null}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        let bars = envelope.into_bars("X.NS").unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].high, 50.25);
        assert_eq!(bars[0].volume, 0.0);
    }

    #[test]
    fn empty_result_is_no_data() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.into_bars("X.NS").unwrap().is_empty());

        let body = r#"{"chart":{"result":null,"error":null}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.into_bars("X.NS").unwrap().is_empty());
    }

    #[test]
    fn chart_error_is_not_found() {
        let body = r#"{"chart":{"result":null,"error":{
            "code":"Not Found",
            "description":"No data found, symbol may be delisted"
        }}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        let err = envelope.into_bars("NOPE.NS").unwrap_err();
        assert!(matches!(
            err.current_context(),
            SourceError::NotFound { symbol } if symbol == "NOPE.NS"
        ));
    }

    #[test]
    fn rejected_window_is_a_provider_error() {
        let body = r#"{"chart":{"result":null,"error":{
            "code":"Unprocessable Entity",
            "description":"1m data not available for startTime=1 and endTime=2. Only 7 days worth of 1m granularity data are allowed to be fetched per request."
        }}}"#;
        let err = parse_chart(StatusCode::UNPROCESSABLE_ENTITY, body, "RELIANCE.NS").unwrap_err();
        assert!(matches!(
            err.current_context(),
            SourceError::Provider { code, .. } if code == "Unprocessable Entity"
        ));
        let reason = err.current_context().to_string();
        assert!(reason.starts_with(
            "yahoo rejected the request (Unprocessable Entity): 1m data not available"
        ));
        assert!(!reason.contains("not found"));
    }

    #[test]
    fn unknown_symbol_404_is_not_found() {
        let body = r#"{"chart":{"result":null,"error":{
            "code":"Not Found",
            "description":"No data found, symbol may be delisted"
        }}}"#;
        let err = parse_chart(StatusCode::NOT_FOUND, body, "NOPE.NS").unwrap_err();
        assert_eq!(err.current_context().to_string(), "symbol not found: NOPE.NS");
    }

    #[test]
    fn failed_status_without_error_payload_reports_status() {
        let body = r#"{"chart":{"result":null,"error":null}}"#;
        let err = parse_chart(StatusCode::SERVICE_UNAVAILABLE, body, "X.NS").unwrap_err();
        assert!(matches!(err.current_context(), SourceError::Status { status: 503, .. }));
        assert_eq!(err.current_context().to_string(), "yahoo returned HTTP 503");

        let err =
            parse_chart(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests", "X.NS").unwrap_err();
        assert_eq!(err.current_context().to_string(), "yahoo returned HTTP 429");
    }

    #[test]
    fn garbled_success_body_is_a_parse_error() {
        let err = parse_chart(StatusCode::OK, "<html>", "X.NS").unwrap_err();
        assert!(matches!(err.current_context(), SourceError::ResponseParse { .. }));
    }

    #[test]
    fn successful_empty_chart_is_no_data() {
        let body = r#"{"chart":{"result":null,"error":null}}"#;
        assert!(parse_chart(StatusCode::OK, body, "X.NS").unwrap().is_empty());
    }

    #[test]
    fn bare_symbols_get_suffix() {
        let yahoo = source(".NS");
        assert_eq!(yahoo.qualify("RELIANCE"), "RELIANCE.NS");
        assert_eq!(yahoo.qualify("BAJAJ-AUTO"), "BAJAJ-AUTO.NS");
        assert_eq!(yahoo.qualify("TCS.BO"), "TCS.BO");
        assert_eq!(source("").qualify("AAPL"), "AAPL");
    }

    /// Integration test: requires network access. Run with `cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn integration_fetch_bars() {
        let yahoo = source(".NS");
        let bars = yahoo
            .fetch_bars("RELIANCE", Period::Day5, Interval::Min5)
            .await
            .unwrap();
        assert!(!bars.is_empty());
    }
}
