use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::engine::profile::{Profile, ProfileKind, RsiBands, TradePlan};
use crate::error::ConfigError;
use crate::model::{Interval, Period, Window};

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_profile() -> String {
    "intraday".into()
}

fn default_output() -> String {
    "text".into()
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".into()
}

fn default_symbol_suffix() -> String {
    ".NS".into()
}

fn default_requests_per_second() -> u32 {
    4
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
    #[serde(default)]
    pub intraday: IntradayConfig,
    #[serde(default)]
    pub swing: SwingConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Accepted values: `"intraday"` | `"swing"`
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Report format on stdout. Accepted values: `"text"` | `"json"`
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            profile: default_profile(),
            output: default_output(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Exchange suffix appended to bare symbols, e.g. `".NS"` for NSE.
    #[serde(default = "default_symbol_suffix")]
    pub symbol_suffix: String,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            symbol_suffix: default_symbol_suffix(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SymbolsConfig {
    #[serde(default)]
    pub list: Vec<String>,
    /// Comma separated symbol file, resolved relative to the config file.
    pub file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntradayConfig {
    pub period: String,
    pub interval: String,
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_window: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub profit_target_pct: f64,
    pub stop_loss_pct: f64,
    pub trailing_lookback: usize,
}

impl Default for IntradayConfig {
    fn default() -> Self {
        let profile = Profile::intraday(TradePlan::default());
        let plan = TradePlan::default();
        Self {
            period: "1d".into(),
            interval: "5m".into(),
            fast_window: profile.fast_window,
            slow_window: profile.slow_window,
            rsi_window: profile.rsi_window,
            oversold: profile.bands.oversold,
            overbought: profile.bands.overbought,
            profit_target_pct: plan.profit_target_pct,
            stop_loss_pct: plan.stop_loss_pct,
            trailing_lookback: plan.trailing_lookback,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SwingConfig {
    pub period: String,
    pub interval: String,
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_window: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for SwingConfig {
    fn default() -> Self {
        let profile = Profile::swing();
        Self {
            period: "5d".into(),
            interval: "5m".into(),
            fast_window: profile.fast_window,
            slow_window: profile.slow_window,
            rsi_window: profile.rsi_window,
            oversold: profile.bands.oversold,
            overbought: profile.bands.overbought,
        }
    }
}

impl AppConfig {
    /// Build the engine profile and fetch window for `kind` from a validated
    /// config.
    pub fn scan_plan(&self, kind: ProfileKind) -> Result<(Profile, Window), Report<ConfigError>> {
        match kind {
            ProfileKind::Intraday => {
                let c = &self.intraday;
                let profile = Profile {
                    fast_window: c.fast_window,
                    slow_window: c.slow_window,
                    rsi_window: c.rsi_window,
                    bands: RsiBands {
                        oversold: c.oversold,
                        overbought: c.overbought,
                    },
                    trade_plan: Some(TradePlan {
                        profit_target_pct: c.profit_target_pct,
                        stop_loss_pct: c.stop_loss_pct,
                        trailing_lookback: c.trailing_lookback,
                    }),
                    ..Profile::intraday(TradePlan::default())
                };
                Ok((profile, parse_window("intraday", &c.period, &c.interval)?))
            }
            ProfileKind::Swing => {
                let c = &self.swing;
                let profile = Profile {
                    fast_window: c.fast_window,
                    slow_window: c.slow_window,
                    rsi_window: c.rsi_window,
                    bands: RsiBands {
                        oversold: c.oversold,
                        overbought: c.overbought,
                    },
                    ..Profile::swing()
                };
                Ok((profile, parse_window("swing", &c.period, &c.interval)?))
            }
        }
    }

    pub fn profile_kind(&self) -> Result<ProfileKind, Report<ConfigError>> {
        ProfileKind::from_str(&self.general.profile).ok_or_else(|| {
            Report::new(ConfigError::Validation {
                field: format!(
                    "general.profile: unknown profile \"{}\"",
                    self.general.profile
                ),
            })
        })
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_FORMATS: &[&str] = &["text", "json"];

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_source(config)?;
    validate_intraday(&config.intraday)?;
    validate_swing(&config.swing)?;
    Ok(())
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let general = &config.general;
    config.profile_kind()?;

    if !VALID_FORMATS.contains(&general.log_format.as_str()) {
        return Err(invalid(format!(
            "general.log_format \"{}\" is not valid",
            general.log_format
        )));
    }
    if !VALID_FORMATS.contains(&general.output.as_str()) {
        return Err(invalid(format!(
            "general.output \"{}\" is not valid",
            general.output
        )));
    }
    if general.poll_interval_secs == 0 {
        return Err(invalid("general.poll_interval_secs must be > 0".into()));
    }
    Ok(())
}

fn validate_source(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.source.requests_per_second == 0 {
        return Err(invalid("source.requests_per_second must be > 0".into()));
    }
    if config.source.timeout_secs == 0 {
        return Err(invalid("source.timeout_secs must be > 0".into()));
    }
    Ok(())
}

fn parse_window(section: &str, period: &str, interval: &str) -> Result<Window, Report<ConfigError>> {
    let period = Period::from_str(period)
        .ok_or_else(|| invalid(format!("{section}.period: unknown period \"{period}\"")))?;
    let interval = Interval::from_str(interval)
        .ok_or_else(|| invalid(format!("{section}.interval: unknown interval \"{interval}\"")))?;
    Ok(Window { period, interval })
}

fn validate_indicators(
    section: &str,
    fast_window: usize,
    slow_window: usize,
    rsi_window: usize,
    oversold: f64,
    overbought: f64,
) -> Result<(), Report<ConfigError>> {
    if fast_window == 0 || slow_window == 0 || rsi_window == 0 {
        return Err(invalid(format!("{section}: indicator windows must be > 0")));
    }
    if fast_window >= slow_window {
        return Err(invalid(format!(
            "{section}.fast_window ({fast_window}) must be shorter than slow_window ({slow_window})"
        )));
    }
    if !(0.0..=100.0).contains(&oversold)
        || !(0.0..=100.0).contains(&overbought)
        || oversold >= overbought
    {
        return Err(invalid(format!(
            "{section}: oversold ({oversold}) and overbought ({overbought}) must satisfy 0 <= oversold < overbought <= 100"
        )));
    }
    Ok(())
}

fn validate_intraday(c: &IntradayConfig) -> Result<(), Report<ConfigError>> {
    parse_window("intraday", &c.period, &c.interval)?;
    validate_indicators(
        "intraday",
        c.fast_window,
        c.slow_window,
        c.rsi_window,
        c.oversold,
        c.overbought,
    )?;

    if !(c.profit_target_pct.is_finite() && c.profit_target_pct > 0.0) {
        return Err(invalid(format!(
            "intraday.profit_target_pct ({}) must be a positive number",
            c.profit_target_pct
        )));
    }
    if !(c.stop_loss_pct.is_finite() && c.stop_loss_pct > 0.0 && c.stop_loss_pct < 100.0) {
        return Err(invalid(format!(
            "intraday.stop_loss_pct ({}) must be a positive number below 100",
            c.stop_loss_pct
        )));
    }
    if c.trailing_lookback == 0 {
        return Err(invalid("intraday.trailing_lookback must be > 0".into()));
    }
    Ok(())
}

fn validate_swing(c: &SwingConfig) -> Result<(), Report<ConfigError>> {
    parse_window("swing", &c.period, &c.interval)?;
    validate_indicators(
        "swing",
        c.fast_window,
        c.slow_window,
        c.rsi_window,
        c.oversold,
        c.overbought,
    )
}
