mod config;
mod cycle;
mod engine;
mod error;
mod indicator;
mod model;
mod notifier;
mod report;
mod source;
mod symbols;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use engine::profile::ProfileKind;
use notifier::Notifier;
use notifier::json::JsonNotifier;
use notifier::terminal::TerminalNotifier;
use source::PriceSource;
use source::yahoo::YahooFinance;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("price source error")]
    Source,
}

#[derive(Parser)]
#[command(name = "equity-signals", about = "Periodic equity buy/sell signal scanner")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Rule profile to run (`intraday` or `swing`); overrides the config file
    #[arg(short, long)]
    profile: Option<String>,

    /// Run a single evaluation cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config_path = Path::new(&cli.config);
    let config = config::load(config_path).change_context(AppError::Config)?;

    init_tracing(&config);

    let kind = match cli.profile.as_deref() {
        Some(name) => ProfileKind::from_str(name)
            .ok_or_else(|| Report::new(AppError::Config))
            .attach_with(|| format!("unknown profile \"{name}\""))?,
        None => config.profile_kind().change_context(AppError::Config)?,
    };
    let (profile, window) = config.scan_plan(kind).change_context(AppError::Config)?;

    let base_dir = config_path.parent().unwrap_or(Path::new("."));
    let symbols = symbols::resolve(&config.symbols, base_dir).change_context(AppError::Config)?;

    let source: Arc<dyn PriceSource> =
        Arc::new(YahooFinance::new(&config.source).change_context(AppError::Source)?);
    let notifier = build_notifier(&config);
    let profile = Arc::new(profile);

    info!(
        profile = %kind,
        symbols = symbols.len(),
        poll_interval_secs = config.general.poll_interval_secs,
        "signal scanner started"
    );

    // ── Shutdown ──────────────────────────────────────────────────────────────
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl+c received, stopping after the current cycle");
            ctrl_c_cancel.cancel();
        }
    });

    // ── Poll loop ─────────────────────────────────────────────────────────────
    let mut ticker = tokio::time::interval(Duration::from_secs(config.general.poll_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let report = cycle::run_cycle(
                    Arc::clone(&source),
                    &symbols,
                    Arc::clone(&profile),
                    window,
                )
                .await;
                notifier.publish(&report);

                if cli.once {
                    break;
                }
            }
        }
    }

    info!("shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn build_notifier(config: &AppConfig) -> Box<dyn Notifier> {
    match config.general.output.as_str() {
        "json" => Box::new(JsonNotifier),
        _ => Box::new(TerminalNotifier),
    }
}
