use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use swing_signal_bot::bot::SwingBot;
use swing_signal_bot::config::Config;
use swing_signal_bot::market::YahooClient;
use swing_signal_bot::{notify, store};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env().context("invalid configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    cfg.validate().context("invalid configuration")?;

    let market = Box::new(YahooClient::new().context("failed to build market data client")?);
    let store = store::open(&cfg)
        .await
        .with_context(|| format!("failed to open {} trade log", cfg.store_backend.as_str()))?;
    let notifier = notify::from_config(&cfg);

    let mut bot = SwingBot::new(cfg, market, store, notifier);
    let report = bot.run_once(Utc::now()).await?;

    info!(
        "Run complete: {} signal(s), {} skipped, {} status change(s), summary {}",
        report.signals.len(),
        report.skipped.len(),
        report.status_changes.len(),
        if report.summary.is_some() { "checked" } else { "not due" }
    );

    Ok(())
}
