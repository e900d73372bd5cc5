use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use swing_signal_bot::bot::SwingBot;
use swing_signal_bot::config::Config;
use swing_signal_bot::market::YahooClient;
use swing_signal_bot::trading::SummaryOutcome;
use swing_signal_bot::{notify, store};

/// Sends the weekly summary now, ignoring the weekday/hour gate.
#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env().context("invalid configuration")?;

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
    match bot.send_weekly_summary(Utc::now()).await? {
        SummaryOutcome::NoTrades => info!("Nothing to summarize"),
        SummaryOutcome::Summary(s) => info!(
            "Summary covered {} signal(s), {} win(s)",
            s.total_signals, s.wins
        ),
    }

    Ok(())
}
