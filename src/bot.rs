use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::core::schedule::SummarySchedule;
use crate::market::PriceProvider;
use crate::notify::Notifier;
use crate::store::TradeStore;
use crate::strategies::{EmaTrendEvaluator, SignalParams, TradeSignal};
use crate::trading::weekly_summary::summarize;
use crate::trading::{StatusChange, StatusResolver, SummaryOutcome};

/// What one invocation did.
#[derive(Debug, Default)]
pub struct RunReport {
    pub signals: Vec<TradeSignal>,
    pub skipped: Vec<String>,
    pub status_changes: Vec<StatusChange>,
    pub summary: Option<SummaryOutcome>,
}

/// One batch run: scan every ticker, record and mail BUY signals, resolve open
/// signals, and send the weekly summary when its hour has come.
pub struct SwingBot {
    config: Config,
    market: Box<dyn PriceProvider>,
    store: Box<dyn TradeStore>,
    notifier: Box<dyn Notifier>,
    evaluator: EmaTrendEvaluator,
    resolver: StatusResolver,
    schedule: SummarySchedule,
}

impl SwingBot {
    pub fn new(
        config: Config,
        market: Box<dyn PriceProvider>,
        store: Box<dyn TradeStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        info!("{}", "=".repeat(60));
        info!("Swing signal bot starting up");
        info!("Tickers: {}", config.tickers.join(", "));
        info!(
            "EMA{} on {} bars over {} | SL {}% | TP {}%",
            config.ema_period,
            config.data_interval,
            config.data_period,
            config.stoploss_percent,
            config.target_percent
        );
        info!("Trade log: {}", config.store_backend.as_str());
        info!(
            "Email: {}",
            if config.email_enabled() {
                config.email_to.as_str()
            } else {
                "dry run"
            }
        );
        info!(
            "Weekly summary: {} {:02}:00 {}",
            config.summary_weekday, config.summary_hour, config.timezone
        );
        info!("{}", "=".repeat(60));

        let evaluator = EmaTrendEvaluator::new(SignalParams::new(&config));
        let schedule = SummarySchedule::new(&config);

        Self {
            config,
            market,
            store,
            notifier,
            evaluator,
            resolver: StatusResolver::new(),
            schedule,
        }
    }

    pub async fn run_once(&mut self, now: DateTime<Utc>) -> Result<RunReport> {
        self.store
            .ensure_header()
            .await
            .context("failed to prepare trade log")?;

        let mut report = RunReport::default();

        let (signals, skipped) = self.scan(now).await?;
        self.notify_signals(&signals, now).await;
        report.signals = signals;
        report.skipped = skipped;

        report.status_changes = self.resolve_open().await?;

        if self.schedule.is_due(now) {
            report.summary = Some(self.send_weekly_summary(now).await?);
        } else {
            debug!(
                "Weekly summary not due ({} {:02}:00 {})",
                self.config.summary_weekday, self.config.summary_hour, self.config.timezone
            );
        }

        Ok(report)
    }

    /// Evaluates every ticker and appends each BUY to the trade log. Fetch
    /// problems skip the ticker; a failed append aborts the run.
    pub async fn scan(&mut self, now: DateTime<Utc>) -> Result<(Vec<TradeSignal>, Vec<String>)> {
        let mut signals = Vec::new();
        let mut skipped = Vec::new();

        for symbol in &self.config.tickers {
            let series = match self
                .market
                .fetch_series(symbol, self.config.data_period, self.config.data_interval)
                .await
            {
                Ok(s) if s.is_empty() => {
                    warn!("No data for {}", symbol);
                    skipped.push(symbol.clone());
                    continue;
                }
                Ok(s) => s,
                Err(e) => {
                    warn!("Error downloading {}: {}", symbol, e);
                    skipped.push(symbol.clone());
                    continue;
                }
            };

            let Some(signal) = self.evaluator.evaluate(symbol, &series, now) else {
                info!("{}: no BUY signal ({} bars)", symbol, series.len());
                continue;
            };

            let row = self
                .store
                .append(&signal)
                .await
                .with_context(|| format!("failed to record signal for {symbol}"))?;
            info!(
                "{}: BUY at {:.2} (EMA {:.2}, SL {:.2}, TP {:.2}) -> row {}",
                symbol, signal.entry_price, signal.ema, signal.stop_loss, signal.target, row
            );
            signals.push(signal);
        }

        Ok((signals, skipped))
    }

    async fn notify_signals(&mut self, signals: &[TradeSignal], now: DateTime<Utc>) {
        if signals.is_empty() {
            info!("No BUY signals today.");
            return;
        }

        let body: String = signals
            .iter()
            .map(|s| format_signal(s, &self.config))
            .collect();
        let subject = format!(
            "Swing Trade Signals ({})",
            now.with_timezone(&self.config.timezone).format("%Y-%m-%d %H:%M")
        );

        match self.notifier.send(&subject, &body).await {
            Ok(()) => info!("Signals processed and email sent."),
            Err(e) => error!("Email failed: {}", e),
        }
    }

    /// Prices every symbol that has open records once, then applies the
    /// transition rule and writes each change back to the log.
    pub async fn resolve_open(&mut self) -> Result<Vec<StatusChange>> {
        let mut records = self
            .store
            .records()
            .await
            .context("failed to read trade log")?;

        let symbols = self.resolver.open_symbols(&records);
        if symbols.is_empty() {
            debug!("No open signals to resolve");
            return Ok(Vec::new());
        }

        let mut prices: HashMap<String, f64> = HashMap::new();
        for symbol in symbols {
            match self
                .market
                .latest_price(&symbol, self.config.quote_period, self.config.quote_interval)
                .await
            {
                Ok(Some(p)) => {
                    prices.insert(symbol, p);
                }
                Ok(None) => warn!("No latest price for {}; open signals stay open", symbol),
                Err(e) => warn!("Price check failed for {}: {}", symbol, e),
            }
        }

        let changes = self
            .resolver
            .resolve(&mut records, |s| prices.get(s).copied());

        for change in &changes {
            self.store
                .update_status(change.row, change.to)
                .await
                .with_context(|| format!("failed to update status of row {}", change.row))?;
        }

        let open = records.iter().filter(|r| r.is_open()).count();
        info!("Resolved {} signal(s); {} still open", changes.len(), open);
        Ok(changes)
    }

    /// Summarizes the trailing week and mails it. "No trades" is logged, not
    /// sent. Email failures are logged and do not fail the run.
    pub async fn send_weekly_summary(&mut self, now: DateTime<Utc>) -> Result<SummaryOutcome> {
        let records = self
            .store
            .records()
            .await
            .context("failed to read trade log")?;

        let outcome = summarize(&records, now);
        match &outcome {
            SummaryOutcome::NoTrades => info!("No trades in the last 7 days; summary not sent"),
            SummaryOutcome::Summary(summary) => {
                let subject = summary.subject(self.config.timezone);
                let body = summary.body(&self.config.currency_symbol);
                match self.notifier.send(&subject, &body).await {
                    Ok(()) => info!("Weekly summary sent."),
                    Err(e) => error!("Weekly summary email failed: {}", e),
                }
            }
        }
        Ok(outcome)
    }
}

fn format_signal(s: &TradeSignal, cfg: &Config) -> String {
    let c = &cfg.currency_symbol;
    format!(
        "📅 Date: {}\n\
         🪙 Ticker: {}\n\
         💰 Last Price: {c}{:.2}\n\
         📈 EMA{}: {c}{:.2}\n\
         🛑 Stoploss: {c}{:.2}\n\
         🎯 Target: {c}{:.2}\n\n",
        s.timestamp.with_timezone(&cfg.timezone).format("%Y-%m-%d %H:%M"),
        s.symbol,
        s.entry_price,
        cfg.ema_period,
        s.ema,
        s.stop_loss,
        s.target,
    )
}
