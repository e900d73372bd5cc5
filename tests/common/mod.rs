#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc, Weekday};
use std::collections::HashMap;
use std::path::PathBuf;

use swing_signal_bot::bot::SwingBot;
use swing_signal_bot::config::{Config, StoreBackend};
use swing_signal_bot::market::HistoricalProvider;
use swing_signal_bot::models::{Interval, Period, PriceBar, TradeStatus};
use swing_signal_bot::notify::{DryRunNotifier, Notifier, NotifyError};
use swing_signal_bot::store::{MemoryStore, StoreError, TradeStore};
use swing_signal_bot::strategies::TradeSignal;
use swing_signal_bot::trading::TradeRecord;

/// Monday 2024-01-15 12:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Hourly bars starting `offset` hours after `base_time`.
pub fn hourly_bars(offset: i64, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: base_time() + Duration::hours(offset + i as i64),
            close,
        })
        .collect()
}

pub fn open_signal(symbol: &str, at: DateTime<Utc>, entry: f64, stop: f64, target: f64) -> TradeSignal {
    TradeSignal {
        timestamp: at,
        symbol: symbol.to_string(),
        entry_price: entry,
        ema: entry - 1.0,
        stop_loss: stop,
        target,
        status: TradeStatus::Open,
    }
}

/// EMA5, 1% stop, 3% target, Kolkata time, summary Mondays 16:00.
pub fn test_config(tickers: &[&str]) -> Config {
    Config {
        email_from: String::new(),
        email_to: String::new(),
        app_password: String::new(),
        smtp_host: "smtp.gmail.com".to_string(),
        store_backend: StoreBackend::Csv,
        gsheet_json: String::new(),
        gsheet_id: String::new(),
        gsheet_tab: "Sheet1".to_string(),
        csv_path: PathBuf::from("unused.csv"),
        tickers: tickers.iter().map(|s| s.to_string()).collect(),
        ema_period: 5,
        stoploss_percent: 1.0,
        target_percent: 3.0,
        data_period: Period::Mo1,
        data_interval: Interval::H1,
        quote_period: Period::D1,
        quote_interval: Interval::M5,
        summary_weekday: Weekday::Mon,
        summary_hour: 16,
        timezone: chrono_tz::Asia::Kolkata,
        currency_symbol: "₹".to_string(),
        log_level: "ERROR".to_string(),
    }
}

/// Replays loaded bars through successive batch runs. The store and the
/// outbox persist across runs; each run gets a fresh bot, as a scheduled
/// invocation would.
pub struct Harness {
    pub config: Config,
    pub store: MemoryStore,
    pub outbox: DryRunNotifier,
    bars: HashMap<String, Vec<PriceBar>>,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, MemoryStore::new())
    }

    pub fn with_store(config: Config, store: MemoryStore) -> Self {
        Self {
            config,
            store,
            outbox: DryRunNotifier::new(),
            bars: HashMap::new(),
        }
    }

    pub fn load(&mut self, symbol: &str, bars: Vec<PriceBar>) {
        self.bars.entry(symbol.to_string()).or_default().extend(bars);
    }

    pub fn bot_at(&self, now: DateTime<Utc>) -> SwingBot {
        self.bot_with_store(now, Box::new(self.store.clone()))
    }

    pub fn bot_with_store(&self, now: DateTime<Utc>, store: Box<dyn TradeStore>) -> SwingBot {
        self.bot_with(now, store, Box::new(self.outbox.clone()))
    }

    pub fn bot_with(
        &self,
        now: DateTime<Utc>,
        store: Box<dyn TradeStore>,
        notifier: Box<dyn Notifier>,
    ) -> SwingBot {
        let mut provider = HistoricalProvider::new();
        for (symbol, bars) in &self.bars {
            provider.load(symbol, bars.clone());
        }
        provider.set_time(now);
        SwingBot::new(
            self.config.clone(),
            Box::new(provider),
            store,
            notifier,
        )
    }
}

/// A store over `MemoryStore` whose appends or status updates can be made
/// to fail.
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_append: bool,
    pub fail_update: bool,
}

fn disk_full() -> StoreError {
    StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
}

#[async_trait]
impl TradeStore for FailingStore {
    async fn ensure_header(&mut self) -> Result<(), StoreError> {
        self.inner.ensure_header().await
    }

    async fn append(&mut self, signal: &TradeSignal) -> Result<usize, StoreError> {
        if self.fail_append {
            return Err(disk_full());
        }
        self.inner.append(signal).await
    }

    async fn update_status(&mut self, row: usize, status: TradeStatus) -> Result<(), StoreError> {
        if self.fail_update {
            return Err(disk_full());
        }
        self.inner.update_status(row, status).await
    }

    async fn records(&mut self) -> Result<Vec<TradeRecord>, StoreError> {
        self.inner.records().await
    }
}

/// Rejects every message, like an SMTP relay that refuses the login.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&mut self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("535 authentication failed".to_string()))
    }
}
