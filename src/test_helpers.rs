use chrono::{DateTime, Duration, Utc, Weekday};

use crate::config::{Config, StoreBackend};
use crate::core::levels::round2;
use crate::models::{Interval, Period, PriceBar, PriceSeries, TradeStatus};
use crate::strategies::TradeSignal;
use crate::trading::TradeRecord;

/// Monday 2024-01-15 12:00 UTC (17:30 in Kolkata).
pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Hourly bars from `base_time` with the given closes.
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base = base_time();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: base + Duration::hours(i as i64),
            close,
        })
        .collect()
}

pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(make_bars(closes))
}

/// An open signal stamped at `base_time`.
pub fn make_signal(symbol: &str, entry: f64, stop: f64, target: f64) -> TradeSignal {
    TradeSignal {
        timestamp: base_time(),
        symbol: symbol.to_string(),
        entry_price: entry,
        ema: round2(entry * 0.99),
        stop_loss: stop,
        target,
        status: TradeStatus::Open,
    }
}

pub fn make_record(row: usize, symbol: &str, entry: f64, stop: f64, target: f64) -> TradeRecord {
    TradeRecord {
        row,
        signal: make_signal(symbol, entry, stop, target),
    }
}

/// A valid config for tests: CSV log under the temp dir, no email, Kolkata
/// time with the summary on Mondays at 16:00.
pub fn default_test_config() -> Config {
    Config {
        email_from: String::new(),
        email_to: String::new(),
        app_password: String::new(),
        smtp_host: "smtp.gmail.com".to_string(),

        store_backend: StoreBackend::Csv,
        gsheet_json: String::new(),
        gsheet_id: String::new(),
        gsheet_tab: "Sheet1".to_string(),
        csv_path: std::env::temp_dir().join("swing_signal_bot_test.csv"),

        tickers: vec![
            "GOLDBEES.NS".to_string(),
            "ITBEES.NS".to_string(),
            "NIFTYBEES.NS".to_string(),
        ],

        ema_period: 20,
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

