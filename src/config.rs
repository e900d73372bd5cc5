use chrono::Weekday;
use chrono_tz::Tz;
use std::path::PathBuf;

use crate::models::{Interval, Period};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sheets,
    Csv,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Sheets => "sheets",
            StoreBackend::Csv => "csv",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an unreadable value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("no tickers configured (TICKERS is empty)")]
    NoTickers,
    #[error("EMA_PERIOD must be at least 1")]
    EmaPeriod,
    #[error("{name} must be a positive percentage, got {value}")]
    Percent { name: &'static str, value: f64 },
    #[error("SUMMARY_HOUR must be 0-23, got {0}")]
    SummaryHour(u32),
    #[error("sheets backend needs {0}")]
    MissingSheetSetting(&'static str),
}

/// Process-wide settings, read once at start-up and passed explicitly to
/// every component.
#[derive(Debug, Clone)]
pub struct Config {
    // Email
    pub email_from: String,
    pub email_to: String,
    pub app_password: String,
    pub smtp_host: String,

    // Trade log
    pub store_backend: StoreBackend,
    pub gsheet_json: String,
    pub gsheet_id: String,
    pub gsheet_tab: String,
    pub csv_path: PathBuf,

    // Instruments
    pub tickers: Vec<String>,

    // Signal
    pub ema_period: usize,
    pub stoploss_percent: f64,
    pub target_percent: f64,

    // Data windows
    pub data_period: Period,
    pub data_interval: Interval,
    pub quote_period: Period,
    pub quote_interval: Interval,

    // Weekly summary gate
    pub summary_weekday: Weekday,
    pub summary_hour: u32,
    pub timezone: Tz,

    // Presentation
    pub currency_symbol: String,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset or blank keys take their
    /// default; a value that is present but unreadable is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_string())
        };
        let parsed = |key: &'static str| -> Option<String> {
            lookup(key).filter(|v| !v.trim().is_empty())
        };

        let gsheet_json = text("GSHEET_JSON", "");
        let store_backend = match parsed("STORE_BACKEND") {
            None if !gsheet_json.trim().is_empty() => StoreBackend::Sheets,
            None => StoreBackend::Csv,
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "sheets" => StoreBackend::Sheets,
                "csv" => StoreBackend::Csv,
                _ => return Err(invalid("STORE_BACKEND", raw)),
            },
        };

        Ok(Config {
            email_from: text("EMAIL_FROM", ""),
            email_to: text("EMAIL_TO", ""),
            app_password: text("APP_PASSWORD", ""),
            smtp_host: text("SMTP_HOST", "smtp.gmail.com"),
            store_backend,
            gsheet_json,
            gsheet_id: text("GSHEET_ID", ""),
            gsheet_tab: text("GSHEET_TAB", "Sheet1"),
            csv_path: PathBuf::from(text("CSV_PATH", "data/swing_signals.csv")),
            tickers: parse_tickers(&text("TICKERS", "GOLDBEES.NS,ITBEES.NS,NIFTYBEES.NS")),
            ema_period: setting(parsed("EMA_PERIOD"), "EMA_PERIOD", 20, |s| s.parse().ok())?,
            stoploss_percent: setting(parsed("STOPLOSS_PERCENT"), "STOPLOSS_PERCENT", 1.0, |s| {
                s.parse().ok()
            })?,
            target_percent: setting(parsed("TARGET_PERCENT"), "TARGET_PERCENT", 3.0, |s| {
                s.parse().ok()
            })?,
            data_period: setting(
                parsed("DATA_PERIOD"),
                "DATA_PERIOD",
                Period::Mo1,
                Period::from_str_loose,
            )?,
            data_interval: setting(
                parsed("DATA_INTERVAL"),
                "DATA_INTERVAL",
                Interval::H1,
                Interval::from_str_loose,
            )?,
            quote_period: setting(
                parsed("QUOTE_PERIOD"),
                "QUOTE_PERIOD",
                Period::D1,
                Period::from_str_loose,
            )?,
            quote_interval: setting(
                parsed("QUOTE_INTERVAL"),
                "QUOTE_INTERVAL",
                Interval::M5,
                Interval::from_str_loose,
            )?,
            summary_weekday: setting(
                parsed("SUMMARY_WEEKDAY"),
                "SUMMARY_WEEKDAY",
                Weekday::Mon,
                |s| s.parse().ok(),
            )?,
            summary_hour: setting(parsed("SUMMARY_HOUR"), "SUMMARY_HOUR", 16, |s| s.parse().ok())?,
            timezone: setting(
                parsed("TIMEZONE"),
                "TIMEZONE",
                chrono_tz::Asia::Kolkata,
                |s| s.parse().ok(),
            )?,
            currency_symbol: text("CURRENCY_SYMBOL", "₹"),
            log_level: text("LOG_LEVEL", "INFO"),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::NoTickers);
        }
        if self.ema_period < 1 {
            return Err(ConfigError::EmaPeriod);
        }
        for (name, value) in [
            ("STOPLOSS_PERCENT", self.stoploss_percent),
            ("TARGET_PERCENT", self.target_percent),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Percent { name, value });
            }
        }
        if self.summary_hour > 23 {
            return Err(ConfigError::SummaryHour(self.summary_hour));
        }
        if self.store_backend == StoreBackend::Sheets {
            if self.gsheet_json.trim().is_empty() {
                return Err(ConfigError::MissingSheetSetting("GSHEET_JSON"));
            }
            if self.gsheet_id.trim().is_empty() {
                return Err(ConfigError::MissingSheetSetting("GSHEET_ID"));
            }
        }
        Ok(())
    }

    /// True when every SMTP setting is present. Otherwise the runner falls
    /// back to logging messages instead of sending them.
    pub fn email_enabled(&self) -> bool {
        !self.email_from.is_empty() && !self.email_to.is_empty() && !self.app_password.is_empty()
    }
}

fn invalid(name: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { name, value }
}

/// `default` when the key is unset, otherwise the parsed value.
fn setting<T>(
    raw: Option<String>,
    name: &'static str,
    default: T,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => parse(raw.trim()).ok_or_else(|| invalid(name, raw)),
    }
}

fn parse_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
