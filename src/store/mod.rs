//! Trade log persistence.
//!
//! The log is a table with a fixed header row followed by one row per signal.
//! Rows are only ever appended; the Status column is the single cell that
//! changes afterwards. Every backend addresses a record by its zero-based
//! data-row index (header excluded).

pub mod csv_store;
pub mod memory;
pub mod row;
pub mod sheets;

pub use csv_store::CsvStore;
pub use memory::MemoryStore;
pub use sheets::SheetsStore;

use async_trait::async_trait;
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::models::TradeStatus;
use crate::strategies::signals::TradeSignal;
use crate::trading::trade_record::TradeRecord;

pub const HEADER: [&str; 7] = [
    "Date", "Ticker", "BuyPrice", "EMA20", "Stoploss", "Target", "Status",
];
pub const STATUS_COLUMN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sheets api returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("credentials rejected: {0}")]
    Auth(String),
    #[error("bad store setting: {0}")]
    Config(String),
    #[error("row {0} does not exist")]
    NoSuchRow(usize),
    #[error("unexpected store response: {0}")]
    Format(String),
}

/// Append-only signal log with a mutable status column.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Writes the header row if the log is empty. Idempotent.
    async fn ensure_header(&mut self) -> Result<(), StoreError>;

    /// Appends one signal and returns its row index.
    async fn append(&mut self, signal: &TradeSignal) -> Result<usize, StoreError>;

    async fn update_status(&mut self, row: usize, status: TradeStatus) -> Result<(), StoreError>;

    /// Every parseable record, in log order.
    async fn records(&mut self) -> Result<Vec<TradeRecord>, StoreError>;
}

/// Opens the backend selected in the configuration and makes sure its header
/// row is in place.
pub async fn open(cfg: &Config) -> Result<Box<dyn TradeStore>, StoreError> {
    let mut store: Box<dyn TradeStore> = match cfg.store_backend {
        StoreBackend::Sheets => Box::new(SheetsStore::new(
            &cfg.gsheet_json,
            &cfg.gsheet_id,
            &cfg.gsheet_tab,
            cfg.timezone,
        )?),
        StoreBackend::Csv => Box::new(CsvStore::new(&cfg.csv_path, cfg.timezone)),
    };
    store.ensure_header().await?;
    info!("Trade log ready ({})", cfg.store_backend.as_str());
    Ok(store)
}
