pub mod historical;
pub mod yahoo;

pub use historical::HistoricalProvider;
pub use yahoo::YahooClient;

use async_trait::async_trait;

use crate::models::{Interval, Period, PriceSeries};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("symbol not found: {0}")]
    NotFound(String),
    #[error("unexpected response format: {0}")]
    Format(String),
}

/// Source of closing-price bars. Every failure is transient from the caller's
/// point of view: the symbol is skipped for this run.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Bars for `symbol` covering `period`, one per `interval`, oldest first.
    /// An empty series is a valid answer.
    async fn fetch_series(
        &mut self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, FetchError>;

    /// Most recent close seen in a short-horizon fetch.
    async fn latest_price(
        &mut self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Option<f64>, FetchError> {
        let series = self.fetch_series(symbol, period, interval).await?;
        Ok(series.last_close())
    }
}
