use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::market::{FetchError, PriceProvider};
use crate::models::{Interval, Period, PriceSeries};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance v8 chart API. Closes are split/dividend adjusted by Yahoo.
pub struct YahooClient {
    client: Client,
    base_url: String,
    last_request: Option<Instant>,
}

impl YahooClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_request: None,
        })
    }

    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    pub async fn fetch_chart(
        &mut self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, FetchError> {
        self.rate_limit().await;

        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("range", period.as_str()),
                ("interval", interval.as_str()),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status { status, body: text });
        }

        let series = parse_chart(symbol, &text)?;
        debug!("{} {} {}: {} bars", symbol, period, interval, series.len());
        Ok(series)
    }
}

/// Parse a chart payload into a series. Bars with a null close (halts,
/// holidays) are dropped.
fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, FetchError> {
    let resp: ChartResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Format(e.to_string()))?;

    let result = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) if err.code == "Not Found" => {
            return Err(FetchError::NotFound(symbol.to_string()))
        }
        (_, Some(err)) => {
            return Err(FetchError::Format(format!("{}: {}", err.code, err.description)))
        }
        (Some(result), None) => result,
        (None, None) => return Err(FetchError::Format("empty result with no error".into())),
    };

    let Some(data) = result.into_iter().next() else {
        return Ok(PriceSeries::default());
    };

    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut timestamps = Vec::with_capacity(data.timestamp.len());
    for ts in data.timestamp {
        let t = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| FetchError::Format(format!("invalid timestamp: {ts}")))?;
        timestamps.push(t);
    }

    Ok(PriceSeries::from_raw(timestamps, closes))
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch_series(
        &mut self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, FetchError> {
        self.fetch_chart(symbol, period, interval).await
    }
}
