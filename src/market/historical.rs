use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::market::{FetchError, PriceProvider};
use crate::models::{Interval, Period, PriceBar, PriceSeries};

/// A PriceProvider that replays pre-loaded bars.
/// A cursor (`now`) controls which bars are visible: only bars with
/// timestamp <= now and inside the requested period are returned, simulating
/// a forward walk through time.
pub struct HistoricalProvider {
    data: HashMap<String, Vec<PriceBar>>,
    now: DateTime<Utc>,
}

impl HistoricalProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            now: Utc::now(),
        }
    }

    /// Load bars for a symbol. Order does not matter.
    pub fn load(&mut self, symbol: &str, bars: Vec<PriceBar>) {
        let series = PriceSeries::new(bars);
        self.data.insert(symbol.to_string(), series.into_iter().collect());
    }

    /// Advance the simulation clock.
    pub fn set_time(&mut self, t: DateTime<Utc>) {
        self.now = t;
    }

    /// Bars in `(now - period, now]`. The interval is not resampled; loaded
    /// bars are returned at their own spacing.
    fn visible_bars(&self, symbol: &str, period: Period) -> PriceSeries {
        let Some(all) = self.data.get(symbol) else {
            return PriceSeries::default();
        };

        let end = all.partition_point(|b| b.timestamp <= self.now);
        let span = Duration::from_std(period.as_duration()).unwrap_or_else(|_| Duration::days(1));
        let from = self.now - span;
        let start = all[..end].partition_point(|b| b.timestamp <= from);

        PriceSeries::new(all[start..end].to_vec())
    }
}

impl Default for HistoricalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for HistoricalProvider {
    async fn fetch_series(
        &mut self,
        symbol: &str,
        period: Period,
        _interval: Interval,
    ) -> Result<PriceSeries, FetchError> {
        if !self.data.contains_key(symbol) {
            return Err(FetchError::NotFound(symbol.to_string()));
        }
        Ok(self.visible_bars(symbol, period))
    }
}
