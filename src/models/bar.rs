use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Wraps Vec<PriceBar>, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series, sorting by timestamp and dropping bars whose close is
    /// not a finite number.
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.retain(|b| b.close.is_finite());
        bars.sort_by_key(|b| b.timestamp);
        Self { bars }
    }

    pub fn from_raw(timestamps: Vec<DateTime<Utc>>, closes: Vec<Option<f64>>) -> Self {
        let bars = timestamps
            .into_iter()
            .zip(closes)
            .filter_map(|(timestamp, close)| close.map(|close| PriceBar { timestamp, close }))
            .collect();
        Self::new(bars)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

impl std::ops::Index<usize> for PriceSeries {
    type Output = PriceBar;
    fn index(&self, index: usize) -> &Self::Output {
        &self.bars[index]
    }
}

impl IntoIterator for PriceSeries {
    type Item = PriceBar;
    type IntoIter = std::vec::IntoIter<PriceBar>;
    fn into_iter(self) -> Self::IntoIter {
        self.bars.into_iter()
    }
}
