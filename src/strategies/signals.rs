use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TradeStatus;

/// A BUY recommendation with its exit levels, as written to the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub entry_price: f64,
    pub ema: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub status: TradeStatus,
}

impl TradeSignal {
    /// Distance from entry to target. A potential gain, independent of the
    /// signal's status.
    pub fn target_gain(&self) -> f64 {
        self.target - self.entry_price
    }
}
