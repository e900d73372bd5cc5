use serde::{Deserialize, Serialize};

use crate::strategies::signals::TradeSignal;

/// A signal as it sits in the trade log. `row` is the zero-based position
/// among data rows (the header is not counted) and is how status updates
/// address the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub row: usize,
    pub signal: TradeSignal,
}

impl TradeRecord {
    pub fn is_open(&self) -> bool {
        !self.signal.status.is_terminal()
    }
}
