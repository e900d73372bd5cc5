use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::models::TradeStatus;
use crate::trading::trade_record::TradeRecord;

/// Transition function of the per-record state machine.
///
/// Terminal states absorb every input. For an open record the target is
/// checked first, so a price that satisfies both levels resolves to `Win`.
/// Without a price sample the record stays as it is.
pub fn next_status(
    current: TradeStatus,
    latest_price: Option<f64>,
    stop_loss: f64,
    target: f64,
) -> TradeStatus {
    if current.is_terminal() {
        return current;
    }
    match latest_price {
        Some(p) if p >= target => TradeStatus::Win,
        Some(p) if p <= stop_loss => TradeStatus::Loss,
        _ => TradeStatus::Open,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub row: usize,
    pub symbol: String,
    pub from: TradeStatus,
    pub to: TradeStatus,
    pub price: f64,
}

#[derive(Debug, Default)]
pub struct StatusResolver;

impl StatusResolver {
    pub fn new() -> Self {
        Self
    }

    /// Distinct symbols that still have open records, in first-seen order.
    pub fn open_symbols(&self, records: &[TradeRecord]) -> Vec<String> {
        let mut seen = HashSet::new();
        records
            .iter()
            .filter(|r| r.is_open())
            .filter(|r| seen.insert(r.signal.symbol.clone()))
            .map(|r| r.signal.symbol.clone())
            .collect()
    }

    /// Applies one price sample per open record and returns the transitions
    /// that happened. Records are updated in place; terminal records are not
    /// looked at.
    pub fn resolve<F>(&self, records: &mut [TradeRecord], mut latest_price: F) -> Vec<StatusChange>
    where
        F: FnMut(&str) -> Option<f64>,
    {
        let mut changes = Vec::new();

        for record in records.iter_mut().filter(|r| r.is_open()) {
            let sig = &mut record.signal;
            let price = latest_price(&sig.symbol);
            let next = next_status(sig.status, price, sig.stop_loss, sig.target);

            match (price, next) {
                (None, _) => {
                    debug!("{} row {}: no price, stays {}", sig.symbol, record.row, sig.status);
                }
                (Some(p), next) if next != sig.status => {
                    info!(
                        "{} row {}: {} -> {} at {:.2} (SL {:.2} / TP {:.2})",
                        sig.symbol, record.row, sig.status, next, p, sig.stop_loss, sig.target
                    );
                    changes.push(StatusChange {
                        row: record.row,
                        symbol: sig.symbol.clone(),
                        from: sig.status,
                        to: next,
                        price: p,
                    });
                    sig.status = next;
                }
                (Some(p), _) => {
                    debug!("{} row {}: {:.2} inside levels, stays open", sig.symbol, record.row, p);
                }
            }
        }

        changes
    }
}
