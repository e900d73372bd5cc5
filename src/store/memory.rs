use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::TradeStatus;
use crate::store::{StoreError, TradeStore};
use crate::strategies::signals::TradeSignal;
use crate::trading::trade_record::TradeRecord;

#[derive(Debug, Default)]
struct Inner {
    header_written: bool,
    rows: Vec<TradeSignal>,
}

/// In-process trade log. Clones share the same rows, so a test can keep a
/// handle while the runner owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signals(signals: Vec<TradeSignal>) -> Self {
        let store = Self::default();
        {
            let mut inner = store.lock();
            inner.header_written = true;
            inner.rows = signals;
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a poisoned lock only means another test thread panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn signals(&self) -> Vec<TradeSignal> {
        self.lock().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    pub fn has_header(&self) -> bool {
        self.lock().header_written
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn ensure_header(&mut self) -> Result<(), StoreError> {
        self.lock().header_written = true;
        Ok(())
    }

    async fn append(&mut self, signal: &TradeSignal) -> Result<usize, StoreError> {
        let mut inner = self.lock();
        inner.header_written = true;
        inner.rows.push(signal.clone());
        Ok(inner.rows.len() - 1)
    }

    async fn update_status(&mut self, row: usize, status: TradeStatus) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let signal = inner.rows.get_mut(row).ok_or(StoreError::NoSuchRow(row))?;
        signal.status = status;
        Ok(())
    }

    async fn records(&mut self) -> Result<Vec<TradeRecord>, StoreError> {
        Ok(self
            .lock()
            .rows
            .iter()
            .cloned()
            .enumerate()
            .map(|(row, signal)| TradeRecord { row, signal })
            .collect())
    }
}
