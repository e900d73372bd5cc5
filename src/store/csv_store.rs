use async_trait::async_trait;
use chrono_tz::Tz;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::models::TradeStatus;
use crate::store::row::{records_from_rows, to_cells};
use crate::store::{StoreError, TradeStore, HEADER, STATUS_COLUMN};
use crate::strategies::signals::TradeSignal;
use crate::trading::trade_record::TradeRecord;

/// Trade log kept in a local CSV file with the same columns as the sheet.
///
/// The data-row count is read from disk once and then tracked, so the file
/// is assumed to have a single writer for the life of the store.
pub struct CsvStore {
    path: PathBuf,
    tz: Tz,
    row_count: Option<usize>,
}

impl CsvStore {
    pub fn new(path: impl AsRef<Path>, tz: Tz) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            tz,
            row_count: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_empty_file(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true)
    }

    fn row_count(&mut self) -> Result<usize, StoreError> {
        if let Some(n) = self.row_count {
            return Ok(n);
        }
        let n = self.read_rows()?.len();
        self.row_count = Some(n);
        Ok(n)
    }

    /// False when a hand-edited file lost its final newline.
    fn ends_with_newline(&self) -> Result<bool, StoreError> {
        let mut file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(true);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }

    /// Data rows without the header. A missing file has none.
    fn read_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    /// Rewrites the whole file through a sibling temp file so a failed write
    /// never leaves a truncated log behind.
    fn write_all(&self, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut wtr = WriterBuilder::new().flexible(true).from_path(&tmp)?;
            wtr.write_record(HEADER)?;
            for row in rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl TradeStore for CsvStore {
    async fn ensure_header(&mut self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        if self.is_empty_file() {
            let mut wtr = WriterBuilder::new().from_path(&self.path)?;
            wtr.write_record(HEADER)?;
            wtr.flush()?;
        }
        Ok(())
    }

    async fn append(&mut self, signal: &TradeSignal) -> Result<usize, StoreError> {
        self.ensure_header().await?;
        let row = self.row_count()?;

        let needs_newline = !self.ends_with_newline()?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        if needs_newline {
            file.write_all(b"\n")?;
        }
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record(to_cells(signal, self.tz))?;
        wtr.flush()?;

        self.row_count = Some(row + 1);
        Ok(row)
    }

    async fn update_status(&mut self, row: usize, status: TradeStatus) -> Result<(), StoreError> {
        let mut rows = self.read_rows()?;
        self.row_count = Some(rows.len());
        let cells = rows.get_mut(row).ok_or(StoreError::NoSuchRow(row))?;
        if cells.len() <= STATUS_COLUMN {
            cells.resize(STATUS_COLUMN + 1, String::new());
        }
        cells[STATUS_COLUMN] = status.to_string();
        self.write_all(&rows)
    }

    async fn records(&mut self) -> Result<Vec<TradeRecord>, StoreError> {
        let rows = self.read_rows()?;
        self.row_count = Some(rows.len());
        Ok(records_from_rows(rows, self.tz))
    }
}
