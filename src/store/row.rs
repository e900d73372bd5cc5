use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::models::TradeStatus;
use crate::store::{HEADER, STATUS_COLUMN};
use crate::strategies::signals::TradeSignal;
use crate::trading::trade_record::TradeRecord;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Cells of one log row, in header order. Dates are written as local time in
/// `tz` at minute precision.
pub fn to_cells(signal: &TradeSignal, tz: Tz) -> [String; 7] {
    [
        signal.timestamp.with_timezone(&tz).format(DATE_FORMAT).to_string(),
        signal.symbol.clone(),
        format!("{:.2}", signal.entry_price),
        format!("{:.2}", signal.ema),
        format!("{:.2}", signal.stop_loss),
        format!("{:.2}", signal.target),
        signal.status.to_string(),
    ]
}

pub fn from_cells(cells: &[String], tz: Tz) -> Result<TradeSignal, String> {
    // Sheets drops trailing empty cells, so a blank Status may be missing
    if cells.len() < STATUS_COLUMN {
        return Err(format!("expected {} columns, got {}", HEADER.len(), cells.len()));
    }
    let number = |idx: usize| -> Result<f64, String> {
        let raw = cells[idx].trim().replace(',', "");
        raw.parse::<f64>()
            .map_err(|_| format!("{} is not a number: {:?}", HEADER[idx], cells[idx]))
    };

    let symbol = cells[1].trim().to_string();
    if symbol.is_empty() {
        return Err("empty Ticker".to_string());
    }

    Ok(TradeSignal {
        timestamp: parse_date(&cells[0], tz)?,
        symbol,
        entry_price: number(2)?,
        ema: number(3)?,
        stop_loss: number(4)?,
        target: number(5)?,
        status: match cells.get(STATUS_COLUMN) {
            Some(raw) => raw.parse::<TradeStatus>().map_err(|e| e.to_string())?,
            None => TradeStatus::Open,
        },
    })
}

/// Accepts the written format, the same with seconds, or RFC 3339.
pub fn parse_date(raw: &str, tz: Tz) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| format!("unreadable Date: {raw:?}"))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("Date does not exist in {tz}: {raw:?}"))
}

/// Turns data rows (header already removed) into records. Blank rows are
/// ignored and malformed rows are skipped with a warning; both still occupy
/// their row index.
pub fn records_from_rows(rows: Vec<Vec<String>>, tz: Tz) -> Vec<TradeRecord> {
    rows.into_iter()
        .enumerate()
        .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
        .filter_map(|(row, cells)| match from_cells(&cells, tz) {
            Ok(signal) => Some(TradeRecord { row, signal }),
            Err(reason) => {
                warn!("Skipping trade log row {}: {}", row, reason);
                None
            }
        })
        .collect()
}
