pub mod status_resolver;
pub mod trade_record;
pub mod weekly_summary;

pub use status_resolver::{StatusChange, StatusResolver};
pub use trade_record::TradeRecord;
pub use weekly_summary::{SummaryOutcome, WeeklySummary};
