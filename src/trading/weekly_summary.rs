use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::levels::round2;
use crate::models::TradeStatus;
use crate::strategies::signals::TradeSignal;
use crate::trading::trade_record::TradeRecord;

const WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_signals: usize,
    pub wins: usize,
    /// Mean of (target - entry). A potential gain, not realized P&L.
    pub avg_gain: f64,
    pub best_symbol: String,
    pub worst_symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    NoTrades,
    Summary(WeeklySummary),
}

/// Statistics over signals created in `[now - 7 days, now]`.
///
/// Best and worst are ranked by target distance. On ties the first record in
/// input order wins, so the result is deterministic for a given store order.
pub fn summarize(records: &[TradeRecord], now: DateTime<Utc>) -> SummaryOutcome {
    let window_start = now - Duration::days(WINDOW_DAYS);
    let window: Vec<&TradeSignal> = records
        .iter()
        .map(|r| &r.signal)
        .filter(|s| s.timestamp >= window_start && s.timestamp <= now)
        .collect();

    let Some(first) = window.first() else {
        return SummaryOutcome::NoTrades;
    };

    let mut best = *first;
    let mut worst = *first;
    for s in &window[1..] {
        if s.target_gain() > best.target_gain() {
            best = *s;
        }
        if s.target_gain() < worst.target_gain() {
            worst = *s;
        }
    }

    let total = window.len();
    let wins = window
        .iter()
        .filter(|s| s.status == TradeStatus::Win)
        .count();
    let avg_gain = window.iter().map(|s| s.target_gain()).sum::<f64>() / total as f64;

    SummaryOutcome::Summary(WeeklySummary {
        window_start,
        window_end: now,
        total_signals: total,
        wins,
        avg_gain: round2(avg_gain),
        best_symbol: best.symbol.clone(),
        worst_symbol: worst.symbol.clone(),
    })
}

impl WeeklySummary {
    pub fn subject(&self, tz: Tz) -> String {
        format!(
            "Weekly Swing Trade Summary ({})",
            self.window_end.with_timezone(&tz).format("%Y-%m-%d")
        )
    }

    pub fn body(&self, currency: &str) -> String {
        format!(
            "📊 Weekly Summary (Last 7 Days)\n\
             Total Signals: {}\n\
             Wins: {}\n\
             Avg Gain: {}{:.2}\n\
             Best Ticker: {}\n\
             Worst Ticker: {}\n",
            self.total_signals,
            self.wins,
            currency,
            self.avg_gain,
            self.best_symbol,
            self.worst_symbol,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{base_time, make_record};

    fn at(mut r: TradeRecord, t: DateTime<Utc>) -> TradeRecord {
        r.signal.timestamp = t;
        r
    }

    fn unwrap_summary(outcome: SummaryOutcome) -> WeeklySummary {
        match outcome {
            SummaryOutcome::Summary(s) => s,
            SummaryOutcome::NoTrades => panic!("expected a summary"),
        }
    }

    #[test]
    fn empty_log_is_no_trades() {
        assert_eq!(summarize(&[], base_time()), SummaryOutcome::NoTrades);
    }

    #[test]
    fn only_old_records_is_no_trades() {
        let now = base_time();
        let recs = vec![at(make_record(0, "A", 100.0, 99.0, 105.0), now - Duration::days(8))];
        assert_eq!(summarize(&recs, now), SummaryOutcome::NoTrades);
    }

    #[test]
    fn best_worst_and_average() {
        let now = base_time();
        let t = now - Duration::days(1);
        let recs = vec![
            at(make_record(0, "A", 100.0, 99.0, 105.0), t),
            at(make_record(1, "B", 100.0, 99.0, 102.0), t),
            at(make_record(2, "C", 100.0, 99.0, 108.0), t),
        ];
        let s = unwrap_summary(summarize(&recs, now));
        assert_eq!(s.total_signals, 3);
        assert_eq!(s.best_symbol, "C");
        assert_eq!(s.worst_symbol, "B");
        assert!((s.avg_gain - 5.0).abs() < 1e-9);
    }

    #[test]
    fn wins_are_counted_but_do_not_move_the_gain() {
        let now = base_time();
        let t = now - Duration::hours(3);
        let mut recs = vec![
            at(make_record(0, "A", 100.0, 99.0, 103.0), t),
            at(make_record(1, "B", 100.0, 99.0, 103.0), t),
            at(make_record(2, "C", 100.0, 99.0, 103.0), t),
        ];
        recs[0].signal.status = TradeStatus::Win;
        recs[1].signal.status = TradeStatus::Loss;
        let s = unwrap_summary(summarize(&recs, now));
        assert_eq!(s.wins, 1);
        assert!((s.avg_gain - 3.0).abs() < 1e-9);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = base_time();
        let recs = vec![
            at(make_record(0, "EDGE_OLD", 100.0, 99.0, 101.0), now - Duration::days(7)),
            at(make_record(1, "EDGE_NOW", 100.0, 99.0, 104.0), now),
            at(
                make_record(2, "TOO_OLD", 100.0, 99.0, 150.0),
                now - Duration::days(7) - Duration::seconds(1),
            ),
            at(make_record(3, "FUTURE", 100.0, 99.0, 150.0), now + Duration::seconds(1)),
        ];
        let s = unwrap_summary(summarize(&recs, now));
        assert_eq!(s.total_signals, 2);
        assert_eq!(s.best_symbol, "EDGE_NOW");
        assert_eq!(s.worst_symbol, "EDGE_OLD");
        assert_eq!(s.window_start, now - Duration::days(7));
    }

    #[test]
    fn ties_go_to_first_record() {
        let now = base_time();
        let t = now - Duration::days(2);
        let recs = vec![
            at(make_record(0, "FIRST", 100.0, 99.0, 103.0), t),
            at(make_record(1, "SECOND", 100.0, 99.0, 103.0), t),
        ];
        let s = unwrap_summary(summarize(&recs, now));
        assert_eq!(s.best_symbol, "FIRST");
        assert_eq!(s.worst_symbol, "FIRST");
    }

    #[test]
    fn body_lists_every_figure() {
        let now = base_time();
        let recs = vec![at(make_record(0, "ITBEES.NS", 40.0, 39.6, 41.2), now)];
        let s = unwrap_summary(summarize(&recs, now));
        let body = s.body("₹");
        assert!(body.contains("Total Signals: 1"));
        assert!(body.contains("Wins: 0"));
        assert!(body.contains("Avg Gain: ₹1.20"));
        assert!(body.contains("Best Ticker: ITBEES.NS"));
        assert!(s.subject(Tz::UTC).starts_with("Weekly Swing Trade Summary (2024-01-15"));
    }
}
