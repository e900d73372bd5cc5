use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::core::ema::ema_last;
use crate::core::levels::{round2, ExitLevels};
use crate::models::{PriceSeries, TradeStatus};
use crate::strategies::signals::TradeSignal;

/// Parameters of the close-above-EMA rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    pub ema_period: usize,
    pub stoploss_pct: f64,
    pub target_pct: f64,
}

impl SignalParams {
    pub fn new(cfg: &Config) -> Self {
        Self {
            ema_period: cfg.ema_period,
            stoploss_pct: cfg.stoploss_percent,
            target_pct: cfg.target_percent,
        }
    }
}

/// Long-only trend rule: BUY when the latest close is strictly above the EMA
/// of all closes. Never emits a short.
pub struct EmaTrendEvaluator {
    params: SignalParams,
}

impl EmaTrendEvaluator {
    pub fn new(params: SignalParams) -> Self {
        Self { params }
    }

    /// Returns `None` for an empty series or when the last close is at or
    /// below the EMA. `at` becomes the signal timestamp.
    pub fn evaluate(
        &self,
        symbol: &str,
        series: &PriceSeries,
        at: DateTime<Utc>,
    ) -> Option<TradeSignal> {
        let closes = series.closes();
        let last_close = *closes.last()?;
        let last_ema = ema_last(&closes, self.params.ema_period)?;

        if last_close <= last_ema {
            return None;
        }

        // a close under half a cent has no loggable entry price
        let entry = round2(last_close);
        if entry <= 0.0 {
            return None;
        }

        let levels = ExitLevels::for_long(entry, self.params.stoploss_pct, self.params.target_pct);

        Some(TradeSignal {
            timestamp: at,
            symbol: symbol.to_string(),
            entry_price: entry,
            ema: round2(last_ema),
            stop_loss: levels.stop_loss,
            target: levels.target,
            status: TradeStatus::Open,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{base_time, make_series};
    use proptest::prelude::*;

    fn evaluator() -> EmaTrendEvaluator {
        EmaTrendEvaluator::new(SignalParams {
            ema_period: 20,
            stoploss_pct: 1.5,
            target_pct: 3.0,
        })
    }

    #[test]
    fn empty_series_is_no_signal() {
        let s = PriceSeries::default();
        assert!(evaluator().evaluate("X", &s, base_time()).is_none());
    }

    #[test]
    fn single_bar_is_no_signal() {
        // EMA of one bar equals its close
        let s = make_series(&[100.0]);
        assert!(evaluator().evaluate("X", &s, base_time()).is_none());
    }

    #[test]
    fn flat_series_is_no_signal() {
        let s = make_series(&[250.0; 40]);
        assert!(evaluator().evaluate("X", &s, base_time()).is_none());
    }

    #[test]
    fn rising_series_buys_with_levels() {
        let closes: Vec<f64> = (0..30).map(|i| 90.0 + i as f64 * 0.5).collect();
        let s = make_series(&closes);
        let sig = evaluator().evaluate("NIFTYBEES.NS", &s, base_time()).unwrap();

        assert_eq!(sig.symbol, "NIFTYBEES.NS");
        assert_eq!(sig.status, TradeStatus::Open);
        assert_eq!(sig.timestamp, base_time());
        assert!((sig.entry_price - 104.5).abs() < 1e-9);
        assert!(sig.ema < sig.entry_price);
        assert!(sig.stop_loss < sig.entry_price && sig.entry_price < sig.target);
        assert_eq!(sig.stop_loss, round2(104.5 * (1.0 - 1.5 / 100.0)));
        assert_eq!(sig.target, round2(104.5 * (1.0 + 3.0 / 100.0)));
    }

    #[test]
    fn falling_tail_is_no_signal() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        closes.extend([120.0, 110.0, 100.0]);
        let s = make_series(&closes);
        assert!(evaluator().evaluate("X", &s, base_time()).is_none());
    }

    #[test]
    fn values_are_rounded_to_cents() {
        let s = make_series(&[100.0, 100.123_456]);
        let sig = evaluator().evaluate("X", &s, base_time()).unwrap();
        assert_eq!(sig.entry_price, 100.12);
        assert_eq!(sig.ema, round2(sig.ema));
    }

    #[test]
    fn penny_close_keeps_levels_strict() {
        let e = EmaTrendEvaluator::new(SignalParams {
            ema_period: 20,
            stoploss_pct: 1.0,
            target_pct: 3.0,
        });
        let s = make_series(&[0.20, 0.21, 0.25, 0.30]);
        let sig = e.evaluate("PENNY", &s, base_time()).unwrap();
        assert_eq!(sig.entry_price, 0.30);
        assert_eq!(sig.stop_loss, 0.29);
        assert_eq!(sig.target, 0.31);
    }

    #[test]
    fn close_under_half_a_cent_is_no_signal() {
        let s = make_series(&[0.001, 0.002, 0.004]);
        assert!(evaluator().evaluate("X", &s, base_time()).is_none());
    }

    proptest! {
        #[test]
        fn sub_unit_closes_keep_levels_strict(
            mut closes in prop::collection::vec(0.01f64..1.0, 2..60),
            jump in 0.001f64..0.5,
            stoploss_pct in 0.1f64..5.0,
            target_pct in 0.1f64..10.0,
        ) {
            let peak = closes.iter().cloned().fold(f64::MIN, f64::max);
            if let Some(last) = closes.last_mut() {
                *last = peak + jump;
            }
            let e = EmaTrendEvaluator::new(SignalParams { ema_period: 20, stoploss_pct, target_pct });
            let sig = e.evaluate("P", &make_series(&closes), base_time());
            let sig = sig.expect("close above EMA must buy");
            prop_assert!(sig.stop_loss < sig.entry_price);
            prop_assert!(sig.entry_price < sig.target);
        }


        #[test]
        fn close_above_ema_buys_with_bracketing_levels(
            mut closes in prop::collection::vec(10.0f64..1000.0, 2..60),
            jump in 1.0f64..50.0,
        ) {
            // force the final bar well above every earlier close
            let peak = closes.iter().cloned().fold(f64::MIN, f64::max);
            if let Some(last) = closes.last_mut() {
                *last = peak + jump;
            }
            let sig = evaluator().evaluate("P", &make_series(&closes), base_time());
            let sig = sig.expect("close above EMA must buy");
            prop_assert!(sig.stop_loss < sig.entry_price);
            prop_assert!(sig.entry_price < sig.target);
        }

        #[test]
        fn close_below_ema_is_none(
            mut closes in prop::collection::vec(10.0f64..1000.0, 1..60),
        ) {
            // the EMA never drops below the lowest close, so undercut it
            let trough = closes.iter().cloned().fold(f64::MAX, f64::min);
            if let Some(last) = closes.last_mut() {
                *last = trough - 1.0;
            }
            prop_assert!(evaluator().evaluate("P", &make_series(&closes), base_time()).is_none());
        }
    }
}
