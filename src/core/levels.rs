use serde::{Deserialize, Serialize};

const TICK: f64 = 0.01;

/// Fixed-percentage exit levels around a long entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitLevels {
    pub stop_loss: f64,
    pub target: f64,
}

impl ExitLevels {
    /// Percentages are in percent units (1.5 means 1.5 %). Levels are taken
    /// from the entry rounded to cents and are themselves rounded to cents.
    /// When a distance is under half a cent the level is moved one cent away
    /// so that `stop_loss < entry < target` still holds.
    pub fn for_long(entry: f64, stoploss_pct: f64, target_pct: f64) -> Self {
        let entry = round2(entry);
        let mut stop_loss = round2(entry * (1.0 - stoploss_pct / 100.0));
        let mut target = round2(entry * (1.0 + target_pct / 100.0));
        if stop_loss >= entry {
            stop_loss = round2(entry - TICK);
        }
        if target <= entry {
            target = round2(entry + TICK);
        }
        Self { stop_loss, target }
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
