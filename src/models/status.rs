use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a recorded signal. `Open` is initial, `Win` and `Loss` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeStatus {
    Open,
    Win,
    Loss,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "Open",
            TradeStatus::Win => "Win",
            TradeStatus::Loss => "Loss",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TradeStatus::Open)
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trade status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for TradeStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "" => Ok(TradeStatus::Open),
            // older sheets wrote "Hit" for a reached target
            "win" | "hit" => Ok(TradeStatus::Win),
            "loss" => Ok(TradeStatus::Loss),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("open".parse::<TradeStatus>(), Ok(TradeStatus::Open));
        assert_eq!("WIN".parse::<TradeStatus>(), Ok(TradeStatus::Win));
        assert_eq!(" Loss ".parse::<TradeStatus>(), Ok(TradeStatus::Loss));
    }

    #[test]
    fn legacy_hit_reads_as_win() {
        assert_eq!("Hit".parse::<TradeStatus>(), Ok(TradeStatus::Win));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("Closed".parse::<TradeStatus>().is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(!TradeStatus::Open.is_terminal());
        assert!(TradeStatus::Win.is_terminal());
        assert!(TradeStatus::Loss.is_terminal());
        assert_eq!(TradeStatus::Win.to_string(), "Win");
    }
}
