use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Bar width requested from the price provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1wk")]
    W1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::D1 => "1d",
            Interval::W1 => "1wk",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Interval> {
        match s.trim() {
            "1m" => Some(Interval::M1),
            "5m" => Some(Interval::M5),
            "15m" => Some(Interval::M15),
            "30m" => Some(Interval::M30),
            "1h" | "60m" => Some(Interval::H1),
            "1d" => Some(Interval::D1),
            "1wk" | "1w" => Some(Interval::W1),
            _ => None,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How far back a fetch reaches, in the provider's range vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "5d")]
    D5,
    #[serde(rename = "1mo")]
    Mo1,
    #[serde(rename = "3mo")]
    Mo3,
    #[serde(rename = "6mo")]
    Mo6,
    #[serde(rename = "1y")]
    Y1,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::D1 => "1d",
            Period::D5 => "5d",
            Period::Mo1 => "1mo",
            Period::Mo3 => "3mo",
            Period::Mo6 => "6mo",
            Period::Y1 => "1y",
        }
    }

    /// Calendar length, months counted as 30 days.
    pub fn as_duration(&self) -> Duration {
        let days = match self {
            Period::D1 => 1,
            Period::D5 => 5,
            Period::Mo1 => 30,
            Period::Mo3 => 90,
            Period::Mo6 => 180,
            Period::Y1 => 365,
        };
        Duration::from_secs(days * 86400)
    }

    pub fn from_str_loose(s: &str) -> Option<Period> {
        match s.trim() {
            "1d" => Some(Period::D1),
            "5d" => Some(Period::D5),
            "1mo" => Some(Period::Mo1),
            "3mo" => Some(Period::Mo3),
            "6mo" => Some(Period::Mo6),
            "1y" => Some(Period::Y1),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
