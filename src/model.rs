use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lookback span requested from a price source.
///
/// String representations match both the config file and the Yahoo `range`
/// query parameter (e.g. `"1d"`, `"5d"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Day1,
    Day5,
    Month1,
    Month3,
    Month6,
    Year1,
    Year2,
    Year5,
    Year10,
    YearToDate,
    Max,
}

impl Period {
    /// Parse a config-format string into a `Period`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1d" => Some(Self::Day1),
            "5d" => Some(Self::Day5),
            "1mo" => Some(Self::Month1),
            "3mo" => Some(Self::Month3),
            "6mo" => Some(Self::Month6),
            "1y" => Some(Self::Year1),
            "2y" => Some(Self::Year2),
            "5y" => Some(Self::Year5),
            "10y" => Some(Self::Year10),
            "ytd" => Some(Self::YearToDate),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day1 => "1d",
            Self::Day5 => "5d",
            Self::Month1 => "1mo",
            Self::Month3 => "3mo",
            Self::Month6 => "6mo",
            Self::Year1 => "1y",
            Self::Year2 => "2y",
            Self::Year5 => "5y",
            Self::Year10 => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bar interval supported by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    Min1,
    Min2,
    Min5,
    Min15,
    Min30,
    Min60,
    Min90,
    Hour1,
    Day1,
    Day5,
    Week1,
    Month1,
    Month3,
}

impl Interval {
    /// Parse a config-format string into an `Interval`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Self::Min1),
            "2m" => Some(Self::Min2),
            "5m" => Some(Self::Min5),
            "15m" => Some(Self::Min15),
            "30m" => Some(Self::Min30),
            "60m" => Some(Self::Min60),
            "90m" => Some(Self::Min90),
            "1h" => Some(Self::Hour1),
            "1d" => Some(Self::Day1),
            "5d" => Some(Self::Day5),
            "1wk" => Some(Self::Week1),
            "1mo" => Some(Self::Month1),
            "3mo" => Some(Self::Month3),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min2 => "2m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Min60 => "60m",
            Self::Min90 => "90m",
            Self::Hour1 => "1h",
            Self::Day1 => "1d",
            Self::Day5 => "5d",
            Self::Week1 => "1wk",
            Self::Month1 => "1mo",
            Self::Month3 => "3mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `{period, interval}` request for one symbol's price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub period: Period,
    pub interval: Interval,
}

/// One OHLC observation. Sequences are ordered oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
