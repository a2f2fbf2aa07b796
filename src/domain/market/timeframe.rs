use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar granularities the scanner reads or resamples to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    FifteenMin,
    OneHour,
    FourHour,
    OneDay,
}

impl Timeframe {
    /// Returns the duration of this timeframe in minutes
    pub fn to_minutes(&self) -> usize {
        match self {
            Timeframe::FifteenMin => 15,
            Timeframe::OneHour => 60,
            Timeframe::FourHour => 240,
            Timeframe::OneDay => 1440,
        }
    }

    /// Returns the duration in seconds
    pub fn to_seconds(&self) -> i64 {
        (self.to_minutes() * 60) as i64
    }

    /// Returns the start timestamp of the period containing the given timestamp
    ///
    /// Buckets are aligned to the UTC epoch, so a 4-hour bucket always starts at
    /// 00:00, 04:00, 08:00 ... UTC.
    ///
    /// # Arguments
    /// * `timestamp_ms` - Unix timestamp in milliseconds
    ///
    /// # Returns
    /// The start timestamp (in ms) of the period containing this timestamp
    pub fn period_start(&self, timestamp_ms: i64) -> i64 {
        let period_ms = self.to_seconds() * 1000;
        timestamp_ms.div_euclid(period_ms) * period_ms
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Timeframe::FifteenMin => "15m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHour => "4h",
            Timeframe::OneDay => "1d",
        };
        write!(f, "{}", label)
    }
}

/// The three (lookback, interval) pairs fetched on every scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryProfile {
    /// 5 days of 15-minute bars
    Fine,
    /// 1 month of hourly bars
    Medium,
    /// 6 months of daily bars
    Coarse,
}

impl HistoryProfile {
    pub const ALL: [HistoryProfile; 3] = [
        HistoryProfile::Fine,
        HistoryProfile::Medium,
        HistoryProfile::Coarse,
    ];

    pub fn timeframe(&self) -> Timeframe {
        match self {
            HistoryProfile::Fine => Timeframe::FifteenMin,
            HistoryProfile::Medium => Timeframe::OneHour,
            HistoryProfile::Coarse => Timeframe::OneDay,
        }
    }

    /// Bar size in Yahoo `interval` notation. 4h bars are never requested;
    /// they are resampled from the medium profile.
    pub fn interval(&self) -> &'static str {
        match self {
            HistoryProfile::Fine => "15m",
            HistoryProfile::Medium => "1h",
            HistoryProfile::Coarse => "1d",
        }
    }

    /// Lookback window in Yahoo `range` notation
    pub fn lookback(&self) -> &'static str {
        match self {
            HistoryProfile::Fine => "5d",
            HistoryProfile::Medium => "1mo",
            HistoryProfile::Coarse => "6mo",
        }
    }
}

impl fmt::Display for HistoryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.lookback(), self.timeframe())
    }
}
