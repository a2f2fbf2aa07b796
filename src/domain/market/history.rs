use super::instrument::Instrument;
use super::timeframe::HistoryProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One bar close. `close` is `None` when the provider left a hole in the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Bar open time, unix milliseconds
    pub timestamp: i64,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: i64, close: f64) -> Self {
        Self {
            timestamp,
            close: Some(close),
        }
    }

    /// The close if it is present and finite
    pub fn usable_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite())
    }
}

/// Ordered closes for one instrument and one profile
pub type HistorySeries = Vec<PricePoint>;

/// Shape returned by a bulk history call.
///
/// Providers collapse a one-instrument request into a bare series; anything
/// larger comes back keyed by instrument.
#[derive(Debug, Clone)]
pub enum HistoryFrame {
    Single(HistorySeries),
    Keyed(HashMap<Instrument, HistorySeries>),
}

impl HistoryFrame {
    /// Normalize either shape into a map keyed by instrument.
    ///
    /// A bare series is attributed to the first requested instrument.
    pub fn into_keyed(self, requested: &[Instrument]) -> HashMap<Instrument, HistorySeries> {
        match self {
            HistoryFrame::Keyed(map) => map,
            HistoryFrame::Single(series) => requested
                .first()
                .map(|inst| HashMap::from([(inst.clone(), series)]))
                .unwrap_or_default(),
        }
    }
}

/// Close series for every validated instrument across the three profiles
#[derive(Debug, Clone, Default)]
pub struct HistoryBundle {
    fine: HashMap<Instrument, HistorySeries>,
    medium: HashMap<Instrument, HistorySeries>,
    coarse: HashMap<Instrument, HistorySeries>,
}

impl HistoryBundle {
    pub fn insert(&mut self, profile: HistoryProfile, data: HashMap<Instrument, HistorySeries>) {
        match profile {
            HistoryProfile::Fine => self.fine = data,
            HistoryProfile::Medium => self.medium = data,
            HistoryProfile::Coarse => self.coarse = data,
        }
    }

    /// Series for an instrument; a missing key reads as an empty series
    pub fn series(&self, profile: HistoryProfile, instrument: &Instrument) -> &[PricePoint] {
        let map = match profile {
            HistoryProfile::Fine => &self.fine,
            HistoryProfile::Medium => &self.medium,
            HistoryProfile::Coarse => &self.coarse,
        };
        map.get(instrument).map(Vec::as_slice).unwrap_or(&[])
    }
}
