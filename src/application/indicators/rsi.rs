use crate::domain::market::{PricePoint, Timeframe};
use std::collections::BTreeMap;
use ta::Next;
use ta::errors::TaError;
use ta::indicators::ExponentialMovingAverage;

/// Lookback of every oscillator the scanner reports
pub const RSI_PERIOD: usize = 14;

/// Streaming RSI with exponential smoothing `alpha = 1 / period`.
///
/// An EMA over `2 * period - 1` bars has `k = 2 / (2 * period) = 1 / period`
/// and seeds with its first input, so both averages are plain recursive EWMAs
/// with no bias correction. The first close has no predecessor and feeds a
/// gain and a loss of zero.
#[derive(Debug, Clone)]
pub struct EwmRsi {
    prev_close: Option<f64>,
    avg_gain: ExponentialMovingAverage,
    avg_loss: ExponentialMovingAverage,
    last: (f64, f64),
}

impl EwmRsi {
    pub fn new(period: usize) -> Result<Self, TaError> {
        let span = 2 * period.max(1) - 1;
        Ok(Self {
            prev_close: None,
            avg_gain: ExponentialMovingAverage::new(span)?,
            avg_loss: ExponentialMovingAverage::new(span)?,
            last: (0.0, 0.0),
        })
    }

    /// Feed one close and return the oscillator at this step
    pub fn next(&mut self, close: f64) -> f64 {
        let change = self.prev_close.map_or(0.0, |prev| close - prev);
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        self.last = (self.avg_gain.next(gain), self.avg_loss.next(loss));
        self.prev_close = Some(close);
        self.value()
    }

    pub fn value(&self) -> f64 {
        oscillator(self.last.0, self.last.1)
    }
}

/// `100 - 100 / (1 + gain/loss)`, with a zero loss average read as an
/// infinite ratio (-> 100).
fn oscillator(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// RSI at every position of `closes`.
///
/// Non-finite closes are dropped first. A series shorter than `period` yields
/// zero at every position.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    let closes: Vec<f64> = closes.iter().copied().filter(|c| c.is_finite()).collect();
    if closes.len() < period {
        return vec![0.0; closes.len()];
    }

    let Ok(mut rsi) = EwmRsi::new(period) else {
        return vec![0.0; closes.len()];
    };
    closes.iter().map(|&c| rsi.next(c)).collect()
}

/// Collapse a series to the last observed close per `bucket`, oldest bucket first.
/// Buckets with no usable close are dropped.
pub fn resample_last(points: &[PricePoint], bucket: Timeframe) -> Vec<PricePoint> {
    let mut buckets: BTreeMap<i64, f64> = BTreeMap::new();
    for point in points {
        if let Some(close) = point.usable_close() {
            buckets.insert(bucket.period_start(point.timestamp), close);
        }
    }
    buckets
        .into_iter()
        .map(|(timestamp, close)| PricePoint::new(timestamp, close))
        .collect()
}

/// Most recent RSI reading of a history series, optionally resampled first.
///
/// Returns 0 for an empty or too-short series.
pub fn latest_rsi(points: &[PricePoint], resample: Option<Timeframe>) -> f64 {
    let closes: Vec<f64> = match resample {
        Some(bucket) => resample_last(points, bucket)
            .iter()
            .filter_map(PricePoint::usable_close)
            .collect(),
        None => points.iter().filter_map(PricePoint::usable_close).collect(),
    };

    rsi_series(&closes, RSI_PERIOD)
        .last()
        .copied()
        .unwrap_or(0.0)
}
