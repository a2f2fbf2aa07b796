use crate::domain::market::{
    DetailedInfo, FastQuote, HistoryFrame, HistoryProfile, HistorySeries, Instrument, PricePoint,
};
use crate::domain::ports::MarketDataProvider;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Last bar of every synthetic series opens at this instant (2025-01-01 UTC)
const ANCHOR_MS: i64 = 1_735_689_600_000;

/// Offline provider with deterministic synthetic data.
///
/// Every value is derived from the ticker alone, so two runs over the same
/// universe produce the same snapshot. Roughly one instrument in four has no
/// market cap on the fast quote, which exercises the detailed-info fallback.
#[derive(Debug, Clone, Default)]
pub struct MockMarketDataProvider;

impl MockMarketDataProvider {
    pub fn new() -> Self {
        Self
    }

    fn seed(instrument: &Instrument) -> u64 {
        // FNV-1a, stable across runs and platforms
        instrument
            .ticker()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |hash, b| {
                (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
            })
    }

    fn base_price(seed: u64) -> f64 {
        // Spread prices over 1e-5 .. 1e5 so both rounding rules show up
        let exponent = (seed % 11) as i32 - 5;
        let mantissa = 1.0 + (seed >> 8) as f64 % 900.0 / 100.0;
        mantissa * 10f64.powi(exponent)
    }

    fn market_cap(seed: u64) -> f64 {
        let billions = 0.2 + ((seed >> 16) % 20_000) as f64 / 10.0;
        billions * 1e9
    }

    fn fast_quote_has_cap(seed: u64) -> bool {
        seed % 4 != 0
    }

    /// Drifting sine wave; the period and phase depend on the seed
    fn series(seed: u64, profile: HistoryProfile) -> HistorySeries {
        let bars = match profile {
            HistoryProfile::Fine => 480,
            HistoryProfile::Medium => 720,
            HistoryProfile::Coarse => 180,
        };
        let step_ms = profile.timeframe().to_seconds() * 1000;
        let base = Self::base_price(seed);
        let period = 12.0 + (seed % 37) as f64;
        let phase = (seed % 628) as f64 / 100.0;
        let drift = ((seed >> 24) % 5) as f64 / 1000.0 - 0.002;

        (0..bars)
            .map(|i| {
                let t = i as f64;
                let wave = 0.05 * (t * std::f64::consts::TAU / period + phase).sin();
                let close = base * (1.0 + wave) * (1.0 + drift).powf(t / 10.0);
                let timestamp = ANCHOR_MS - (bars - 1 - i) as i64 * step_ms;
                PricePoint::new(timestamp, close)
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    async fn fast_quote(&self, instrument: &Instrument) -> Result<FastQuote> {
        let seed = Self::seed(instrument);
        Ok(FastQuote {
            price: Some(Self::base_price(seed)),
            market_cap: Self::fast_quote_has_cap(seed).then(|| Self::market_cap(seed)),
        })
    }

    async fn detailed_info(&self, instrument: &Instrument) -> Result<DetailedInfo> {
        let seed = Self::seed(instrument);
        Ok(DetailedInfo {
            market_cap: Some(Self::market_cap(seed)),
            current_price: None,
            regular_market_price: Some(Self::base_price(seed)),
        })
    }

    async fn bulk_history(
        &self,
        instruments: &[Instrument],
        profile: HistoryProfile,
    ) -> Result<HistoryFrame> {
        debug!(
            "MockMarketDataProvider: Generating {} for {} symbols",
            profile,
            instruments.len()
        );
        if let [only] = instruments {
            return Ok(HistoryFrame::Single(Self::series(Self::seed(only), profile)));
        }
        let keyed: HashMap<Instrument, HistorySeries> = instruments
            .iter()
            .map(|i| (i.clone(), Self::series(Self::seed(i), profile)))
            .collect();
        Ok(HistoryFrame::Keyed(keyed))
    }
}
