use crate::domain::market::{DetailedInfo, FastQuote, HistoryFrame, HistoryProfile, Instrument};
use anyhow::Result;
use async_trait::async_trait;

/// Upstream market-data capabilities the scanner depends on.
///
/// Every call is best-effort: implementations report failures through the
/// `Result` and the scanner decides how much of the cycle a failure costs.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Cheap quote lookup. Fields the provider does not know come back as `None`.
    async fn fast_quote(&self, instrument: &Instrument) -> Result<FastQuote>;

    /// Slower, more complete lookup used when the fast quote lacks a market cap.
    async fn detailed_info(&self, instrument: &Instrument) -> Result<DetailedInfo>;

    /// Close series for every instrument in one profile.
    ///
    /// A one-instrument request may come back as [`HistoryFrame::Single`].
    async fn bulk_history(
        &self,
        instruments: &[Instrument],
        profile: HistoryProfile,
    ) -> Result<HistoryFrame>;
}
