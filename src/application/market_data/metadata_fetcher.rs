use crate::domain::market::Instrument;
use crate::domain::ports::MarketDataProvider;
use crate::domain::scan::{MetadataLookup, QuoteSource};
use std::sync::Arc;
use tracing::debug;

/// Resolves price and market cap for one instrument.
///
/// Tries the provider's fast quote first and falls back to the detailed info
/// lookup when the fast quote has no usable market cap. Provider failures are
/// absorbed here: `fetch` always returns, with zero for anything unresolved.
pub struct MetadataFetcher {
    provider: Arc<dyn MarketDataProvider>,
}

impl MetadataFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, instrument: &Instrument) -> MetadataLookup {
        let mut price = 0.0;
        let mut market_cap = 0.0;

        // 1. Fast quote
        match self.provider.fast_quote(instrument).await {
            Ok(quote) => {
                price = quote.price.unwrap_or(0.0);
                market_cap = quote.market_cap.unwrap_or(0.0);
            }
            Err(e) => {
                debug!("MetadataFetcher: fast quote failed for {}: {:#}", instrument, e);
            }
        }

        if market_cap != 0.0 {
            return MetadataLookup {
                instrument: instrument.clone(),
                price,
                market_cap,
                source: QuoteSource::Fast,
            };
        }

        // 2. Detailed info fallback
        let mut source = QuoteSource::Unresolved;
        match self.provider.detailed_info(instrument).await {
            Ok(info) => {
                market_cap = info.market_cap.unwrap_or(0.0);
                if price == 0.0 {
                    price = info.best_price().unwrap_or(0.0);
                }
                source = QuoteSource::Detailed;
            }
            Err(e) => {
                debug!(
                    "MetadataFetcher: detailed info failed for {}: {:#}",
                    instrument, e
                );
            }
        }

        MetadataLookup {
            instrument: instrument.clone(),
            price,
            market_cap,
            source,
        }
    }
}
