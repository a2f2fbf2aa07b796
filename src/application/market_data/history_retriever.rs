use crate::domain::errors::HistoryError;
use crate::domain::market::{HistoryBundle, HistoryProfile, Instrument};
use crate::domain::ports::MarketDataProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Fetches the fine, medium and coarse close series for a set of instruments.
///
/// Fail-fast: the first profile that errors or times out fails the whole
/// retrieval, as does a retrieval with no data points in any profile. A single
/// empty profile only leaves those readings at zero.
pub struct BulkHistoryRetriever {
    provider: Arc<dyn MarketDataProvider>,
    timeout: Duration,
}

impl BulkHistoryRetriever {
    pub fn new(provider: Arc<dyn MarketDataProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn retrieve(&self, instruments: &[Instrument]) -> Result<HistoryBundle, HistoryError> {
        let mut bundle = HistoryBundle::default();
        let mut total_points = 0;

        for profile in HistoryProfile::ALL {
            let call = self.provider.bulk_history(instruments, profile);
            let frame = match tokio::time::timeout(self.timeout, call).await {
                Ok(Ok(frame)) => frame,
                Ok(Err(source)) => return Err(HistoryError::Provider { profile, source }),
                Err(_) => {
                    return Err(HistoryError::Timeout {
                        profile,
                        duration_ms: self.timeout.as_millis() as u64,
                    });
                }
            };

            let keyed = frame.into_keyed(instruments);
            let points: usize = keyed.values().map(Vec::len).sum();
            total_points += points;

            debug!(
                "BulkHistoryRetriever: {} -> {} series, {} points",
                profile,
                keyed.len(),
                points
            );
            bundle.insert(profile, keyed);
        }

        if total_points == 0 {
            return Err(HistoryError::Empty {
                requested: instruments.len(),
            });
        }

        info!(
            "BulkHistoryRetriever: History ready for {} instruments",
            instruments.len()
        );
        Ok(bundle)
    }
}
