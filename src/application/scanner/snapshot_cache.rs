use crate::domain::scan::ScanResult;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

/// The latest non-empty scan and when it was taken
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub results: Arc<Vec<ScanResult>>,
    pub taken_at: Instant,
}

/// Holds the most recent successful scan.
///
/// Data and timestamp are stored together in one slot so readers always see a
/// matching pair. Empty scans are never stored.
pub struct SnapshotCache {
    ttl: Duration,
    slot: RwLock<Option<Snapshot>>,
}

// Manual Debug implementation for SnapshotCache
impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("ttl", &self.ttl)
            .field("slot", &"<RwLock>")
            .finish()
    }
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    fn read(&self) -> Option<Snapshot> {
        match self.slot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                tracing::error!("SnapshotCache: Lock poisoned during read, recovering");
                poisoned.into_inner().clone()
            }
        }
    }

    /// Cached results if they are younger than the TTL at `now`
    pub fn fresh(&self, now: Instant) -> Option<Arc<Vec<ScanResult>>> {
        self.read()
            .filter(|s| !s.results.is_empty())
            .filter(|s| now.saturating_duration_since(s.taken_at) < self.ttl)
            .map(|s| s.results)
    }

    /// Cached results regardless of age
    pub fn latest(&self) -> Option<Arc<Vec<ScanResult>>> {
        self.read().map(|s| s.results)
    }

    /// Age of the cached snapshot at `now`, if there is one
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.read()
            .map(|s| now.saturating_duration_since(s.taken_at))
    }

    /// Replace the snapshot. Returns false (and keeps the old one) for an
    /// empty result set.
    pub fn store(&self, results: Arc<Vec<ScanResult>>, taken_at: Instant) -> bool {
        if results.is_empty() {
            return false;
        }

        let snapshot = Snapshot { results, taken_at };
        match self.slot.write() {
            Ok(mut guard) => *guard = Some(snapshot),
            Err(poisoned) => {
                tracing::error!("SnapshotCache: Lock poisoned during write, recovering");
                *poisoned.into_inner() = Some(snapshot);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ticker: &str, market_cap: f64) -> ScanResult {
        ScanResult {
            symbol: ticker.trim_end_matches("-USD").to_string(),
            ticker: ticker.to_string(),
            price: 1.0,
            market_cap,
            rsi_15m: 50.0,
            rsi_1h: 50.0,
            rsi_4h: 50.0,
            rsi_1d: 50.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_within_ttl_only() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let taken = Instant::now();
        assert!(cache.store(Arc::new(vec![row("BTC-USD", 1e12)]), taken));

        assert!(cache.fresh(taken + Duration::from_secs(59)).is_some());
        assert!(cache.fresh(taken + Duration::from_secs(60)).is_none());
        assert!(cache.latest().is_some());
        assert_eq!(
            cache.age(taken + Duration::from_secs(5)),
            Some(Duration::from_secs(5))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_store_is_ignored() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let taken = Instant::now();
        cache.store(Arc::new(vec![row("ETH-USD", 4e11)]), taken);

        let later = taken + Duration::from_secs(120);
        assert!(!cache.store(Arc::new(Vec::new()), later));

        // Old snapshot and its timestamp survive
        assert_eq!(cache.latest().unwrap().len(), 1);
        assert!(cache.fresh(later).is_none());
    }

    #[test]
    fn test_empty_cache() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        assert!(cache.latest().is_none());
        assert!(cache.fresh(Instant::now()).is_none());
    }
}
