use crate::application::scanner::{ScanOrchestrator, ScanService};
use crate::config::{Config, Mode};
use crate::domain::ports::MarketDataProvider;
use crate::infrastructure::mock::MockMarketDataProvider;
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::yahoo::YahooMarketDataProvider;
use std::sync::Arc;
use tracing::info;

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_provider(config: &Config) -> Arc<dyn MarketDataProvider> {
        match config.mode {
            Mode::Mock => {
                info!("ServiceFactory: Using mock market data");
                Arc::new(MockMarketDataProvider::new())
            }
            Mode::Yahoo => {
                info!(
                    "ServiceFactory: Using Yahoo market data at {}",
                    config.provider.base_url
                );
                Arc::new(YahooMarketDataProvider::new(&config.provider))
            }
        }
    }

    /// Wire provider, orchestrator and cache into a ready scan service
    pub fn create_scan_service(
        config: &Config,
        provider: Arc<dyn MarketDataProvider>,
        metrics: Arc<Metrics>,
    ) -> Arc<ScanService> {
        let orchestrator = Arc::new(ScanOrchestrator::new(
            provider,
            config.scanner.symbols.clone(),
            config.scanner.scan_settings(),
        ));
        Arc::new(ScanService::new(
            orchestrator,
            config.scanner.cache_ttl,
            metrics,
        ))
    }
}
