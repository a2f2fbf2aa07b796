//! Yahoo Finance market data provider
//!
//! Quotes come from the v7 quote endpoint, detailed info from v10
//! quoteSummary, and closes from the v8 chart endpoint (one request per
//! symbol, several in flight at once).

use super::models::{ChartEnvelope, QuoteEnvelope, SummaryEnvelope};
use crate::config::ProviderEnvConfig;
use crate::domain::errors::MarketDataError;
use crate::domain::market::{
    DetailedInfo, FastQuote, HistoryFrame, HistoryProfile, HistorySeries, Instrument,
};
use crate::domain::ports::MarketDataProvider;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

pub struct YahooMarketDataProvider {
    client: ClientWithMiddleware,
    base_url: Url,
    history_concurrency: usize,
}

impl YahooMarketDataProvider {
    pub fn new(config: &ProviderEnvConfig) -> Self {
        Self {
            client: HttpClientFactory::create_client(config.http_timeout, config.max_retries),
            base_url: config.base_url.clone(),
            history_concurrency: config.history_concurrency.max(1),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = build_url(&self.base_url, path, params)?;
        let endpoint = url.path().to_string();

        let response = self.client.get(url).send().await.map_err(|e| {
            MarketDataError::RequestFailed {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::BadStatus {
                endpoint,
                status: status.as_u16(),
            }
            .into());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", endpoint))
    }

    async fn chart(&self, instrument: &Instrument, profile: HistoryProfile) -> Result<HistorySeries> {
        let path = format!("v8/finance/chart/{}", instrument.ticker());
        let envelope: ChartEnvelope = self
            .get_json(
                &path,
                &[
                    ("range", profile.lookback()),
                    ("interval", profile.interval()),
                ],
            )
            .await?;
        Ok(envelope.into_series(instrument.ticker())?)
    }
}

#[async_trait]
impl MarketDataProvider for YahooMarketDataProvider {
    async fn fast_quote(&self, instrument: &Instrument) -> Result<FastQuote> {
        let envelope: QuoteEnvelope = self
            .get_json("v7/finance/quote", &[("symbols", instrument.ticker())])
            .await?;
        Ok(envelope.into_fast_quote(instrument.ticker())?)
    }

    async fn detailed_info(&self, instrument: &Instrument) -> Result<DetailedInfo> {
        let path = format!("v10/finance/quoteSummary/{}", instrument.ticker());
        let envelope: SummaryEnvelope = self
            .get_json(&path, &[("modules", "price,financialData")])
            .await?;
        Ok(envelope.into_detailed_info(instrument.ticker())?)
    }

    async fn bulk_history(
        &self,
        instruments: &[Instrument],
        profile: HistoryProfile,
    ) -> Result<HistoryFrame> {
        debug!(
            "YahooMarketDataProvider: Fetching {} for {} symbols",
            profile,
            instruments.len()
        );

        let fetched: Vec<(Instrument, Result<HistorySeries>)> = stream::iter(instruments.iter().cloned())
            .map(|instrument| async move {
                let series = self.chart(&instrument, profile).await;
                (instrument, series)
            })
            .buffer_unordered(self.history_concurrency)
            .collect()
            .await;

        let mut keyed = HashMap::with_capacity(fetched.len());
        for (instrument, series) in fetched {
            match series {
                Ok(series) => {
                    keyed.insert(instrument, series);
                }
                Err(e) => warn!(
                    "YahooMarketDataProvider: {} history for {} unavailable: {}",
                    profile, instrument, e
                ),
            }
        }

        if keyed.is_empty() {
            let symbols: Vec<&str> = instruments.iter().map(|i| i.ticker()).collect();
            return Err(MarketDataError::NoData {
                symbol: symbols.join(","),
            }
            .into());
        }

        info!(
            "YahooMarketDataProvider: {} history for {}/{} symbols",
            profile,
            keyed.len(),
            instruments.len()
        );

        // Same shape collapse the upstream library performs for one symbol
        if instruments.len() == 1 {
            return Ok(HistoryFrame::Single(
                keyed.into_values().next().unwrap_or_default(),
            ));
        }
        Ok(HistoryFrame::Keyed(keyed))
    }
}
