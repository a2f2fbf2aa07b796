//! Wire shapes of the Yahoo Finance JSON endpoints and their conversion into
//! domain values.

use crate::domain::errors::MarketDataError;
use crate::domain::market::{DetailedInfo, FastQuote, HistorySeries, PricePoint};
use serde::Deserialize;

/// Error object Yahoo embeds next to `result`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl ApiError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(desc)) => format!("{}: {}", code, desc),
            (Some(code), None) => code.clone(),
            (None, Some(desc)) => desc.clone(),
            (None, None) => "unknown provider error".to_string(),
        }
    }
}

// ===== /v7/finance/quote =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEnvelope {
    pub quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub result: Vec<QuoteRow>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRow {
    pub symbol: String,
    pub regular_market_price: Option<f64>,
    pub market_cap: Option<f64>,
}

impl QuoteEnvelope {
    pub fn into_fast_quote(self, symbol: &str) -> Result<FastQuote, MarketDataError> {
        if let Some(err) = self.quote_response.error {
            return Err(MarketDataError::InvalidData {
                symbol: symbol.to_string(),
                reason: err.describe(),
            });
        }
        let row = self
            .quote_response
            .result
            .into_iter()
            .find(|row| row.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| MarketDataError::NoData {
                symbol: symbol.to_string(),
            })?;

        Ok(FastQuote {
            price: row.regular_market_price,
            market_cap: row.market_cap,
        })
    }
}

// ===== /v10/finance/quoteSummary =====

/// Numeric field in `{"raw": 1.0, "fmt": "1.00"}` form; `{}` when unknown
#[derive(Debug, Default, Deserialize)]
pub struct RawValue {
    pub raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEnvelope {
    pub quote_summary: SummaryResponse,
}

#[derive(Debug, Deserialize)]
pub struct SummaryResponse {
    pub result: Option<Vec<SummaryResult>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub price: Option<PriceModule>,
    pub financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    #[serde(default)]
    pub market_cap: RawValue,
    #[serde(default)]
    pub regular_market_price: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataModule {
    #[serde(default)]
    pub current_price: RawValue,
}

impl SummaryEnvelope {
    pub fn into_detailed_info(self, symbol: &str) -> Result<DetailedInfo, MarketDataError> {
        if let Some(err) = self.quote_summary.error {
            return Err(MarketDataError::InvalidData {
                symbol: symbol.to_string(),
                reason: err.describe(),
            });
        }
        let result = self
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| MarketDataError::NoData {
                symbol: symbol.to_string(),
            })?;

        let price = result.price.unwrap_or_default();
        let financial = result.financial_data.unwrap_or_default();
        Ok(DetailedInfo {
            market_cap: price.market_cap.raw,
            current_price: financial.current_price.raw,
            regular_market_price: price.regular_market_price.raw,
        })
    }
}

// ===== /v8/finance/chart =====

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartResponse,
}

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Bar open times in epoch seconds
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuote {
    /// Missing bars come back as `null`
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartEnvelope {
    /// Pair timestamps with closes. Bars without a close are kept as gaps.
    pub fn into_series(self, symbol: &str) -> Result<HistorySeries, MarketDataError> {
        if let Some(err) = self.chart.error {
            return Err(MarketDataError::InvalidData {
                symbol: symbol.to_string(),
                reason: err.describe(),
            });
        }
        let result = self
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| MarketDataError::NoData {
                symbol: symbol.to_string(),
            })?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        if closes.len() != result.timestamp.len() {
            return Err(MarketDataError::InvalidData {
                symbol: symbol.to_string(),
                reason: format!(
                    "{} timestamps but {} closes",
                    result.timestamp.len(),
                    closes.len()
                ),
            });
        }

        Ok(result
            .timestamp
            .into_iter()
            .zip(closes)
            .map(|(secs, close)| PricePoint {
                timestamp: secs * 1000,
                close,
            })
            .collect())
    }
}
