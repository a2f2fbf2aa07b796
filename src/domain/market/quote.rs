use serde::{Deserialize, Serialize};

/// Best-effort quote from the provider's cheap endpoint. Either field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FastQuote {
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Fields read from the provider's detailed info lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedInfo {
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
}

impl DetailedInfo {
    /// `currentPrice` is the more specific field and wins when both are usable
    pub fn best_price(&self) -> Option<f64> {
        self.current_price
            .filter(|p| *p != 0.0)
            .or(self.regular_market_price.filter(|p| *p != 0.0))
    }
}
