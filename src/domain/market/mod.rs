// Market data domain
pub mod history;
pub mod instrument;
pub mod quote;
pub mod timeframe;

pub use history::{HistoryBundle, HistoryFrame, HistorySeries, PricePoint};
pub use instrument::Instrument;
pub use quote::{DetailedInfo, FastQuote};
pub use timeframe::{HistoryProfile, Timeframe};
