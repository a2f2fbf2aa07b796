pub mod rsi;

pub use rsi::{EwmRsi, RSI_PERIOD, latest_rsi, resample_last, rsi_series};
