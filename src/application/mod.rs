// Oscillator math over price series
pub mod indicators;

// Provider-facing retrieval
pub mod market_data;

// Scan cycle orchestration and snapshot caching
pub mod scanner;
