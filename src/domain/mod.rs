// Market data domain
pub mod market;

// Port interfaces
pub mod ports;

// Scan cycle types
pub mod scan;

// Domain-specific error types
pub mod errors;
