//! Scanner observability
//!
//! Metrics live in a private Prometheus registry and are rendered on demand in
//! text format (served at `/metrics` by the HTTP boundary).

pub mod metrics;

pub use metrics::Metrics;
