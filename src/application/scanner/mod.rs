// Scan cycle, its worker pool, and the cached/single-flight service on top
pub mod orchestrator;
pub mod service;
pub mod snapshot_cache;
pub mod worker_pool;

pub use orchestrator::{ScanOrchestrator, ScanSettings, assemble_result};
pub use service::{ScanService, SnapshotSource};
pub use snapshot_cache::{Snapshot, SnapshotCache};
pub use worker_pool::WorkerPool;
