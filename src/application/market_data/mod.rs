// Provider-facing retrieval used by a scan cycle
pub mod history_retriever;
pub mod metadata_fetcher;

pub use history_retriever::BulkHistoryRetriever;
pub use metadata_fetcher::MetadataFetcher;
