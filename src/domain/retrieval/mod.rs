//! Retrieval pipeline types

mod pipeline;
mod query;
mod retry;

pub use pipeline::{ConsistencyReport, WriteReport, WriteStage};
pub use query::{SimilarityQuery, SimilarityResult};
pub use retry::RetryConfig;
