//! Domain layer - Core business logic and entities

pub mod chunking;
pub mod embedding;
pub mod entry;
pub mod error;
#[cfg(test)]
pub mod gate;
pub mod index;
pub mod knowledge_base;
pub mod retrieval;
pub mod storage;
pub mod traits;

pub use chunking::{
    Chunk, ChunkMetadata, ChunkStrategy, ChunkStrategyId, ChunkStrategyKind, ChunkingOptions,
    ChunkingStrategy,
};
pub use embedding::{cosine_similarity, similarity_score, Embedding, EmbeddingProvider};
pub use entry::{Entry, EntryFilter, EntryId, EntryMetadata, EntryPage, Pagination};
pub use error::DomainError;
pub use index::{EntryVectors, IndexHit, VectorIndex};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseId, KnowledgeBaseValidationError};
pub use retrieval::{
    ConsistencyReport, RetryConfig, SimilarityQuery, SimilarityResult, WriteReport, WriteStage,
};
pub use storage::{Storage, StorageEntity, StorageKey};
pub use traits::IdGenerator;
