//! Content chunking domain

mod chunker;
mod strategy;

pub use chunker::{helpers, Chunk, ChunkMetadata, ChunkingOptions, ChunkingStrategy};
pub use strategy::{
    validate_slug, ChunkStrategy, ChunkStrategyId, ChunkStrategyKind, MAX_SLUG_LENGTH,
};

#[cfg(test)]
pub use chunker::mock;
