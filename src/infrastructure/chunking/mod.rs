//! Chunking infrastructure

pub mod chunkers;
mod factory;

pub use chunkers::{
    BoundaryDetector, FixedSizeChunker, ParagraphChunker, SemanticChunker, SentenceChunker,
    SlidingWindowChunker,
};
pub use factory::ChunkerFactory;
