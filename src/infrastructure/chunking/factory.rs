//! Factory for creating chunkers

use std::fmt;
use std::sync::Arc;

use crate::domain::chunking::{ChunkStrategyKind, ChunkingStrategy};

use super::chunkers::{
    BoundaryDetector, FixedSizeChunker, ParagraphChunker, SemanticChunker, SentenceChunker,
    SlidingWindowChunker,
};

/// Factory for creating chunking strategies
#[derive(Clone, Default)]
pub struct ChunkerFactory {
    boundary_detector: Option<Arc<dyn BoundaryDetector>>,
}

impl fmt::Debug for ChunkerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkerFactory")
            .field("has_boundary_detector", &self.boundary_detector.is_some())
            .finish()
    }
}

impl ChunkerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector handed to semantic chunkers
    pub fn with_boundary_detector(mut self, detector: Arc<dyn BoundaryDetector>) -> Self {
        self.boundary_detector = Some(detector);
        self
    }

    /// Create a chunker for the given algorithm
    pub fn create(&self, kind: ChunkStrategyKind) -> Arc<dyn ChunkingStrategy> {
        match kind {
            ChunkStrategyKind::FixedSize => Arc::new(FixedSizeChunker::new()),
            ChunkStrategyKind::SentenceBoundary => Arc::new(SentenceChunker::new()),
            ChunkStrategyKind::Paragraph => Arc::new(ParagraphChunker::new()),
            ChunkStrategyKind::SlidingWindow => Arc::new(SlidingWindowChunker::new()),
            ChunkStrategyKind::Semantic => {
                let chunker = SemanticChunker::new();
                match &self.boundary_detector {
                    Some(detector) => Arc::new(chunker.with_detector(Arc::clone(detector))),
                    None => Arc::new(chunker),
                }
            }
        }
    }

    /// Get a list of all available chunking algorithms
    pub fn available_kinds() -> Vec<ChunkStrategyKind> {
        ChunkStrategyKind::ALL.to_vec()
    }
}
