//! Semantic chunking strategy

use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tracing::warn;

use super::SentenceChunker;
use crate::domain::chunking::{helpers, Chunk, ChunkingOptions, ChunkingStrategy};
use crate::domain::DomainError;

/// External model that finds topic boundaries in text
#[cfg_attr(test, automock)]
pub trait BoundaryDetector: Send + Sync {
    /// Byte offsets where a new topic starts, ascending
    fn detect(&self, content: &str) -> Result<Vec<usize>, DomainError>;
}

/// Splits at detector-provided boundaries, packing segments within `chunk_size`.
///
/// Without a detector, or when detection fails, falls back to sentence packing.
#[derive(Clone, Default)]
pub struct SemanticChunker {
    detector: Option<Arc<dyn BoundaryDetector>>,
    fallback: SentenceChunker,
}

impl fmt::Debug for SemanticChunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticChunker")
            .field("has_detector", &self.detector.is_some())
            .finish()
    }
}

impl SemanticChunker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(mut self, detector: Arc<dyn BoundaryDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    fn segments_at(
        content: &str,
        boundaries: &[usize],
    ) -> Result<Vec<helpers::Segment>, DomainError> {
        let mut segments = Vec::new();
        let mut start = 0;

        for &boundary in boundaries {
            if boundary < start || boundary > content.len() || !content.is_char_boundary(boundary)
            {
                return Err(DomainError::internal(format!(
                    "boundary detector returned invalid offset {}",
                    boundary
                )));
            }
            segments.extend(helpers::trimmed_segment(content, start, boundary));
            start = boundary;
        }
        segments.extend(helpers::trimmed_segment(content, start, content.len()));

        Ok(segments)
    }
}

impl ChunkingStrategy for SemanticChunker {
    fn chunk(&self, content: &str, options: &ChunkingOptions) -> Result<Vec<Chunk>, DomainError> {
        options.validate()?;

        let Some(detector) = &self.detector else {
            return self.fallback.chunk(content, options);
        };

        let segments = detector
            .detect(content)
            .and_then(|boundaries| Self::segments_at(content, &boundaries));

        match segments {
            Ok(segments) => Ok(helpers::finalize(helpers::pack_segments(
                content,
                &segments,
                options.chunk_size,
            ))),
            Err(e) => {
                warn!(error = %e, "Boundary detection failed, falling back to sentence chunking");
                self.fallback.chunk(content, options)
            }
        }
    }

    fn name(&self) -> &'static str {
        "semantic"
    }
}
