//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Options controlling how content is split, measured in words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingOptions {
    /// Target chunk size in words
    pub chunk_size: usize,
    /// Words repeated between consecutive chunks
    pub chunk_overlap: usize,
}

impl ChunkingOptions {
    /// Create new chunking options
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunkSize must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "chunkOverlap must be less than chunkSize",
            ));
        }

        Ok(())
    }

    /// Distance between the starts of two consecutive windows
    pub fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Metadata for a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Position of this chunk within its entry (0-based)
    pub ordinal: usize,
    /// Total number of chunks produced for the entry
    pub total_chunks: usize,
    /// Byte offset where this chunk starts
    pub start_offset: usize,
    /// Byte offset where this chunk ends (exclusive)
    pub end_offset: usize,
    /// Number of words in the chunk
    pub word_count: usize,
}

/// A chunk of text extracted from an entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub content: String,
    #[serde(flatten)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a chunk covering `content[start..end]`
    pub fn from_span(content: &str, start: usize, end: usize, word_count: usize) -> Self {
        Self {
            content: content[start..end].to_string(),
            metadata: ChunkMetadata {
                ordinal: 0,
                total_chunks: 0,
                start_offset: start,
                end_offset: end,
                word_count,
            },
        }
    }

    pub fn ordinal(&self) -> usize {
        self.metadata.ordinal
    }

    pub fn word_count(&self) -> usize {
        self.metadata.word_count
    }
}

/// Trait for chunking strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split content into ordered chunks; blank content yields none
    fn chunk(&self, content: &str, options: &ChunkingOptions) -> Result<Vec<Chunk>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;

    /// Split content, failing when nothing would be produced
    fn chunk_required(
        &self,
        content: &str,
        options: &ChunkingOptions,
    ) -> Result<Vec<Chunk>, DomainError> {
        let chunks = self.chunk(content, options)?;

        if chunks.is_empty() {
            return Err(DomainError::validation(
                "content must produce at least one chunk",
            ));
        }

        Ok(chunks)
    }
}

/// Helper functions shared by the chunkers
pub mod helpers {
    use super::Chunk;

    /// A run of text treated as indivisible when packing
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Segment {
        pub start: usize,
        pub end: usize,
        pub words: usize,
    }

    /// Byte spans of the whitespace-delimited words in `text`
    pub fn word_spans(text: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = None;

        for (idx, ch) in text.char_indices() {
            match (ch.is_whitespace(), start) {
                (true, Some(s)) => {
                    spans.push((s, idx));
                    start = None;
                }
                (false, None) => start = Some(idx),
                _ => {}
            }
        }

        if let Some(s) = start {
            spans.push((s, text.len()));
        }

        spans
    }

    /// Segment for `text[start..end]` with surrounding whitespace trimmed
    pub fn trimmed_segment(text: &str, start: usize, end: usize) -> Option<Segment> {
        let slice = &text[start..end];
        let words = slice.split_whitespace().count();

        if words == 0 {
            return None;
        }

        let leading = slice.len() - slice.trim_start().len();
        let trailing = slice.len() - slice.trim_end().len();

        Some(Segment {
            start: start + leading,
            end: end - trailing,
            words,
        })
    }

    /// Build a chunk from a contiguous run of word spans
    pub fn chunk_from_words(text: &str, words: &[(usize, usize)]) -> Option<Chunk> {
        let first = words.first()?;
        let last = words.last()?;
        Some(Chunk::from_span(text, first.0, last.1, words.len()))
    }

    /// Greedily merge consecutive segments while the word total stays within `size`
    pub fn pack_segments(text: &str, segments: &[Segment], size: usize) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Option<Segment> = None;

        for segment in segments {
            current = match current {
                Some(open) if open.words + segment.words <= size => Some(Segment {
                    start: open.start,
                    end: segment.end,
                    words: open.words + segment.words,
                }),
                Some(open) => {
                    chunks.push(Chunk::from_span(text, open.start, open.end, open.words));
                    Some(*segment)
                }
                None => Some(*segment),
            };
        }

        if let Some(open) = current {
            chunks.push(Chunk::from_span(text, open.start, open.end, open.words));
        }

        chunks
    }

    /// Assign ordinals and totals once the chunk list is final
    pub fn finalize(mut chunks: Vec<Chunk>) -> Vec<Chunk> {
        let total = chunks.len();
        for (ordinal, chunk) in chunks.iter_mut().enumerate() {
            chunk.metadata.ordinal = ordinal;
            chunk.metadata.total_chunks = total;
        }
        chunks
    }
}
