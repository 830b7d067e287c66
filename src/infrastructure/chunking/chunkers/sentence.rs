//! Sentence-boundary chunking strategy

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::chunking::{helpers, Chunk, ChunkingOptions, ChunkingStrategy};
use crate::domain::DomainError;

/// Greedily packs whole sentences while the word count stays within `chunk_size`.
///
/// A sentence longer than `chunk_size` becomes a chunk of its own. Overlap is
/// validated but not applied, since repeating partial sentences would split them.
#[derive(Debug, Clone, Default)]
pub struct SentenceChunker;

impl SentenceChunker {
    pub fn new() -> Self {
        Self
    }

    /// Sentences of `text` as trimmed segments, using Unicode sentence boundaries
    pub fn sentence_segments(text: &str) -> Vec<helpers::Segment> {
        text.split_sentence_bound_indices()
            .filter_map(|(start, sentence)| {
                helpers::trimmed_segment(text, start, start + sentence.len())
            })
            .collect()
    }
}

impl ChunkingStrategy for SentenceChunker {
    fn chunk(&self, content: &str, options: &ChunkingOptions) -> Result<Vec<Chunk>, DomainError> {
        options.validate()?;

        let sentences = Self::sentence_segments(content);
        Ok(helpers::finalize(helpers::pack_segments(
            content,
            &sentences,
            options.chunk_size,
        )))
    }

    fn name(&self) -> &'static str {
        "sentence-boundary"
    }
}
