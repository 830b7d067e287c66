//! Paragraph-based chunking strategy

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::chunking::{helpers, Chunk, ChunkingOptions, ChunkingStrategy};
use crate::domain::DomainError;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());

/// Merges consecutive paragraphs (blank-line separated) while the word count
/// stays within `chunk_size`; a paragraph is never split.
#[derive(Debug, Clone, Default)]
pub struct ParagraphChunker;

impl ParagraphChunker {
    pub fn new() -> Self {
        Self
    }

    fn paragraph_segments(text: &str) -> Vec<helpers::Segment> {
        let mut segments = Vec::new();
        let mut start = 0;

        for separator in PARAGRAPH_BREAK.find_iter(text) {
            segments.extend(helpers::trimmed_segment(text, start, separator.start()));
            start = separator.end();
        }
        segments.extend(helpers::trimmed_segment(text, start, text.len()));

        segments
    }
}

impl ChunkingStrategy for ParagraphChunker {
    fn chunk(&self, content: &str, options: &ChunkingOptions) -> Result<Vec<Chunk>, DomainError> {
        options.validate()?;

        let paragraphs = Self::paragraph_segments(content);
        Ok(helpers::finalize(helpers::pack_segments(
            content,
            &paragraphs,
            options.chunk_size,
        )))
    }

    fn name(&self) -> &'static str {
        "paragraph"
    }
}
