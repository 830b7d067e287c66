//! Fixed-size chunking strategy

use crate::domain::chunking::{helpers, Chunk, ChunkingOptions, ChunkingStrategy};
use crate::domain::DomainError;

/// Splits content into blocks of `chunk_size` words.
///
/// With a non-zero overlap every chunk after the first is prefixed with the
/// last `chunk_overlap` words of the previous block.
#[derive(Debug, Clone, Default)]
pub struct FixedSizeChunker;

impl FixedSizeChunker {
    pub fn new() -> Self {
        Self
    }
}

impl ChunkingStrategy for FixedSizeChunker {
    fn chunk(&self, content: &str, options: &ChunkingOptions) -> Result<Vec<Chunk>, DomainError> {
        options.validate()?;

        let words = helpers::word_spans(content);
        let mut chunks = Vec::new();
        let mut block_start = 0;

        while block_start < words.len() {
            let block_end = (block_start + options.chunk_size).min(words.len());
            let start = block_start.saturating_sub(options.chunk_overlap);

            if let Some(chunk) = helpers::chunk_from_words(content, &words[start..block_end]) {
                chunks.push(chunk);
            }

            block_start = block_end;
        }

        Ok(helpers::finalize(chunks))
    }

    fn name(&self) -> &'static str {
        "fixed-size"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn test_empty_content() {
        let chunks = FixedSizeChunker::new()
            .chunk("", &ChunkingOptions::new(3, 0))
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_whitespace_only() {
        let chunks = FixedSizeChunker::new()
            .chunk("   \n\t  ", &ChunkingOptions::new(3, 0))
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_splits_into_word_blocks() {
        let chunks = FixedSizeChunker::new()
            .chunk("a b c d e f g", &ChunkingOptions::new(3, 0))
            .unwrap();

        assert_eq!(contents(&chunks), vec!["a b c", "d e f", "g"]);
        assert_eq!(chunks[2].metadata.ordinal, 2);
        assert_eq!(chunks[2].metadata.total_chunks, 3);
        assert_eq!(chunks[1].metadata.start_offset, 6);
        assert_eq!(chunks[1].metadata.end_offset, 11);
    }

    #[test]
    fn test_overlap_repeats_previous_words() {
        let chunks = FixedSizeChunker::new()
            .chunk("a b c d e f g", &ChunkingOptions::new(3, 1))
            .unwrap();

        assert_eq!(contents(&chunks), vec!["a b c", "c d e f", "f g"]);
    }

    #[test]
    fn test_short_content_yields_single_chunk() {
        let chunks = FixedSizeChunker::new()
            .chunk("  just a few words ", &ChunkingOptions::new(50, 10))
            .unwrap();

        assert_eq!(contents(&chunks), vec!["just a few words"]);
    }

    #[test]
    fn test_word_count_minus_overlap_equals_content_words() {
        let content = "one two three four five six seven eight nine ten eleven";
        let options = ChunkingOptions::new(4, 2);
        let chunks = FixedSizeChunker::new().chunk(content, &options).unwrap();

        let total: usize = chunks.iter().map(|c| c.word_count()).sum();
        let repeated = options.chunk_overlap * (chunks.len() - 1);
        assert_eq!(total - repeated, 11);
    }

    #[test]
    fn test_invalid_options() {
        let chunker = FixedSizeChunker::new();
        assert!(chunker.chunk("a b", &ChunkingOptions::new(0, 0)).is_err());
        assert!(chunker.chunk("a b", &ChunkingOptions::new(3, 3)).is_err());
    }

    #[test]
    fn test_deterministic() {
        let chunker = FixedSizeChunker::new();
        let options = ChunkingOptions::new(2, 1);
        let content = "the quick brown fox jumps";
        assert_eq!(
            chunker.chunk(content, &options).unwrap(),
            chunker.chunk(content, &options).unwrap()
        );
    }
}
