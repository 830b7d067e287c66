//! Sliding-window chunking strategy

use crate::domain::chunking::{helpers, Chunk, ChunkingOptions, ChunkingStrategy};
use crate::domain::DomainError;

/// Windows of `chunk_size` words advancing by `chunk_size - chunk_overlap`
#[derive(Debug, Clone, Default)]
pub struct SlidingWindowChunker;

impl SlidingWindowChunker {
    pub fn new() -> Self {
        Self
    }
}

impl ChunkingStrategy for SlidingWindowChunker {
    fn chunk(&self, content: &str, options: &ChunkingOptions) -> Result<Vec<Chunk>, DomainError> {
        options.validate()?;

        let words = helpers::word_spans(content);
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let end = (start + options.chunk_size).min(words.len());

            if let Some(chunk) = helpers::chunk_from_words(content, &words[start..end]) {
                chunks.push(chunk);
            }

            if end == words.len() {
                break;
            }
            start += options.step();
        }

        Ok(helpers::finalize(chunks))
    }

    fn name(&self) -> &'static str {
        "sliding-window"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn test_windows_advance_by_step() {
        let chunks = SlidingWindowChunker::new()
            .chunk("a b c d e f g", &ChunkingOptions::new(3, 1))
            .unwrap();

        assert_eq!(contents(&chunks), vec!["a b c", "c d e", "e f g"]);
    }

    #[test]
    fn test_last_window_may_be_short() {
        let chunks = SlidingWindowChunker::new()
            .chunk("a b c d e f", &ChunkingOptions::new(4, 2))
            .unwrap();

        assert_eq!(contents(&chunks), vec!["a b c d", "c d e f"]);

        let chunks = SlidingWindowChunker::new()
            .chunk("a b c d e f g", &ChunkingOptions::new(4, 2))
            .unwrap();
        assert_eq!(contents(&chunks), vec!["a b c d", "c d e f", "e f g"]);
    }

    #[test]
    fn test_no_overlap_matches_fixed_blocks() {
        let chunks = SlidingWindowChunker::new()
            .chunk("a b c d e f g", &ChunkingOptions::new(3, 0))
            .unwrap();

        assert_eq!(contents(&chunks), vec!["a b c", "d e f", "g"]);
    }

    #[test]
    fn test_word_count_minus_overlap_equals_content_words() {
        let content = "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10 w11 w12 w13";
        let options = ChunkingOptions::new(5, 2);
        let chunks = SlidingWindowChunker::new().chunk(content, &options).unwrap();

        let total: usize = chunks.iter().map(|c| c.word_count()).sum();
        assert_eq!(total - options.chunk_overlap * (chunks.len() - 1), 13);
    }

    #[test]
    fn test_empty_and_short_content() {
        let chunker = SlidingWindowChunker::new();
        let options = ChunkingOptions::new(10, 3);

        assert!(chunker.chunk(" ", &options).unwrap().is_empty());
        assert_eq!(chunker.chunk("tiny text", &options).unwrap().len(), 1);
    }
}
