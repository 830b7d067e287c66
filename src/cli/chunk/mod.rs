//! Chunk command - runs a chunking strategy over a local file

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::{Chunk, ChunkStrategyKind, ChunkingOptions};
use crate::infrastructure::chunking::ChunkerFactory;

/// Arguments for the chunk command
#[derive(Args, Clone, Debug)]
pub struct ChunkArgs {
    /// File to chunk
    pub file: PathBuf,

    /// Strategy slug: fixed-size, sentence-boundary, paragraph, sliding-window or semantic
    #[arg(long, default_value = "fixed-size")]
    pub strategy: String,

    /// Chunk size in words (defaults to engine.default_chunk_size)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Words shared by consecutive chunks (defaults to engine.default_chunk_overlap)
    #[arg(long)]
    pub chunk_overlap: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChunkOutput {
    strategy: &'static str,
    chunk_count: usize,
    chunks: Vec<Chunk>,
}

/// Print the chunks of `args.file` as pretty JSON
pub fn run(args: ChunkArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().unwrap_or_default();

    let content = std::fs::read_to_string(&args.file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.file.display(), e))?;

    let output = chunk_content(&content, &args, &config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn chunk_content(content: &str, args: &ChunkArgs, config: &AppConfig) -> anyhow::Result<ChunkOutput> {
    let kind: ChunkStrategyKind = args.strategy.parse()?;
    let options = ChunkingOptions::new(
        args.chunk_size.unwrap_or(config.engine.default_chunk_size),
        args.chunk_overlap.unwrap_or(config.engine.default_chunk_overlap),
    );

    let chunker = ChunkerFactory::new().create(kind);
    let chunks = chunker.chunk(content, &options)?;

    Ok(ChunkOutput {
        strategy: kind.as_str(),
        chunk_count: chunks.len(),
        chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strategy: &str, size: usize, overlap: usize) -> ChunkArgs {
        ChunkArgs {
            file: PathBuf::from("unused.txt"),
            strategy: strategy.to_string(),
            chunk_size: Some(size),
            chunk_overlap: Some(overlap),
        }
    }

    #[test]
    fn test_fixed_size_chunks() {
        let output =
            chunk_content("a b c d e f g", &args("fixed-size", 3, 0), &AppConfig::default()).unwrap();

        let contents: Vec<&str> = output.chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["a b c", "d e f", "g"]);
        assert_eq!(output.chunk_count, 3);
        assert_eq!(output.strategy, "fixed-size");
    }

    #[test]
    fn test_unknown_strategy() {
        let result = chunk_content("text", &args("zigzag", 3, 0), &AppConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_overlap_not_below_size_rejected() {
        let result = chunk_content("a b c d", &args("sliding-window", 2, 2), &AppConfig::default());
        assert!(result.is_err());
    }
}
