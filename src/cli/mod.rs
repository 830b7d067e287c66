//! CLI module for the Knowledge Retrieval Engine
//!
//! Provides subcommands:
//! - `serve`: HTTP API server
//! - `chunk`: chunk a file locally and print the chunks as JSON

pub mod chunk;
pub mod serve;

use clap::{Parser, Subcommand};

/// Knowledge Retrieval Engine - chunking, embedding and similarity search
#[derive(Parser)]
#[command(name = "knowledge-retrieval-engine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Chunk a file without embedding or indexing it
    Chunk(chunk::ChunkArgs),
}
