use clap::Parser;
use knowledge_retrieval_engine::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Chunk(args) => cli::chunk::run(args),
    }
}
