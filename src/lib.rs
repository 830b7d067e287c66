//! Knowledge Retrieval Engine
//!
//! Turns knowledge base entries into retrievable units:
//! - Chunking with fixed-size, sentence, paragraph, sliding-window and semantic strategies
//! - Embedding through a pluggable provider (local hashing or OpenAI-compatible)
//! - A vector index partitioned per knowledge base, kept in step with entry records
//! - Similarity queries ranked per entry by their best-matching chunk

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use config::{EmbeddingConfig, EmbeddingProviderKind};
use domain::{ChunkingOptions, DomainError, EmbeddingProvider};
use infrastructure::{
    chunking::ChunkerFactory,
    embedding::{
        HashingEmbeddingProvider, HttpClient, OpenAiEmbeddingProvider, DEFAULT_OPENAI_MODEL,
    },
    id::{SequentialIdGenerator, UuidEntryIdGenerator},
    index::InMemoryVectorIndex,
    retrieval::{RecordStores, RetrievalConfig, RetrievalCoordinator},
    services::{ChunkStrategyService, EntryService, KnowledgeBaseService},
    storage::InMemoryStorage,
};
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let engine = &config.engine;

    let default_options = ChunkingOptions::new(engine.default_chunk_size, engine.default_chunk_overlap);
    default_options.validate()?;

    let stores = RecordStores {
        knowledge_bases: Arc::new(InMemoryStorage::new()),
        strategies: Arc::new(InMemoryStorage::new()),
        entries: Arc::new(InMemoryStorage::new()),
    };

    let embedder = create_embedding_provider(&config.embedding, engine.dimensions)?;
    info!(
        provider = embedder.provider_name(),
        dimensions = engine.dimensions,
        "Embedding provider ready"
    );

    let coordinator = Arc::new(RetrievalCoordinator::new(
        stores.clone(),
        Arc::new(InMemoryVectorIndex::new(engine.dimensions)),
        embedder,
        ChunkerFactory::new(),
        RetrievalConfig {
            candidate_multiplier: engine.candidate_multiplier.max(1),
            embedding_concurrency: engine.embedding_concurrency.max(1),
            retry: engine.retry.clone(),
        },
    )?);

    let chunk_strategy_service = Arc::new(ChunkStrategyService::new(
        stores.strategies.clone(),
        stores.knowledge_bases.clone(),
        Arc::new(SequentialIdGenerator::new()),
    ));

    if config.seed.default_strategies {
        chunk_strategy_service.seed_defaults().await?;
    }

    let knowledge_base_service = Arc::new(KnowledgeBaseService::new(
        coordinator.clone(),
        Arc::new(SequentialIdGenerator::new()),
    ));

    let entry_service = Arc::new(EntryService::new(
        coordinator.clone(),
        Arc::new(UuidEntryIdGenerator),
        default_options,
    ));

    Ok(AppState::new(
        knowledge_base_service,
        chunk_strategy_service,
        entry_service,
        coordinator,
    ))
}

fn create_embedding_provider(
    config: &EmbeddingConfig,
    dimensions: usize,
) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
    match config.provider {
        EmbeddingProviderKind::Hashing => Ok(Arc::new(HashingEmbeddingProvider::new(dimensions)?)),
        EmbeddingProviderKind::OpenAi => {
            let api_key = config
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    DomainError::configuration(
                        "embedding.api_key or OPENAI_API_KEY is required for the openai provider",
                    )
                })?;

            let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;
            let model = config.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
            let mut provider = OpenAiEmbeddingProvider::new(client, api_key, model, dimensions);

            if let Some(url) = &config.base_url {
                info!("Using OpenAI embeddings with custom base URL: {}", url);
                provider = provider.with_base_url(url.as_str());
            }

            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_state_seeds_strategies() {
        let state = create_app_state().await.unwrap();
        let strategies = state.chunk_strategy_service.list().await.unwrap();

        assert_eq!(strategies.len(), 5);
        assert_eq!(strategies[0].slug(), "fixed-size");
    }

    #[tokio::test]
    async fn test_seed_can_be_disabled() {
        let mut config = AppConfig::default();
        config.seed.default_strategies = false;

        let state = create_app_state_with_config(&config).await.unwrap();
        assert!(state.chunk_strategy_service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_default_chunking_rejected() {
        let mut config = AppConfig::default();
        config.engine.default_chunk_overlap = config.engine.default_chunk_size;

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[test]
    fn test_openai_with_empty_key_is_configuration_error() {
        let config = EmbeddingConfig {
            provider: EmbeddingProviderKind::OpenAi,
            api_key: Some(String::new()),
            ..Default::default()
        };

        let err = create_embedding_provider(&config, 8).err().unwrap();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
