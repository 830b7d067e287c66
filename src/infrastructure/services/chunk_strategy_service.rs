//! Chunk strategy service - reference data for knowledge base chunking

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::storage::Storage;
use crate::domain::{
    ChunkStrategy, ChunkStrategyId, ChunkStrategyKind, DomainError, IdGenerator, KnowledgeBase,
};

/// Strategies available on a fresh start: (name, slug, description)
pub const DEFAULT_STRATEGIES: [(&str, &str, &str); 5] = [
    (
        "Fixed Size Chunking",
        "fixed-size",
        "Splits text into chunks of a fixed word count. Simple and predictable, but may break semantic boundaries.",
    ),
    (
        "Semantic Chunking",
        "semantic",
        "Identifies natural breakpoints in text based on meaning and context. Falls back to sentence boundaries when no detector is configured.",
    ),
    (
        "Sentence Boundary",
        "sentence-boundary",
        "Chunks text at sentence boundaries while respecting a maximum size limit. Balances readability with size constraints.",
    ),
    (
        "Paragraph Chunking",
        "paragraph",
        "Splits content by paragraphs, combining smaller paragraphs if needed. Maintains document structure and readability.",
    ),
    (
        "Sliding Window",
        "sliding-window",
        "Creates overlapping chunks with a sliding window approach. Ensures context continuity but increases storage requirements.",
    ),
];

/// Request to create a chunk strategy
#[derive(Debug, Clone)]
pub struct CreateChunkStrategyRequest {
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Required unless the slug names a chunking algorithm
    pub kind: Option<ChunkStrategyKind>,
}

/// Chunk strategy service
pub struct ChunkStrategyService {
    strategies: Arc<dyn Storage<ChunkStrategy>>,
    knowledge_bases: Arc<dyn Storage<KnowledgeBase>>,
    ids: Arc<dyn IdGenerator<ChunkStrategyId>>,
}

impl std::fmt::Debug for ChunkStrategyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStrategyService").finish()
    }
}

impl ChunkStrategyService {
    pub fn new(
        strategies: Arc<dyn Storage<ChunkStrategy>>,
        knowledge_bases: Arc<dyn Storage<KnowledgeBase>>,
        ids: Arc<dyn IdGenerator<ChunkStrategyId>>,
    ) -> Self {
        Self {
            strategies,
            knowledge_bases,
            ids,
        }
    }

    /// List all strategies ordered by ID
    pub async fn list(&self) -> Result<Vec<ChunkStrategy>, DomainError> {
        let mut strategies = self.strategies.list().await?;
        strategies.sort_by_key(|s| s.id());
        Ok(strategies)
    }

    pub async fn get(&self, id: ChunkStrategyId) -> Result<Option<ChunkStrategy>, DomainError> {
        self.strategies.get(&id).await
    }

    /// Create a strategy; slugs are unique
    #[instrument(skip(self, request), fields(slug = %request.slug))]
    pub async fn create(
        &self,
        request: CreateChunkStrategyRequest,
    ) -> Result<ChunkStrategy, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Name is required"));
        }
        if request.slug.trim().is_empty() {
            return Err(DomainError::validation("Slug is required"));
        }
        if request.description.trim().is_empty() {
            return Err(DomainError::validation("Description is required"));
        }

        let slug = request.slug.trim();
        if self.strategies.list().await?.iter().any(|s| s.slug() == slug) {
            return Err(DomainError::conflict(format!(
                "Chunking strategy with slug '{}' already exists",
                slug
            )));
        }

        let strategy = ChunkStrategy::new(
            self.ids.next_id(),
            request.name,
            slug,
            request.description,
            request.kind,
        )?;

        let strategy = self.strategies.create(strategy).await?;
        info!(strategy_id = %strategy.id(), kind = %strategy.kind(), "Chunking strategy created");
        Ok(strategy)
    }

    /// Delete a strategy no knowledge base references
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ChunkStrategyId) -> Result<(), DomainError> {
        let referenced = self
            .knowledge_bases
            .list()
            .await?
            .iter()
            .filter(|kb| kb.chunking_strategy_id() == id)
            .count();

        if referenced > 0 {
            return Err(DomainError::conflict(format!(
                "Chunking strategy '{}' is used by {} knowledge base(s)",
                id, referenced
            )));
        }

        if !self.strategies.delete(&id).await? {
            return Err(DomainError::not_found(format!(
                "Chunking strategy '{}' not found",
                id
            )));
        }

        info!(strategy_id = %id, "Chunking strategy deleted");
        Ok(())
    }

    /// Create the default strategies when none exist, returning how many were added
    pub async fn seed_defaults(&self) -> Result<usize, DomainError> {
        if self.strategies.count().await? > 0 {
            debug!("Chunking strategies already present, skipping seed");
            return Ok(0);
        }

        for (name, slug, description) in DEFAULT_STRATEGIES {
            let strategy = ChunkStrategy::new(self.ids.next_id(), name, slug, description, None)?;
            self.strategies.create(strategy).await?;
        }

        info!(count = DEFAULT_STRATEGIES.len(), "Seeded default chunking strategies");
        Ok(DEFAULT_STRATEGIES.len())
    }
}
