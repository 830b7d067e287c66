//! Knowledge Base service - CRUD operations for knowledge bases

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::knowledge_base::parse_knowledge_base_id;
use crate::domain::storage::Storage;
use crate::domain::{
    ChunkStrategy, ChunkStrategyId, DomainError, IdGenerator, KnowledgeBase, KnowledgeBaseId,
    KnowledgeBaseValidationError,
};
use crate::infrastructure::retrieval::RetrievalCoordinator;

/// Request to create a new knowledge base
#[derive(Debug, Clone)]
pub struct CreateKnowledgeBaseRequest {
    pub name: String,
    pub description: String,
    pub chunking_strategy_id: ChunkStrategyId,
}

/// Request to update an existing knowledge base
#[derive(Debug, Clone, Default)]
pub struct UpdateKnowledgeBaseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub chunking_strategy_id: Option<ChunkStrategyId>,
}

impl UpdateKnowledgeBaseRequest {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.chunking_strategy_id.is_none()
    }
}

/// Knowledge Base service for CRUD operations
pub struct KnowledgeBaseService {
    coordinator: Arc<RetrievalCoordinator>,
    ids: Arc<dyn IdGenerator<KnowledgeBaseId>>,
}

impl std::fmt::Debug for KnowledgeBaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBaseService").finish()
    }
}

impl KnowledgeBaseService {
    pub fn new(
        coordinator: Arc<RetrievalCoordinator>,
        ids: Arc<dyn IdGenerator<KnowledgeBaseId>>,
    ) -> Self {
        Self { coordinator, ids }
    }

    fn storage(&self) -> &Arc<dyn Storage<KnowledgeBase>> {
        &self.coordinator.stores().knowledge_bases
    }

    /// Get a knowledge base by ID
    pub async fn get(&self, id: &str) -> Result<Option<KnowledgeBase>, DomainError> {
        let kb_id = parse_kb_id(id)?;
        self.storage().get(&kb_id).await
    }

    /// Get a knowledge base by ID, returning an error if not found
    pub async fn get_required(&self, id: &str) -> Result<KnowledgeBase, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Knowledge base '{}' not found", id)))
    }

    /// List all knowledge bases, most recently updated first
    pub async fn list(&self) -> Result<Vec<KnowledgeBase>, DomainError> {
        let mut knowledge_bases = self.storage().list().await?;
        knowledge_bases.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(knowledge_bases)
    }

    /// Create a new knowledge base
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateKnowledgeBaseRequest,
    ) -> Result<KnowledgeBase, DomainError> {
        self.require_strategy(request.chunking_strategy_id).await?;

        let kb = KnowledgeBase::new(
            self.ids.next_id(),
            &request.name,
            &request.description,
            request.chunking_strategy_id,
        )?;

        let kb = self.storage().create(kb).await?;
        info!(kb_id = %kb.id(), strategy_id = %kb.chunking_strategy_id(), "Knowledge base created");
        Ok(kb)
    }

    /// Update an existing knowledge base.
    ///
    /// Switching the chunking strategy re-indexes every entry of the knowledge
    /// base; if any entry fails, neither the record nor the index change.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: &str,
        request: UpdateKnowledgeBaseRequest,
    ) -> Result<KnowledgeBase, DomainError> {
        if request.is_empty() {
            return Err(KnowledgeBaseValidationError::EmptyUpdate.into());
        }

        let kb_id = parse_kb_id(id)?;
        if let Some(strategy_id) = request.chunking_strategy_id {
            self.require_strategy(strategy_id).await?;
        }

        let UpdateKnowledgeBaseRequest {
            name,
            description,
            chunking_strategy_id,
        } = request;

        let (kb, reindexed) = self
            .coordinator
            .update_knowledge_base(kb_id, move |kb| {
                if let Some(name) = &name {
                    kb.set_name(name)?;
                }
                if let Some(description) = &description {
                    kb.set_description(description)?;
                }
                if let Some(strategy_id) = chunking_strategy_id {
                    kb.set_chunking_strategy(strategy_id);
                }
                Ok(())
            })
            .await?;

        info!(kb_id = %kb.id(), reindexed = ?reindexed, "Knowledge base updated");
        Ok(kb)
    }

    /// Delete a knowledge base with its entries and vectors
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let kb_id = parse_kb_id(id)?;
        self.coordinator.remove_knowledge_base(kb_id).await
    }

    async fn require_strategy(&self, id: ChunkStrategyId) -> Result<ChunkStrategy, DomainError> {
        self.coordinator
            .stores()
            .strategies
            .get(&id)
            .await?
            .ok_or_else(|| {
                DomainError::validation(format!("Chunking strategy '{}' does not exist", id))
            })
    }
}

/// Parse and validate a knowledge base ID string
pub(crate) fn parse_kb_id(id: &str) -> Result<KnowledgeBaseId, DomainError> {
    Ok(KnowledgeBaseId::new(parse_knowledge_base_id(id)?))
}
