//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::retrieval::RetrievalCoordinator;
use crate::infrastructure::services::{ChunkStrategyService, EntryService, KnowledgeBaseService};

/// Application state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub knowledge_base_service: Arc<KnowledgeBaseService>,
    pub chunk_strategy_service: Arc<ChunkStrategyService>,
    pub entry_service: Arc<EntryService>,
    pub coordinator: Arc<RetrievalCoordinator>,
}

impl AppState {
    pub fn new(
        knowledge_base_service: Arc<KnowledgeBaseService>,
        chunk_strategy_service: Arc<ChunkStrategyService>,
        entry_service: Arc<EntryService>,
        coordinator: Arc<RetrievalCoordinator>,
    ) -> Self {
        Self {
            knowledge_base_service,
            chunk_strategy_service,
            entry_service,
            coordinator,
        }
    }
}
