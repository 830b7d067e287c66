//! Infrastructure services

mod chunk_strategy_service;
mod entry_service;
mod knowledge_base_service;

pub use chunk_strategy_service::{
    ChunkStrategyService, CreateChunkStrategyRequest, DEFAULT_STRATEGIES,
};
pub use entry_service::{
    ChunkingOptionsOverride, CreateEntryRequest, EntryService, IndexedEntry, PreviewChunksRequest,
    UpdateEntryRequest,
};
pub use knowledge_base_service::{
    CreateKnowledgeBaseRequest, KnowledgeBaseService, UpdateKnowledgeBaseRequest,
};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::domain::storage::Storage;
    use crate::domain::{ChunkStrategy, ChunkStrategyId, ChunkStrategyKind, KnowledgeBase, KnowledgeBaseId};
    use crate::infrastructure::chunking::ChunkerFactory;
    use crate::infrastructure::embedding::HashingEmbeddingProvider;
    use crate::infrastructure::index::InMemoryVectorIndex;
    use crate::infrastructure::retrieval::{RecordStores, RetrievalConfig, RetrievalCoordinator};
    use crate::infrastructure::storage::InMemoryStorage;

    pub struct TestCoordinator {
        pub coordinator: Arc<RetrievalCoordinator>,
    }

    impl TestCoordinator {
        /// Add knowledge base 1 using strategy 1
        pub async fn with_knowledge_base(self) -> Self {
            let kb = KnowledgeBase::new(
                KnowledgeBaseId::new(1),
                "Product Docs",
                "Product documentation",
                ChunkStrategyId::new(1),
            )
            .unwrap();
            self.coordinator
                .stores()
                .knowledge_bases
                .create(kb)
                .await
                .unwrap();
            self
        }
    }

    /// Coordinator over empty in-memory stores with one strategy per kind, IDs from 1
    pub fn coordinator(kinds: &[ChunkStrategyKind]) -> TestCoordinator {
        let strategies: Vec<ChunkStrategy> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                ChunkStrategy::new(
                    ChunkStrategyId::new(i as u64 + 1),
                    format!("{} strategy", kind),
                    kind.as_str(),
                    "Strategy used in tests",
                    Some(*kind),
                )
                .unwrap()
            })
            .collect();

        let stores = RecordStores {
            knowledge_bases: Arc::new(InMemoryStorage::new()),
            strategies: Arc::new(InMemoryStorage::with_entities(strategies)),
            entries: Arc::new(InMemoryStorage::new()),
        };

        let coordinator = RetrievalCoordinator::new(
            stores,
            Arc::new(InMemoryVectorIndex::new(64)),
            Arc::new(HashingEmbeddingProvider::new(64).unwrap()),
            ChunkerFactory::new(),
            RetrievalConfig::default(),
        )
        .unwrap();

        TestCoordinator {
            coordinator: Arc::new(coordinator),
        }
    }
}
