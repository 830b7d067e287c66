//! Entry service - knowledge base entries and their indexing

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use super::knowledge_base_service::parse_kb_id;
use crate::domain::entry::EntryFilter;
use crate::domain::{
    Chunk, ChunkStrategyKind, ChunkingOptions, DomainError, Entry, EntryId, EntryMetadata,
    EntryPage, IdGenerator, KnowledgeBaseId, WriteReport,
};
use crate::infrastructure::retrieval::RetrievalCoordinator;

/// Partial chunking options; missing values fall back to a base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkingOptionsOverride {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
}

impl ChunkingOptionsOverride {
    pub fn apply(&self, base: ChunkingOptions) -> ChunkingOptions {
        ChunkingOptions::new(
            self.chunk_size.unwrap_or(base.chunk_size),
            self.chunk_overlap.unwrap_or(base.chunk_overlap),
        )
    }
}

/// Request to create an entry
#[derive(Debug, Clone, Default)]
pub struct CreateEntryRequest {
    pub content: String,
    pub metadata: Option<BTreeMap<String, Value>>,
    pub options: Option<ChunkingOptionsOverride>,
}

/// Request to update an entry
#[derive(Debug, Clone, Default)]
pub struct UpdateEntryRequest {
    pub content: Option<String>,
    /// Merged into the existing metadata
    pub metadata: Option<BTreeMap<String, Value>>,
    pub options: Option<ChunkingOptionsOverride>,
    /// Re-embed even when the content is unchanged
    pub regenerate_embedding: Option<bool>,
}

impl UpdateEntryRequest {
    fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.metadata.is_none()
            && self.options.is_none()
            && self.regenerate_embedding.is_none()
    }

    fn needs_reindex(&self) -> bool {
        self.content.is_some() || self.options.is_some() || self.regenerate_embedding == Some(true)
    }
}

/// Chunk preview request; the strategy comes from `kind`, else the knowledge base, else fixed-size
#[derive(Debug, Clone, Default)]
pub struct PreviewChunksRequest {
    pub content: String,
    pub knowledge_base_id: Option<KnowledgeBaseId>,
    pub kind: Option<ChunkStrategyKind>,
    pub options: Option<ChunkingOptionsOverride>,
}

/// A stored entry with the outcome of indexing it
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: Entry,
    pub report: WriteReport,
}

/// Entry service
pub struct EntryService {
    coordinator: Arc<RetrievalCoordinator>,
    ids: Arc<dyn IdGenerator<EntryId>>,
    default_options: ChunkingOptions,
}

impl std::fmt::Debug for EntryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryService")
            .field("default_options", &self.default_options)
            .finish()
    }
}

impl EntryService {
    pub fn new(
        coordinator: Arc<RetrievalCoordinator>,
        ids: Arc<dyn IdGenerator<EntryId>>,
        default_options: ChunkingOptions,
    ) -> Self {
        Self {
            coordinator,
            ids,
            default_options,
        }
    }

    /// Create an entry and index its content
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        kb_id: &str,
        request: CreateEntryRequest,
    ) -> Result<IndexedEntry, DomainError> {
        let kb_id = self.require_knowledge_base(kb_id).await?;

        let options = request
            .options
            .map(|o| o.apply(self.default_options))
            .unwrap_or(self.default_options);
        let metadata = request.metadata.map(EntryMetadata::from).unwrap_or_default();

        let entry = Entry::new(
            self.ids.next_id(),
            kb_id,
            &request.content,
            metadata,
            options,
        )?;

        let report = self.coordinator.process_write(entry.clone()).await?;
        Ok(IndexedEntry { entry, report })
    }

    /// Get an entry of a knowledge base
    pub async fn get(&self, kb_id: &str, entry_id: &str) -> Result<Entry, DomainError> {
        let kb_id = parse_kb_id(kb_id)?;
        let entry_id = EntryId::new(entry_id)?;

        self.coordinator
            .stores()
            .entries
            .get(&entry_id)
            .await?
            .filter(|entry| entry.knowledge_base_id() == kb_id)
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Entry '{}' not found in knowledge base '{}'",
                    entry_id, kb_id
                ))
            })
    }

    /// List a page of a knowledge base's entries
    pub async fn list(&self, kb_id: &str, filter: EntryFilter) -> Result<EntryPage, DomainError> {
        filter.validate()?;
        let kb_id = self.require_knowledge_base(kb_id).await?;

        let entries = self
            .coordinator
            .stores()
            .entries
            .list_where(&move |entry: &Entry| entry.knowledge_base_id() == kb_id)
            .await?;

        Ok(EntryPage::build(entries, &filter))
    }

    /// Update an entry.
    ///
    /// Content, option and regeneration changes re-index the entry; metadata-only
    /// changes keep its vectors.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        kb_id: &str,
        entry_id: &str,
        request: UpdateEntryRequest,
    ) -> Result<Entry, DomainError> {
        if request.is_empty() {
            return Err(DomainError::validation(
                "At least one field (content, metadata, options or regenerateEmbedding) must be provided",
            ));
        }

        let kb_id = parse_kb_id(kb_id)?;
        let entry_id = EntryId::new(entry_id)?;
        let reindex = request.needs_reindex();
        let UpdateEntryRequest {
            content,
            metadata,
            options,
            ..
        } = request;

        let entry = self
            .coordinator
            .update_entry(kb_id, &entry_id, reindex, move |entry| {
                if let Some(content) = &content {
                    entry.set_content(content)?;
                }
                if let Some(options) = options {
                    entry.set_options(options.apply(*entry.options()))?;
                }
                if let Some(metadata) = metadata {
                    entry.merge_metadata(metadata);
                }
                Ok(())
            })
            .await?;

        debug!(entry_id = %entry.id(), reindexed = reindex, "Entry updated");
        Ok(entry)
    }

    /// Delete an entry and its vectors
    #[instrument(skip(self))]
    pub async fn delete(&self, kb_id: &str, entry_id: &str) -> Result<(), DomainError> {
        let kb_id = parse_kb_id(kb_id)?;
        let entry_id = EntryId::new(entry_id)?;
        self.coordinator.remove_entry(kb_id, &entry_id).await?;
        Ok(())
    }

    /// Chunk content without storing or embedding anything
    pub async fn preview(&self, request: PreviewChunksRequest) -> Result<Vec<Chunk>, DomainError> {
        let options = request
            .options
            .map(|o| o.apply(self.default_options))
            .unwrap_or(self.default_options);

        let chunker = match (request.kind, request.knowledge_base_id) {
            (Some(kind), _) => self.coordinator.chunkers().create(kind),
            (None, Some(kb_id)) => self.coordinator.chunker_for(kb_id).await?,
            (None, None) => self.coordinator.chunkers().create(ChunkStrategyKind::FixedSize),
        };

        chunker.chunk_required(&request.content, &options)
    }

    async fn require_knowledge_base(&self, kb_id: &str) -> Result<KnowledgeBaseId, DomainError> {
        let kb_id = parse_kb_id(kb_id)?;

        if !self.coordinator.stores().knowledge_bases.exists(&kb_id).await? {
            return Err(DomainError::not_found(format!(
                "Knowledge base '{}' not found",
                kb_id
            )));
        }

        Ok(kb_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SimilarityQuery;
    use crate::infrastructure::id::SequentialIdGenerator;
    use crate::infrastructure::services::test_support::{coordinator, TestCoordinator};
    use serde_json::json;

    fn create_service(test: &TestCoordinator) -> EntryService {
        EntryService::new(
            Arc::clone(&test.coordinator),
            Arc::new(SequentialIdGenerator::new()),
            ChunkingOptions::new(4, 1),
        )
    }

    fn create_request(content: &str) -> CreateEntryRequest {
        CreateEntryRequest {
            content: content.to_string(),
            ..Default::default()
        }
    }

    fn metadata(value: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_indexes_entry() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);

        let created = service
            .create("1", create_request("  one two three four five six  "))
            .await
            .unwrap();

        assert_eq!(created.entry.id().as_str(), "entry_000001");
        assert_eq!(created.entry.content(), "one two three four five six");
        assert_eq!(created.entry.metadata().category(), "general");
        assert_eq!(created.report.chunk_count, 2);
        assert_eq!(
            test.coordinator.index().indexed_entries().await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_create_applies_option_overrides() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);

        let created = service
            .create(
                "1",
                CreateEntryRequest {
                    content: "one two three".to_string(),
                    metadata: None,
                    options: Some(ChunkingOptionsOverride {
                        chunk_size: Some(10),
                        chunk_overlap: None,
                    }),
                },
            )
            .await
            .unwrap();

        assert_eq!(*created.entry.options(), ChunkingOptions::new(10, 1));
        assert_eq!(created.report.chunk_count, 1);

        let err = service
            .create(
                "1",
                CreateEntryRequest {
                    content: "one two three".to_string(),
                    metadata: None,
                    options: Some(ChunkingOptionsOverride {
                        chunk_size: Some(2),
                        chunk_overlap: Some(2),
                    }),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_content_and_unknown_kb() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);

        let err = service.create("1", create_request("   ")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = service.create("2", create_request("hello")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_knowledge_base() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);
        let created = service.create("1", create_request("hello")).await.unwrap();

        let id = created.entry.id().as_str();
        assert!(service.get("1", id).await.is_ok());
        assert!(matches!(
            service.get("2", id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            service.get("1", "bogus").await.unwrap_err(),
            DomainError::Validation { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_collects_categories() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);

        for (content, category) in [
            ("JWT authentication guide", "Security"),
            ("Docker deployment", "DevOps"),
            ("Token refresh flow", "Security"),
        ] {
            service
                .create(
                    "1",
                    CreateEntryRequest {
                        content: content.to_string(),
                        metadata: Some(metadata(json!({"category": category}))),
                        options: None,
                    },
                )
                .await
                .unwrap();
        }

        let page = service
            .list("1", EntryFilter::default().with_category("Security"))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.categories, vec!["DevOps", "Security"]);

        let page = service
            .list("1", EntryFilter::default().with_search("docker"))
            .await
            .unwrap();
        assert_eq!(page.entries.len(), 1);

        assert!(service
            .list("1", EntryFilter::default().with_page(0, 0))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_metadata_update_merges_and_keeps_vectors() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);
        let created = service
            .create(
                "1",
                CreateEntryRequest {
                    content: "hello world".to_string(),
                    metadata: Some(metadata(json!({"category": "Guides", "source": "docs"}))),
                    options: None,
                },
            )
            .await
            .unwrap();
        let id = created.entry.id().as_str();

        let updated = service
            .update(
                "1",
                id,
                UpdateEntryRequest {
                    metadata: Some(metadata(json!({"tags": ["intro"]}))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.metadata().category(), "Guides");
        assert_eq!(updated.metadata().get("source"), Some(&json!("docs")));
        assert_eq!(updated.metadata().tags(), vec!["intro"]);

        let results = test
            .coordinator
            .query(&SimilarityQuery::new(KnowledgeBaseId::new(1), "hello world", 0.5, 1))
            .await
            .unwrap();
        assert_eq!(results[0].metadata.tags(), vec!["intro"]);
    }

    #[tokio::test]
    async fn test_content_update_reindexes() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);
        let created = service.create("1", create_request("hello world")).await.unwrap();
        let id = created.entry.id().as_str();

        let updated = service
            .update(
                "1",
                id,
                UpdateEntryRequest {
                    content: Some("rust ownership and borrowing".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content(), "rust ownership and borrowing");

        let results = test
            .coordinator
            .query(&SimilarityQuery::new(
                KnowledgeBaseId::new(1),
                "rust ownership and borrowing",
                0.9,
                1,
            ))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id.as_str(), id);
    }

    #[tokio::test]
    async fn test_update_of_deleted_entry_is_not_found() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);
        let created = service.create("1", create_request("hello world")).await.unwrap();
        let id = created.entry.id().as_str();

        service.delete("1", id).await.unwrap();
        let err = service
            .update(
                "1",
                id,
                UpdateEntryRequest {
                    content: Some("hello again".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(service.get("1", id).await.is_err());
        assert!(test
            .coordinator
            .index()
            .indexed_entries()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_metadata_updates_merge() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);
        let created = service.create("1", create_request("hello world")).await.unwrap();
        let id = created.entry.id().as_str();

        let tag = |value: Value| UpdateEntryRequest {
            metadata: Some(metadata(value)),
            ..Default::default()
        };
        let (first, second) = tokio::join!(
            service.update("1", id, tag(json!({"category": "Guides"}))),
            service.update("1", id, tag(json!({"source": "docs"}))),
        );
        first.unwrap();
        second.unwrap();

        let stored = service.get("1", id).await.unwrap();
        assert_eq!(stored.metadata().category(), "Guides");
        assert_eq!(stored.metadata().get("source"), Some(&json!("docs")));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_request() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);
        let created = service.create("1", create_request("hello")).await.unwrap();

        let err = service
            .update("1", created.entry.id().as_str(), UpdateEntryRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let test = coordinator(&[ChunkStrategyKind::FixedSize]).with_knowledge_base().await;
        let service = create_service(&test);
        let created = service.create("1", create_request("hello")).await.unwrap();
        let id = created.entry.id().as_str();

        service.delete("1", id).await.unwrap();

        assert!(service.get("1", id).await.is_err());
        assert!(test
            .coordinator
            .index()
            .indexed_entries()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_preview_uses_requested_kind() {
        let test = coordinator(&[ChunkStrategyKind::Paragraph]).with_knowledge_base().await;
        let service = create_service(&test);

        let chunks = service
            .preview(PreviewChunksRequest {
                content: "a b c d e f g".to_string(),
                kind: Some(ChunkStrategyKind::FixedSize),
                options: Some(ChunkingOptionsOverride {
                    chunk_size: Some(3),
                    chunk_overlap: Some(0),
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["a b c", "d e f", "g"]);

        let chunks = service
            .preview(PreviewChunksRequest {
                content: "first para\n\nsecond para".to_string(),
                knowledge_base_id: Some(KnowledgeBaseId::new(1)),
                options: Some(ChunkingOptionsOverride {
                    chunk_size: Some(2),
                    chunk_overlap: Some(0),
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(chunks.len(), 2);
    }
}
