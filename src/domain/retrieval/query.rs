//! Similarity query and result types

use serde::Serialize;

use crate::domain::entry::{EntryId, EntryMetadata};
use crate::domain::index::validate_search_bounds;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::DomainError;

/// A ranked similarity search within one knowledge base
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityQuery {
    pub knowledge_base_id: KnowledgeBaseId,
    pub prompt: String,
    /// Minimum similarity, in [0, 1]
    pub threshold: f32,
    /// Maximum number of entries returned
    pub limit: usize,
}

impl SimilarityQuery {
    pub fn new(
        knowledge_base_id: KnowledgeBaseId,
        prompt: impl Into<String>,
        threshold: f32,
        limit: usize,
    ) -> Self {
        Self {
            knowledge_base_id,
            prompt: prompt.into(),
            threshold,
            limit,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.prompt.trim().is_empty() {
            return Err(DomainError::validation("prompt cannot be empty"));
        }

        validate_search_bounds(self.threshold, self.limit)
    }
}

/// One entry matched by a similarity query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    pub id: EntryId,
    pub content: String,
    /// Ordinal of the best-matching chunk
    pub chunk_ordinal: usize,
    pub metadata: EntryMetadata,
    pub similarity: f32,
}
