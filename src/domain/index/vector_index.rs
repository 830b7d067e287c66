//! Vector index trait definition

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::embedding::Embedding;
use crate::domain::entry::EntryId;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::DomainError;

/// The full vector set of one entry, keyed by chunk ordinal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryVectors {
    vectors: BTreeMap<usize, Embedding>,
}

impl EntryVectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ordinal: usize, vector: Embedding) -> Option<Embedding> {
        self.vectors.insert(ordinal, vector)
    }

    pub fn get(&self, ordinal: usize) -> Option<&Embedding> {
        self.vectors.get(&ordinal)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Embedding)> {
        self.vectors.iter().map(|(ordinal, vector)| (*ordinal, vector))
    }
}

impl FromIterator<Embedding> for EntryVectors {
    /// Assigns ordinals in iteration order
    fn from_iter<I: IntoIterator<Item = Embedding>>(iter: I) -> Self {
        Self {
            vectors: iter.into_iter().enumerate().collect(),
        }
    }
}

/// A chunk-level match returned by [`VectorIndex::search`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexHit {
    pub entry_id: EntryId,
    pub ordinal: usize,
    pub similarity: f32,
}

impl IndexHit {
    /// Ranking order: similarity descending, then entry ID and ordinal ascending
    pub fn rank(a: &IndexHit, b: &IndexHit) -> Ordering {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.entry_id.cmp(&b.entry_id))
            .then_with(|| a.ordinal.cmp(&b.ordinal))
    }
}

/// Validate search preconditions shared by the index and its callers
pub fn validate_search_bounds(threshold: f32, limit: usize) -> Result<(), DomainError> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(DomainError::validation(format!(
            "threshold must be between 0 and 1, got {}",
            threshold
        )));
    }

    if limit == 0 {
        return Err(DomainError::validation("limit must be at least 1"));
    }

    Ok(())
}

/// Store of chunk vectors partitioned by knowledge base
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Dimensionality every stored and query vector must have
    fn dimensions(&self) -> usize;

    /// Store a vector, overwriting the exact (kb, entry, ordinal) key
    async fn insert(
        &self,
        kb: KnowledgeBaseId,
        entry: &EntryId,
        ordinal: usize,
        vector: Embedding,
    ) -> Result<(), DomainError>;

    /// Remove every vector of an entry, returning how many were removed
    async fn evict(&self, kb: KnowledgeBaseId, entry: &EntryId) -> Result<usize, DomainError>;

    /// Swap an entry's whole vector set in one step, returning the previous set
    async fn replace_entry(
        &self,
        kb: KnowledgeBaseId,
        entry: &EntryId,
        vectors: EntryVectors,
    ) -> Result<Option<EntryVectors>, DomainError>;

    /// Drop a knowledge base partition, returning how many entries it held
    async fn evict_knowledge_base(&self, kb: KnowledgeBaseId) -> Result<usize, DomainError>;

    /// Chunk hits with similarity >= threshold, best first, at most `limit`
    async fn search(
        &self,
        kb: KnowledgeBaseId,
        query: &Embedding,
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<IndexHit>, DomainError>;

    /// Every (knowledge base, entry) pair holding vectors
    async fn indexed_entries(&self) -> Result<Vec<(KnowledgeBaseId, EntryId)>, DomainError>;

    /// Put back a vector set captured from [`VectorIndex::replace_entry`]
    async fn restore_entry(
        &self,
        kb: KnowledgeBaseId,
        entry: &EntryId,
        previous: Option<EntryVectors>,
    ) -> Result<(), DomainError> {
        match previous {
            Some(vectors) => self.replace_entry(kb, entry, vectors).await.map(|_| ()),
            None => self.evict(kb, entry).await.map(|_| ()),
        }
    }
}
