//! Brute-force in-memory vector index

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::embedding::{similarity_score, Embedding};
use crate::domain::entry::EntryId;
use crate::domain::index::{validate_search_bounds, EntryVectors, IndexHit, VectorIndex};
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::DomainError;

type Partition = HashMap<EntryId, Arc<EntryVectors>>;

/// Vector index keeping every partition in memory and scanning it on search.
///
/// Each entry's vector set sits behind an `Arc` and is replaced, never mutated
/// in place, so a search works on a snapshot taken under a short read lock.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    dimensions: usize,
    partitions: RwLock<HashMap<KnowledgeBaseId, Partition>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            partitions: RwLock::new(HashMap::new()),
        }
    }

    fn check_vector(&self, vector: &Embedding) -> Result<(), DomainError> {
        if vector.dimensions() != self.dimensions {
            return Err(DomainError::validation(format!(
                "vector has {} dimensions, index expects {}",
                vector.dimensions(),
                self.dimensions
            )));
        }

        if !vector.is_finite() {
            return Err(DomainError::validation("vector contains non-finite values"));
        }

        Ok(())
    }

    async fn snapshot(&self, kb: KnowledgeBaseId) -> Vec<(EntryId, Arc<EntryVectors>)> {
        let partitions = self.partitions.read().await;
        partitions
            .get(&kb)
            .map(|partition| {
                partition
                    .iter()
                    .map(|(id, vectors)| (id.clone(), Arc::clone(vectors)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn insert(
        &self,
        kb: KnowledgeBaseId,
        entry: &EntryId,
        ordinal: usize,
        vector: Embedding,
    ) -> Result<(), DomainError> {
        self.check_vector(&vector)?;

        let mut partitions = self.partitions.write().await;
        let slot = partitions
            .entry(kb)
            .or_default()
            .entry(entry.clone())
            .or_default();
        Arc::make_mut(slot).insert(ordinal, vector);

        Ok(())
    }

    async fn evict(&self, kb: KnowledgeBaseId, entry: &EntryId) -> Result<usize, DomainError> {
        let mut partitions = self.partitions.write().await;
        let removed = partitions
            .get_mut(&kb)
            .and_then(|partition| partition.remove(entry))
            .map(|vectors| vectors.len())
            .unwrap_or(0);

        debug!(kb_id = %kb, entry_id = %entry, removed = removed, "Evicted entry vectors");
        Ok(removed)
    }

    async fn replace_entry(
        &self,
        kb: KnowledgeBaseId,
        entry: &EntryId,
        vectors: EntryVectors,
    ) -> Result<Option<EntryVectors>, DomainError> {
        for (_, vector) in vectors.iter() {
            self.check_vector(vector)?;
        }

        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(kb).or_default();

        let previous = if vectors.is_empty() {
            partition.remove(entry)
        } else {
            partition.insert(entry.clone(), Arc::new(vectors))
        };

        Ok(previous.map(Arc::unwrap_or_clone))
    }

    async fn evict_knowledge_base(&self, kb: KnowledgeBaseId) -> Result<usize, DomainError> {
        let removed = self
            .partitions
            .write()
            .await
            .remove(&kb)
            .map(|partition| partition.len())
            .unwrap_or(0);

        debug!(kb_id = %kb, entries = removed, "Evicted knowledge base partition");
        Ok(removed)
    }

    async fn search(
        &self,
        kb: KnowledgeBaseId,
        query: &Embedding,
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<IndexHit>, DomainError> {
        validate_search_bounds(threshold, limit)?;
        self.check_vector(query)?;

        let snapshot = self.snapshot(kb).await;

        let mut hits: Vec<IndexHit> = snapshot
            .iter()
            .flat_map(|(entry_id, vectors)| {
                vectors.iter().filter_map(move |(ordinal, vector)| {
                    let similarity = similarity_score(query.vector(), vector.vector());
                    (similarity >= threshold).then(|| IndexHit {
                        entry_id: entry_id.clone(),
                        ordinal,
                        similarity,
                    })
                })
            })
            .collect();

        hits.sort_by(IndexHit::rank);
        hits.truncate(limit);

        Ok(hits)
    }

    async fn indexed_entries(&self) -> Result<Vec<(KnowledgeBaseId, EntryId)>, DomainError> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .flat_map(|(kb, partition)| partition.keys().map(move |entry| (*kb, entry.clone())))
            .collect())
    }
}
