//! Retrieval coordinator - chunk, embed and index on write; embed, search and rank on read

use std::collections::HashSet;
use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use tokio::sync::{OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard};
use tracing::{debug, error, info, warn};

use super::locks::{MutexTable, RwLockTable};
use crate::domain::chunking::{ChunkStrategy, ChunkStrategyId, ChunkingStrategy};
use crate::domain::embedding::{Embedding, EmbeddingProvider};
use crate::domain::entry::{Entry, EntryId};
use crate::domain::index::{EntryVectors, IndexHit, VectorIndex};
use crate::domain::knowledge_base::{KnowledgeBase, KnowledgeBaseId};
use crate::domain::retrieval::{
    ConsistencyReport, RetryConfig, SimilarityQuery, SimilarityResult, WriteReport, WriteStage,
};
use crate::domain::storage::Storage;
use crate::domain::DomainError;
use crate::infrastructure::chunking::ChunkerFactory;

/// Tuning knobs for the coordinator
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Chunk hits fetched per requested result before deduplicating by entry
    pub candidate_multiplier: usize,
    /// Chunks of one entry embedded concurrently
    pub embedding_concurrency: usize,
    pub retry: RetryConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_multiplier: 4,
            embedding_concurrency: 4,
            retry: RetryConfig::default(),
        }
    }
}

/// Record stores the coordinator reads and writes
#[derive(Debug, Clone)]
pub struct RecordStores {
    pub knowledge_bases: Arc<dyn Storage<KnowledgeBase>>,
    pub strategies: Arc<dyn Storage<ChunkStrategy>>,
    pub entries: Arc<dyn Storage<Entry>>,
}

/// Locks kept alive until a spawned commit finishes
#[derive(Default)]
struct CommitGuards {
    _knowledge_base: Option<OwnedRwLockReadGuard<()>>,
    _entry: Option<OwnedMutexGuard<()>>,
}

/// How the entry record is written once its vectors are swapped in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Commit {
    /// New entry; fails if the id is taken
    Create,
    /// Existing entry; fails if it was deleted meanwhile
    Update,
}

/// Owns every mutation of the vector index and keeps it in step with entry records.
///
/// Writes to one entry are serialized by a per-entry mutex. Writers of a
/// knowledge base share its read/write lock, which knowledge base deletion and
/// strategy changes take exclusively. The index swap and record persistence run
/// in a spawned task, so dropping the caller's future never interrupts them.
#[derive(Debug)]
pub struct RetrievalCoordinator {
    stores: RecordStores,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunkers: ChunkerFactory,
    config: RetrievalConfig,
    kb_locks: RwLockTable<KnowledgeBaseId>,
    entry_locks: MutexTable<(KnowledgeBaseId, EntryId)>,
}

impl RetrievalCoordinator {
    pub fn new(
        stores: RecordStores,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunkers: ChunkerFactory,
        config: RetrievalConfig,
    ) -> Result<Self, DomainError> {
        if embedder.dimensions() != index.dimensions() {
            return Err(DomainError::configuration(format!(
                "embedding provider '{}' produces {} dimensions but the index expects {}",
                embedder.provider_name(),
                embedder.dimensions(),
                index.dimensions()
            )));
        }

        Ok(Self {
            stores,
            index,
            embedder,
            chunkers,
            config,
            kb_locks: RwLockTable::new(),
            entry_locks: MutexTable::new(),
        })
    }

    pub fn stores(&self) -> &RecordStores {
        &self.stores
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn chunkers(&self) -> &ChunkerFactory {
        &self.chunkers
    }

    pub fn embedding_provider_name(&self) -> &'static str {
        self.embedder.provider_name()
    }

    /// Chunk, embed and index a new entry, then create its record.
    ///
    /// Fails with [`DomainError::WriteFailed`] naming the stage that failed.
    /// Nothing is visible to readers unless every chunk was embedded.
    pub async fn process_write(&self, entry: Entry) -> Result<WriteReport, DomainError> {
        let kb_id = entry.knowledge_base_id();
        let entry_id = entry.id().clone();
        debug!(kb_id = %kb_id, entry_id = %entry_id, stage = %WriteStage::Received, "Entry write received");

        if entry.content().trim().is_empty() {
            return Err(DomainError::write_failed(
                WriteStage::Received,
                DomainError::validation("content cannot be empty"),
            ));
        }

        let kb_guard = self.kb_locks.get(&kb_id).read_owned().await;
        let chunker = self
            .chunker_for(kb_id)
            .await
            .map_err(|e| DomainError::write_failed(WriteStage::Received, e))?;
        let entry_guard = self
            .entry_locks
            .get(&(kb_id, entry_id.clone()))
            .lock_owned()
            .await;

        if self.stores.entries.exists(&entry_id).await? {
            return Err(DomainError::write_failed(
                WriteStage::Received,
                DomainError::conflict(format!("Entry '{}' already exists", entry_id)),
            ));
        }

        let guards = CommitGuards {
            _knowledge_base: Some(kb_guard),
            _entry: Some(entry_guard),
        };

        self.write_locked(entry, chunker.as_ref(), guards, Commit::Create)
            .await
    }

    /// Read, edit and write back an entry while holding its lock.
    ///
    /// With `reindex` the edited entry is re-chunked and re-embedded before
    /// its record is replaced; otherwise only the record changes. An entry
    /// deleted before the lock was taken yields [`DomainError::NotFound`].
    pub async fn update_entry<F>(
        &self,
        kb_id: KnowledgeBaseId,
        entry_id: &EntryId,
        reindex: bool,
        edit: F,
    ) -> Result<Entry, DomainError>
    where
        F: FnOnce(&mut Entry) -> Result<(), DomainError> + Send,
    {
        let kb_guard = self.kb_locks.get(&kb_id).read_owned().await;
        self.require_knowledge_base(kb_id).await?;
        let entry_guard = self
            .entry_locks
            .get(&(kb_id, entry_id.clone()))
            .lock_owned()
            .await;

        let mut entry = self.require_entry(kb_id, entry_id).await?;
        edit(&mut entry)?;

        if !reindex {
            debug!(kb_id = %kb_id, entry_id = %entry_id, "Record-only update, keeping vectors");
            return self.stores.entries.update(entry).await;
        }

        let chunker = self.chunker_for(kb_id).await?;
        let guards = CommitGuards {
            _knowledge_base: Some(kb_guard),
            _entry: Some(entry_guard),
        };
        self.write_locked(entry.clone(), chunker.as_ref(), guards, Commit::Update)
            .await?;
        Ok(entry)
    }

    /// Similarity search returning at most `limit` distinct entries, best first
    pub async fn query(&self, query: &SimilarityQuery) -> Result<Vec<SimilarityResult>, DomainError> {
        query.validate()?;
        let kb_id = query.knowledge_base_id;
        self.require_knowledge_base(kb_id).await?;

        let query_vector = self.embed(&query.prompt).await?;

        let mut pool = query
            .limit
            .saturating_mul(self.config.candidate_multiplier.max(1));
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        // Hits that resolve to no live entry leave slots open, so widen until full
        loop {
            let hits = self
                .index
                .search(kb_id, &query_vector, query.threshold, pool)
                .await?;
            let exhausted = hits.len() < pool;

            for hit in best_hit_per_entry(hits) {
                if results.len() == query.limit {
                    break;
                }
                if !seen.insert(hit.entry_id.clone()) {
                    continue;
                }

                let entry = match self.stores.entries.get(&hit.entry_id).await? {
                    Some(entry) if entry.knowledge_base_id() == kb_id => Some(entry),
                    _ => self.handle_orphan(kb_id, &hit.entry_id).await,
                };
                if let Some(entry) = entry {
                    results.push(SimilarityResult {
                        content: entry.content().to_string(),
                        metadata: entry.metadata().clone(),
                        id: hit.entry_id,
                        chunk_ordinal: hit.ordinal,
                        similarity: hit.similarity,
                    });
                }
            }

            if exhausted || results.len() == query.limit {
                break;
            }
            debug!(kb_id = %kb_id, pool = pool, found = results.len(), "Expanding candidate pool");
            pool = pool.saturating_mul(2);
        }

        info!(
            kb_id = %kb_id,
            threshold = query.threshold,
            limit = query.limit,
            results = results.len(),
            "Similarity query completed"
        );
        Ok(results)
    }

    /// Evict an entry's vectors and delete its record
    pub async fn remove_entry(
        &self,
        kb_id: KnowledgeBaseId,
        entry_id: &EntryId,
    ) -> Result<Entry, DomainError> {
        let kb_guard = self.kb_locks.get(&kb_id).read_owned().await;
        self.require_knowledge_base(kb_id).await?;
        let entry_guard = self
            .entry_locks
            .get(&(kb_id, entry_id.clone()))
            .lock_owned()
            .await;

        let entry = self.require_entry(kb_id, entry_id).await?;

        let index = Arc::clone(&self.index);
        let entries = Arc::clone(&self.stores.entries);
        let entry_id = entry_id.clone();
        let guards = CommitGuards {
            _knowledge_base: Some(kb_guard),
            _entry: Some(entry_guard),
        };

        run_to_completion(async move {
            let _guards = guards;
            let evicted = index.evict(kb_id, &entry_id).await?;
            entries.delete(&entry_id).await?;
            info!(kb_id = %kb_id, entry_id = %entry_id, evicted = evicted, "Entry removed");
            Ok(())
        })
        .await?;

        Ok(entry)
    }

    /// Delete a knowledge base with all of its entries and vectors
    pub async fn remove_knowledge_base(&self, kb_id: KnowledgeBaseId) -> Result<(), DomainError> {
        let lock = self.kb_locks.get(&kb_id);
        let kb_guard = lock.write_owned().await;
        self.require_knowledge_base(kb_id).await?;

        let index = Arc::clone(&self.index);
        let stores = self.stores.clone();

        run_to_completion(async move {
            let _guard = kb_guard;
            let evicted = index.evict_knowledge_base(kb_id).await?;

            let mut removed = 0;
            for entry in entries_of(stores.entries.as_ref(), kb_id).await? {
                if stores.entries.delete(entry.id()).await? {
                    removed += 1;
                }
            }

            stores.knowledge_bases.delete(&kb_id).await?;
            info!(
                kb_id = %kb_id,
                entries = removed,
                indexed_entries = evicted,
                "Knowledge base removed"
            );
            Ok(())
        })
        .await
    }

    /// Re-chunk and re-embed every entry of a knowledge base with its current strategy
    pub async fn reindex_knowledge_base(&self, kb_id: KnowledgeBaseId) -> Result<usize, DomainError> {
        let kb_guard = self.kb_locks.get(&kb_id).write_owned().await;
        let kb = self.require_knowledge_base(kb_id).await?;
        let chunker = self.chunker_for_strategy(kb.chunking_strategy_id()).await?;

        self.rebuild_locked(kb_id, chunker.as_ref(), kb_guard, None)
            .await
    }

    /// Read, edit and write back a knowledge base record under its exclusive lock.
    ///
    /// When the edit switches the chunking strategy, every entry is re-embedded
    /// with the new strategy first; the vector sets and the record then change
    /// together, or not at all. Returns the stored record and, for a strategy
    /// change, how many entries were re-indexed.
    pub async fn update_knowledge_base<F>(
        &self,
        kb_id: KnowledgeBaseId,
        edit: F,
    ) -> Result<(KnowledgeBase, Option<usize>), DomainError>
    where
        F: FnOnce(&mut KnowledgeBase) -> Result<(), DomainError> + Send,
    {
        let kb_guard = self.kb_locks.get(&kb_id).write_owned().await;
        let mut kb = self.require_knowledge_base(kb_id).await?;
        let previous_strategy = kb.chunking_strategy_id();
        edit(&mut kb)?;

        if kb.chunking_strategy_id() == previous_strategy {
            let kb = self.stores.knowledge_bases.update(kb).await?;
            return Ok((kb, None));
        }

        let chunker = self.chunker_for_strategy(kb.chunking_strategy_id()).await?;
        let reindexed = self
            .rebuild_locked(kb_id, chunker.as_ref(), kb_guard, Some(kb.clone()))
            .await?;

        info!(
            kb_id = %kb_id,
            from = %previous_strategy,
            to = %kb.chunking_strategy_id(),
            entries = reindexed,
            "Chunking strategy changed"
        );
        Ok((kb, Some(reindexed)))
    }

    /// Index entries with no owning entry record
    pub async fn audit(&self) -> Result<ConsistencyReport, DomainError> {
        let indexed = self.index.indexed_entries().await?;
        let mut report = ConsistencyReport {
            indexed_entries: indexed.len(),
            orphaned: Vec::new(),
        };

        for (kb_id, entry_id) in indexed {
            let lock = self.entry_locks.get(&(kb_id, entry_id.clone()));
            let Ok(_guard) = lock.try_lock() else {
                continue;
            };

            let owned = self
                .stores
                .entries
                .get(&entry_id)
                .await?
                .is_some_and(|entry| entry.knowledge_base_id() == kb_id);

            if !owned {
                report.orphaned.push((kb_id, entry_id));
            }
        }

        if !report.is_consistent() {
            warn!(orphaned = report.orphaned.len(), "Vector index holds orphaned entries");
        }
        Ok(report)
    }

    /// Chunker configured for a knowledge base's strategy
    pub async fn chunker_for(
        &self,
        kb_id: KnowledgeBaseId,
    ) -> Result<Arc<dyn ChunkingStrategy>, DomainError> {
        let kb = self.require_knowledge_base(kb_id).await?;
        self.chunker_for_strategy(kb.chunking_strategy_id()).await
    }

    async fn chunker_for_strategy(
        &self,
        strategy_id: ChunkStrategyId,
    ) -> Result<Arc<dyn ChunkingStrategy>, DomainError> {
        let strategy = self.stores.strategies.get(&strategy_id).await?.ok_or_else(|| {
            DomainError::not_found(format!("Chunking strategy '{}' not found", strategy_id))
        })?;

        Ok(self.chunkers.create(strategy.kind()))
    }

    async fn require_knowledge_base(
        &self,
        kb_id: KnowledgeBaseId,
    ) -> Result<KnowledgeBase, DomainError> {
        self.stores
            .knowledge_bases
            .get(&kb_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Knowledge base '{}' not found", kb_id)))
    }

    async fn require_entry(
        &self,
        kb_id: KnowledgeBaseId,
        entry_id: &EntryId,
    ) -> Result<Entry, DomainError> {
        self.stores
            .entries
            .get(entry_id)
            .await?
            .filter(|entry| entry.knowledge_base_id() == kb_id)
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Entry '{}' not found in knowledge base '{}'",
                    entry_id, kb_id
                ))
            })
    }

    /// Chunk and embed an entry without touching the index
    async fn stage_vectors(
        &self,
        entry: &Entry,
        chunker: &dyn ChunkingStrategy,
    ) -> Result<EntryVectors, DomainError> {
        let kb_id = entry.knowledge_base_id();
        let entry_id = entry.id();

        let chunks = chunker
            .chunk_required(entry.content(), entry.options())
            .map_err(|e| DomainError::write_failed(WriteStage::Chunked, e))?;
        debug!(
            kb_id = %kb_id,
            entry_id = %entry_id,
            stage = %WriteStage::Chunked,
            chunks = chunks.len(),
            strategy = chunker.name(),
            "Entry chunked"
        );

        let vectors: EntryVectors = stream::iter(chunks.iter())
            .map(|chunk| self.embed(&chunk.content))
            .buffered(self.config.embedding_concurrency.max(1))
            .boxed()
            .try_collect::<Vec<Embedding>>()
            .await
            .map_err(|e| {
                warn!(kb_id = %kb_id, entry_id = %entry_id, error = %e, "Embedding failed, index untouched");
                DomainError::write_failed(WriteStage::Embedded, e)
            })?
            .into_iter()
            .collect();
        debug!(kb_id = %kb_id, entry_id = %entry_id, stage = %WriteStage::Embedded, "Entry embedded");

        Ok(vectors)
    }

    /// Stage an entry's vectors, then swap them in and write its record,
    /// with the caller already holding the entry's locks
    async fn write_locked(
        &self,
        entry: Entry,
        chunker: &dyn ChunkingStrategy,
        guards: CommitGuards,
        commit: Commit,
    ) -> Result<WriteReport, DomainError> {
        let kb_id = entry.knowledge_base_id();
        let entry_id = entry.id().clone();
        let vectors = self.stage_vectors(&entry, chunker).await?;

        let chunk_count = vectors.len();
        let index = Arc::clone(&self.index);
        let entries = Arc::clone(&self.stores.entries);
        let commit_id = entry_id.clone();

        let replaced_chunks = run_to_completion(async move {
            let _guards = guards;
            let previous = index.replace_entry(kb_id, &commit_id, vectors).await?;
            let replaced = previous.as_ref().map(EntryVectors::len).unwrap_or(0);

            let written = match commit {
                Commit::Create => entries.create(entry).await,
                Commit::Update => entries.update(entry).await,
            };
            if let Err(e) = written {
                if let Err(restore_error) = index.restore_entry(kb_id, &commit_id, previous).await {
                    error!(
                        kb_id = %kb_id,
                        entry_id = %commit_id,
                        error = %restore_error,
                        "Failed to restore previous vectors after record write failure"
                    );
                }
                return Err(e);
            }

            Ok(replaced)
        })
        .await
        .map_err(|e| DomainError::write_failed(WriteStage::Indexed, e))?;

        info!(
            kb_id = %kb_id,
            entry_id = %entry_id,
            stage = %WriteStage::Done,
            chunks = chunk_count,
            replaced = replaced_chunks,
            "Entry indexed"
        );

        Ok(WriteReport {
            entry_id,
            knowledge_base_id: kb_id,
            stage: WriteStage::Done,
            chunk_count,
            replaced_chunks,
        })
    }

    /// Re-embed every entry of a knowledge base into staging, then swap all
    /// vector sets and persist `record` in one commit.
    ///
    /// Any failure before the commit leaves the index untouched; a failed
    /// commit puts every swapped vector set back.
    async fn rebuild_locked(
        &self,
        kb_id: KnowledgeBaseId,
        chunker: &dyn ChunkingStrategy,
        kb_guard: OwnedRwLockWriteGuard<()>,
        record: Option<KnowledgeBase>,
    ) -> Result<usize, DomainError> {
        let mut entries = entries_of(self.stores.entries.as_ref(), kb_id).await?;
        entries.sort_by(|a, b| a.id().cmp(b.id()));

        let mut staged = Vec::with_capacity(entries.len());
        for entry in &entries {
            staged.push((entry.id().clone(), self.stage_vectors(entry, chunker).await?));
        }

        let total = staged.len();
        let index = Arc::clone(&self.index);
        let knowledge_bases = Arc::clone(&self.stores.knowledge_bases);

        run_to_completion(async move {
            let _guard = kb_guard;
            let mut swapped = Vec::with_capacity(staged.len());
            let mut outcome = Ok(());

            for (entry_id, vectors) in staged {
                match index.replace_entry(kb_id, &entry_id, vectors).await {
                    Ok(previous) => swapped.push((entry_id, previous)),
                    Err(e) => {
                        outcome = Err(e);
                        break;
                    }
                }
            }

            if let Some(record) = record.filter(|_| outcome.is_ok()) {
                outcome = knowledge_bases.update(record).await.map(|_| ());
            }

            if let Err(e) = outcome {
                for (entry_id, previous) in swapped.into_iter().rev() {
                    if let Err(restore_error) = index.restore_entry(kb_id, &entry_id, previous).await {
                        error!(
                            kb_id = %kb_id,
                            entry_id = %entry_id,
                            error = %restore_error,
                            "Failed to restore vectors after re-index failure"
                        );
                    }
                }
                return Err(e);
            }

            Ok(())
        })
        .await
        .map_err(|e| DomainError::write_failed(WriteStage::Indexed, e))?;

        info!(kb_id = %kb_id, entries = total, strategy = chunker.name(), "Knowledge base re-indexed");
        Ok(total)
    }

    /// Embed text, retrying transient provider failures
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let embedding = self
            .config
            .retry
            .run("embed", || self.embedder.embed(text))
            .await?;

        if embedding.dimensions() != self.index.dimensions() || !embedding.is_finite() {
            return Err(DomainError::provider(
                self.embedder.provider_name(),
                format!(
                    "returned an invalid vector ({} dimensions, expected {})",
                    embedding.dimensions(),
                    self.index.dimensions()
                ),
            ));
        }

        Ok(embedding)
    }

    /// Resolve a hit whose record was missing when first read.
    ///
    /// Skipped while a write to the entry is in flight. Under the entry lock the
    /// record is read again: a commit that landed in between returns the entry,
    /// otherwise the vectors are orphaned and get evicted.
    async fn handle_orphan(&self, kb_id: KnowledgeBaseId, entry_id: &EntryId) -> Option<Entry> {
        let lock = self.entry_locks.get(&(kb_id, entry_id.clone()));
        let Ok(_guard) = lock.try_lock() else {
            debug!(kb_id = %kb_id, entry_id = %entry_id, "Skipping hit for entry being written");
            return None;
        };

        match self.stores.entries.get(entry_id).await {
            Ok(Some(entry)) if entry.knowledge_base_id() == kb_id => {
                debug!(kb_id = %kb_id, entry_id = %entry_id, "Entry committed while its hit was resolved");
                return Some(entry);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(kb_id = %kb_id, entry_id = %entry_id, error = %e, "Failed to re-read entry record");
                return None;
            }
        }

        let consistency = DomainError::index_consistency(format!(
            "vectors for entry '{}' in knowledge base '{}' have no entry record",
            entry_id, kb_id
        ));
        error!(kb_id = %kb_id, entry_id = %entry_id, error = %consistency, "Evicting orphaned vectors");

        if let Err(e) = self.index.evict(kb_id, entry_id).await {
            error!(kb_id = %kb_id, entry_id = %entry_id, error = %e, "Failed to evict orphaned vectors");
        }
        None
    }
}

/// Keep the first (best) hit of every entry; input must be rank-ordered
fn best_hit_per_entry(hits: Vec<IndexHit>) -> Vec<IndexHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.entry_id.clone()))
        .collect()
}

async fn entries_of(
    entries: &dyn Storage<Entry>,
    kb_id: KnowledgeBaseId,
) -> Result<Vec<Entry>, DomainError> {
    entries
        .list_where(&move |entry: &Entry| entry.knowledge_base_id() == kb_id)
        .await
}

/// Run a commit on its own task so cancelling the caller cannot interrupt it
async fn run_to_completion<T, F>(commit: F) -> Result<T, DomainError>
where
    T: Send + 'static,
    F: std::future::Future<Output = Result<T, DomainError>> + Send + 'static,
{
    tokio::spawn(commit)
        .await
        .map_err(|e| DomainError::internal(format!("Commit task failed: {}", e)))?
}
