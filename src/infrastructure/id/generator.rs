//! Identifier generators

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::domain::chunking::ChunkStrategyId;
use crate::domain::entry::EntryId;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::traits::IdGenerator;

/// Monotonic counter starting at 1
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    fn advance(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator<KnowledgeBaseId> for SequentialIdGenerator {
    fn next_id(&self) -> KnowledgeBaseId {
        KnowledgeBaseId::new(self.advance())
    }
}

impl IdGenerator<ChunkStrategyId> for SequentialIdGenerator {
    fn next_id(&self) -> ChunkStrategyId {
        ChunkStrategyId::new(self.advance())
    }
}

impl IdGenerator<EntryId> for SequentialIdGenerator {
    fn next_id(&self) -> EntryId {
        EntryId::from_token(&format!("{:06}", self.advance()))
    }
}

/// Random `entry_<uuid hex>` identifiers
#[derive(Debug, Default)]
pub struct UuidEntryIdGenerator;

impl IdGenerator<EntryId> for UuidEntryIdGenerator {
    fn next_id(&self) -> EntryId {
        EntryId::from_token(&Uuid::new_v4().simple().to_string())
    }
}
