//! Entry write pipeline stages

use std::fmt;

use serde::Serialize;

use crate::domain::entry::EntryId;
use crate::domain::knowledge_base::KnowledgeBaseId;

/// Stage of an entry write; a failure carries the stage it was attempting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStage {
    Received,
    Chunked,
    Embedded,
    Indexed,
    Done,
}

impl WriteStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Chunked => "chunked",
            Self::Embedded => "embedded",
            Self::Indexed => "indexed",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a completed entry write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReport {
    pub entry_id: EntryId,
    pub knowledge_base_id: KnowledgeBaseId,
    pub stage: WriteStage,
    /// Chunks now indexed for the entry
    pub chunk_count: usize,
    /// Chunks the entry had indexed before the write
    pub replaced_chunks: usize,
}

/// Result of comparing index contents against stored entry records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub indexed_entries: usize,
    /// Index entries with no owning entry record, or filed under the wrong knowledge base
    pub orphaned: Vec<(KnowledgeBaseId, EntryId)>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.orphaned.is_empty()
    }
}
