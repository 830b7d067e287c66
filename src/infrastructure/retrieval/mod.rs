//! Retrieval coordination between the records, the chunkers, the embedder and the index

mod coordinator;
mod locks;

pub use coordinator::{RecordStores, RetrievalConfig, RetrievalCoordinator};
pub use locks::{KeyedLocks, MutexTable, RwLockTable};
