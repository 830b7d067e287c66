//! Storage entity traits

use std::fmt::Debug;

/// Trait for types that can be used as storage keys
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// Returns the key rendered as the string used by storage backends
    fn storage_key(&self) -> String;
}

/// Trait for records that can be stored
pub trait StorageEntity: Clone + Debug + Send + Sync {
    /// The key type for this entity
    type Key: StorageKey;

    /// Returns the entity's key
    fn key(&self) -> &Self::Key;
}
