//! Per-key async locks

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, RwLock as AsyncRwLock};

/// Table handing out one shared lock per key.
///
/// Entries nobody holds are pruned whenever a new key is requested.
pub struct KeyedLocks<K, L> {
    locks: Mutex<HashMap<K, Arc<L>>>,
}

impl<K, L> fmt::Debug for KeyedLocks<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedLocks").finish_non_exhaustive()
    }
}

impl<K, L> Default for KeyedLocks<K, L> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, L> KeyedLocks<K, L>
where
    K: Eq + Hash + Clone,
    L: Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `key`, created on first use
    pub fn get(&self, key: &K) -> Arc<L> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(lock) = locks.get(key) {
            return Arc::clone(lock);
        }

        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serializes writers of one key
pub type MutexTable<K> = KeyedLocks<K, AsyncMutex<()>>;

/// Shared/exclusive access per key
pub type RwLockTable<K> = KeyedLocks<K, AsyncRwLock<()>>;
