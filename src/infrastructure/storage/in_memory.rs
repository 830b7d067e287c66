//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Thread-safe in-memory record storage
///
/// Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    /// Creates storage pre-populated with entities
    pub fn with_entities(entities: Vec<E>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.key().storage_key(), entity))
            .collect();

        Self {
            entities: RwLock::new(map),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, E>>, DomainError> {
        self.entities
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, E>>, DomainError> {
        self.entities
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self.read()?.get(&key.storage_key()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().storage_key();
        let mut entities = self.write()?;

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().storage_key();
        let mut entities = self.write()?;

        if !entities.contains_key(&key) {
            return Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.write()?.remove(&key.storage_key()).is_some())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.read()?.contains_key(&key.storage_key()))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunking::ChunkStrategyId;
    use crate::domain::knowledge_base::{KnowledgeBase, KnowledgeBaseId};

    fn kb(id: u64, name: &str) -> KnowledgeBase {
        KnowledgeBase::new(
            KnowledgeBaseId::new(id),
            name,
            "A knowledge base used in tests",
            ChunkStrategyId::new(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage = InMemoryStorage::new();
        storage.create(kb(1, "First")).await.unwrap();

        let found = storage.get(&KnowledgeBaseId::new(1)).await.unwrap();
        assert_eq!(found.unwrap().name(), "First");
        assert!(storage.get(&KnowledgeBaseId::new(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let storage = InMemoryStorage::new();
        storage.create(kb(1, "First")).await.unwrap();

        let result = storage.create(kb(1, "Again")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let storage: InMemoryStorage<KnowledgeBase> = InMemoryStorage::new();
        let result = storage.update(kb(9, "Missing")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_after_delete_does_not_recreate() {
        let storage = InMemoryStorage::with_entities(vec![kb(1, "First")]);
        let stale = storage.get(&KnowledgeBaseId::new(1)).await.unwrap().unwrap();

        assert!(storage.delete(&KnowledgeBaseId::new(1)).await.unwrap());
        let result = storage.update(stale).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_where_filters() {
        let storage = InMemoryStorage::with_entities(vec![kb(1, "First"), kb(2, "Second")]);

        let found = storage
            .list_where(&|kb: &KnowledgeBase| kb.name().starts_with('S'))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), KnowledgeBaseId::new(2));
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let storage = InMemoryStorage::with_entities(vec![kb(1, "First"), kb(2, "Second")]);

        assert!(storage.delete(&KnowledgeBaseId::new(1)).await.unwrap());
        assert!(!storage.delete(&KnowledgeBaseId::new(1)).await.unwrap());
        assert!(!storage.exists(&KnowledgeBaseId::new(1)).await.unwrap());
        assert!(storage.exists(&KnowledgeBaseId::new(2)).await.unwrap());
        assert_eq!(storage.list().await.unwrap().len(), 1);
    }
}
