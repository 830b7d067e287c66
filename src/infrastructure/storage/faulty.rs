//! In-memory store with injectable write failures and a parked read

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::InMemoryStorage;
use crate::domain::gate::Gate;
use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

#[derive(Debug)]
pub struct FaultyStorage<E>
where
    E: StorageEntity,
{
    inner: InMemoryStorage<E>,
    write_error: Option<String>,
    read_gate: Mutex<Option<Arc<Gate>>>,
}

impl<E> FaultyStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            inner: InMemoryStorage::new(),
            write_error: None,
            read_gate: Mutex::new(None),
        }
    }

    pub fn with_records(records: Vec<E>) -> Self {
        Self {
            inner: InMemoryStorage::with_entities(records),
            ..Self::new()
        }
    }

    /// Fail every create, update and delete
    pub fn with_write_error(mut self, error: impl Into<String>) -> Self {
        self.write_error = Some(error.into());
        self
    }

    /// The next `get` reads its value, then parks at `gate` before returning it
    pub fn with_read_gate(self, gate: Arc<Gate>) -> Self {
        *self.read_gate.lock().unwrap() = Some(gate);
        self
    }

    fn check_write(&self) -> Result<(), DomainError> {
        match &self.write_error {
            Some(error) => Err(DomainError::storage(error.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<E> Storage<E> for FaultyStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let value = self.inner.get(key).await?;
        let gate = self.read_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(value)
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        self.inner.list().await
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        self.check_write()?;
        self.inner.create(entity).await
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        self.check_write()?;
        self.inner.update(entity).await
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        self.check_write()?;
        self.inner.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunking::ChunkStrategyId;
    use crate::domain::knowledge_base::{KnowledgeBase, KnowledgeBaseId};

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(
            KnowledgeBaseId::new(1),
            "Docs",
            "Product documentation",
            ChunkStrategyId::new(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_write_error_fails_writes_only() {
        let storage: FaultyStorage<KnowledgeBase> = FaultyStorage::new().with_write_error("disk full");

        let err = storage.create(kb()).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(storage.get(&KnowledgeBaseId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_gate_returns_value_read_before_parking() {
        let gate = Arc::new(Gate::new());
        let storage: Arc<FaultyStorage<KnowledgeBase>> = Arc::new(FaultyStorage::new().with_read_gate(Arc::clone(&gate)));

        let read = tokio::spawn({
            let storage = Arc::clone(&storage);
            async move { storage.get(&KnowledgeBaseId::new(1)).await }
        });
        gate.reached().await;
        storage.create(kb()).await.unwrap();
        gate.release();

        assert!(read.await.unwrap().unwrap().is_none());
        assert!(storage.get(&KnowledgeBaseId::new(1)).await.unwrap().is_some());
    }
}
