//! Record store trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::StorageEntity;

/// Keyed store for knowledge bases, strategies and entries.
///
/// There is no upsert: `create` never overwrites and `update` never creates.
/// A write that raced with a delete therefore fails instead of bringing the
/// record back.
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Insert a new record; [`DomainError::Conflict`] if the key is taken
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Replace a stored record; [`DomainError::NotFound`] if it is gone
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Returns whether a record was removed
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }

    /// Records accepted by `keep`, in store order
    async fn list_where(
        &self,
        keep: &(dyn for<'r> Fn(&'r E) -> bool + Sync),
    ) -> Result<Vec<E>, DomainError> {
        Ok(self.list().await?.into_iter().filter(|e| keep(e)).collect())
    }
}
