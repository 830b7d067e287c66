//! Storage domain - Generic record storage abstraction

mod entity;
mod repository;

pub use entity::{StorageEntity, StorageKey};
pub use repository::Storage;
