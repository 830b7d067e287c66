use std::fmt::Debug;

/// Source of fresh identifiers, injected so tests can use predictable IDs
pub trait IdGenerator<T>: Send + Sync + Debug {
    fn next_id(&self) -> T;
}
