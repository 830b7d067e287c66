//! Storage infrastructure - Storage implementations

mod in_memory;

pub use in_memory::InMemoryStorage;

#[cfg(test)]
mod faulty;

#[cfg(test)]
pub use faulty::FaultyStorage;
