//! Identifier generation

mod generator;

pub use generator::{SequentialIdGenerator, UuidEntryIdGenerator};
