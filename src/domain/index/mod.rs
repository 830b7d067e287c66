//! Vector index domain

mod vector_index;

pub use vector_index::{validate_search_bounds, EntryVectors, IndexHit, VectorIndex};
