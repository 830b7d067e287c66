//! Chunking strategy implementations

mod fixed_size;
mod paragraph;
mod semantic;
mod sentence;
mod sliding_window;

pub use fixed_size::FixedSizeChunker;
pub use paragraph::ParagraphChunker;
pub use semantic::{BoundaryDetector, SemanticChunker};
pub use sentence::SentenceChunker;
pub use sliding_window::SlidingWindowChunker;
