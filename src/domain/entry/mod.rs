//! Knowledge base entries

mod entity;
mod filter;
mod validation;

pub use entity::{Entry, EntryId, EntryMetadata, DEFAULT_CATEGORY};
pub use filter::{EntryFilter, EntryPage, Pagination, DEFAULT_PAGE_LIMIT};
pub use validation::{validate_content, validate_entry_id, ENTRY_ID_PREFIX};
