//! Knowledge base domain

mod entity;
mod validation;

pub use entity::{KnowledgeBase, KnowledgeBaseId};
pub use validation::{
    parse_knowledge_base_id, validate_description, validate_name, KnowledgeBaseValidationError,
    DESCRIPTION_LENGTH, NAME_LENGTH,
};
