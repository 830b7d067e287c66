//! Knowledge base validation utilities

use std::fmt;

use crate::domain::DomainError;

/// Allowed length range for knowledge base names, in characters
pub const NAME_LENGTH: (usize, usize) = (3, 100);

/// Allowed length range for knowledge base descriptions, in characters
pub const DESCRIPTION_LENGTH: (usize, usize) = (10, 500);

/// Knowledge base validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeBaseValidationError {
    /// Name outside the allowed length range
    InvalidNameLength { length: usize, min: usize, max: usize },
    /// Description outside the allowed length range
    InvalidDescriptionLength { length: usize, min: usize, max: usize },
    /// Identifier is not a positive integer
    InvalidId { value: String },
    /// Update carried no changes
    EmptyUpdate,
}

impl fmt::Display for KnowledgeBaseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNameLength { length, min, max } => write!(
                f,
                "Invalid name length {}: must be between {} and {} characters",
                length, min, max
            ),
            Self::InvalidDescriptionLength { length, min, max } => write!(
                f,
                "Invalid description length {}: must be between {} and {} characters",
                length, min, max
            ),
            Self::InvalidId { value } => {
                write!(f, "Invalid knowledge base ID '{}': must be a positive integer", value)
            }
            Self::EmptyUpdate => write!(
                f,
                "At least one of name, description or chunkingStrategyId is required"
            ),
        }
    }
}

impl std::error::Error for KnowledgeBaseValidationError {}

impl From<KnowledgeBaseValidationError> for DomainError {
    fn from(error: KnowledgeBaseValidationError) -> Self {
        DomainError::validation(error.to_string())
    }
}

/// Validate a knowledge base name, returning the trimmed value
pub fn validate_name(name: &str) -> Result<String, KnowledgeBaseValidationError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();
    let (min, max) = NAME_LENGTH;

    if !(min..=max).contains(&length) {
        return Err(KnowledgeBaseValidationError::InvalidNameLength { length, min, max });
    }

    Ok(trimmed.to_string())
}

/// Validate a knowledge base description, returning the trimmed value
pub fn validate_description(description: &str) -> Result<String, KnowledgeBaseValidationError> {
    let trimmed = description.trim();
    let length = trimmed.chars().count();
    let (min, max) = DESCRIPTION_LENGTH;

    if !(min..=max).contains(&length) {
        return Err(KnowledgeBaseValidationError::InvalidDescriptionLength { length, min, max });
    }

    Ok(trimmed.to_string())
}

/// Parse a knowledge base ID from a path or body value
pub fn parse_knowledge_base_id(value: &str) -> Result<u64, KnowledgeBaseValidationError> {
    match value.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(KnowledgeBaseValidationError::InvalidId {
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert_eq!(validate_name("  Docs  ").unwrap(), "Docs");
        assert!(validate_name("ab").is_err());
        assert!(validate_name("   abc   ").is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
        assert!(validate_name(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_description_validation() {
        assert!(validate_description("too short").is_err());
        assert_eq!(
            validate_description(" Product manuals ").unwrap(),
            "Product manuals"
        );
        assert!(matches!(
            validate_description(&"d".repeat(501)),
            Err(KnowledgeBaseValidationError::InvalidDescriptionLength { length: 501, .. })
        ));
    }

    #[test]
    fn test_parse_knowledge_base_id() {
        assert_eq!(parse_knowledge_base_id("42").unwrap(), 42);
        assert!(parse_knowledge_base_id("0").is_err());
        assert!(parse_knowledge_base_id("-1").is_err());
        assert!(parse_knowledge_base_id("kb").is_err());
    }

    #[test]
    fn test_converts_into_domain_validation_error() {
        let error: DomainError = KnowledgeBaseValidationError::EmptyUpdate.into();
        assert!(matches!(error, DomainError::Validation { .. }));
    }
}
