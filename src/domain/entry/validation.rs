//! Entry validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;

/// Prefix carried by every entry identifier
pub const ENTRY_ID_PREFIX: &str = "entry_";

static ENTRY_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^entry_[0-9A-Za-z]{1,64}$").unwrap());

/// Validate entry content, returning the trimmed value
pub fn validate_content(content: &str) -> Result<String, DomainError> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Err(DomainError::validation("content cannot be empty"));
    }

    Ok(trimmed.to_string())
}

/// Validate an entry identifier
pub fn validate_entry_id(id: &str) -> Result<(), DomainError> {
    if !ENTRY_ID_PATTERN.is_match(id) {
        return Err(DomainError::validation(format!(
            "Invalid entry ID '{}': expected '{}' followed by alphanumerics",
            id, ENTRY_ID_PREFIX
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content() {
        assert_eq!(validate_content("  hello \n").unwrap(), "hello");
        assert!(validate_content(" \t\n ").is_err());
        assert!(validate_content("").is_err());
    }

    #[test]
    fn test_validate_entry_id() {
        assert!(validate_entry_id("entry_1").is_ok());
        assert!(validate_entry_id("entry_9f86d081884c7d65").is_ok());
        assert!(validate_entry_id("entry_").is_err());
        assert!(validate_entry_id("kb_1").is_err());
        assert!(validate_entry_id("entry_../etc").is_err());
    }
}
