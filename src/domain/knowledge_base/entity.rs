//! Knowledge base entity and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    parse_knowledge_base_id, validate_description, validate_name, KnowledgeBaseValidationError,
};
use crate::domain::chunking::ChunkStrategyId;
use crate::domain::storage::{StorageEntity, StorageKey};

/// Knowledge base identifier, a positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBaseId(u64);

impl KnowledgeBaseId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl FromStr for KnowledgeBaseId {
    type Err = KnowledgeBaseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_knowledge_base_id(s).map(Self)
    }
}

impl fmt::Display for KnowledgeBaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for KnowledgeBaseId {
    fn storage_key(&self) -> String {
        self.0.to_string()
    }
}

/// A named collection of entries sharing one chunking strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeBase {
    id: KnowledgeBaseId,
    name: String,
    description: String,
    chunking_strategy_id: ChunkStrategyId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl KnowledgeBase {
    /// Create a new knowledge base, trimming and validating name and description
    pub fn new(
        id: KnowledgeBaseId,
        name: &str,
        description: &str,
        chunking_strategy_id: ChunkStrategyId,
    ) -> Result<Self, KnowledgeBaseValidationError> {
        let now = Utc::now();
        Ok(Self {
            id,
            name: validate_name(name)?,
            description: validate_description(description)?,
            chunking_strategy_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> KnowledgeBaseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn chunking_strategy_id(&self) -> ChunkStrategyId {
        self.chunking_strategy_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), KnowledgeBaseValidationError> {
        self.name = validate_name(name)?;
        self.touch();
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), KnowledgeBaseValidationError> {
        self.description = validate_description(description)?;
        self.touch();
        Ok(())
    }

    pub fn set_chunking_strategy(&mut self, strategy_id: ChunkStrategyId) {
        self.chunking_strategy_id = strategy_id;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for KnowledgeBase {
    type Key = KnowledgeBaseId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeBase {
        KnowledgeBase::new(
            KnowledgeBaseId::new(1),
            "  Product Docs ",
            "Manuals for every product line",
            ChunkStrategyId::new(1),
        )
        .unwrap()
    }

    #[test]
    fn test_new_trims_fields() {
        let kb = sample();
        assert_eq!(kb.name(), "Product Docs");
        assert_eq!(kb.created_at(), kb.updated_at());
    }

    #[test]
    fn test_new_rejects_short_description() {
        let result = KnowledgeBase::new(
            KnowledgeBaseId::new(1),
            "Docs",
            "short",
            ChunkStrategyId::new(1),
        );
        assert!(matches!(
            result,
            Err(KnowledgeBaseValidationError::InvalidDescriptionLength { .. })
        ));
    }

    #[test]
    fn test_setters_touch_updated_at() {
        let mut kb = sample();
        let before = kb.updated_at();
        std::thread::sleep(std::time::Duration::from_millis(2));

        kb.set_chunking_strategy(ChunkStrategyId::new(3));

        assert_eq!(kb.chunking_strategy_id(), ChunkStrategyId::new(3));
        assert!(kb.updated_at() > before);
    }

    #[test]
    fn test_failed_rename_keeps_previous_name() {
        let mut kb = sample();
        assert!(kb.set_name("x").is_err());
        assert_eq!(kb.name(), "Product Docs");
    }

    #[test]
    fn test_id_parsing() {
        assert_eq!("7".parse::<KnowledgeBaseId>().unwrap(), KnowledgeBaseId::new(7));
        assert!("0".parse::<KnowledgeBaseId>().is_err());
    }

    #[test]
    fn test_serializes_snake_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["chunking_strategy_id"], 1);
        assert!(json.get("created_at").is_some());
    }
}
