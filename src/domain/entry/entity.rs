//! Entry entity and metadata

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::{validate_content, validate_entry_id, ENTRY_ID_PREFIX};
use crate::domain::chunking::ChunkingOptions;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Category assigned when none is given
pub const DEFAULT_CATEGORY: &str = "general";

/// Entry identifier (`entry_<token>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Create an entry ID after validating its format
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_entry_id(&id)?;
        Ok(Self(id))
    }

    /// Build an ID from a generated alphanumeric token
    pub(crate) fn from_token(token: &str) -> Self {
        Self(format!("{}{}", ENTRY_ID_PREFIX, token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StorageKey for EntryId {
    fn storage_key(&self) -> String {
        self.0.clone()
    }
}

/// Open key/value metadata attached to an entry; `category` is always present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct EntryMetadata {
    values: BTreeMap<String, Value>,
}

impl EntryMetadata {
    pub fn new() -> Self {
        Self::from(BTreeMap::new())
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self.normalize();
        self
    }

    pub fn category(&self) -> &str {
        self.values
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// String tags listed under `tags`, ignoring non-string items
    pub fn tags(&self) -> Vec<&str> {
        self.values
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Merge `updates` over the current values; new keys override, others are kept.
    /// A blank or non-string `category` in `updates` leaves the current one.
    pub fn merge(&mut self, updates: BTreeMap<String, Value>) {
        for (key, value) in updates {
            if key == "category" && !is_valid_category(&value) {
                continue;
            }
            self.values.insert(key, value);
        }
    }

    fn normalize(&mut self) {
        if !self.values.get("category").is_some_and(is_valid_category) {
            self.values
                .insert("category".to_string(), Value::from(DEFAULT_CATEGORY));
        }
    }
}

fn is_valid_category(value: &Value) -> bool {
    value.as_str().is_some_and(|c| !c.trim().is_empty())
}

impl Default for EntryMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<String, Value>> for EntryMetadata {
    fn from(values: BTreeMap<String, Value>) -> Self {
        let mut metadata = Self { values };
        metadata.normalize();
        metadata
    }
}

impl From<EntryMetadata> for BTreeMap<String, Value> {
    fn from(metadata: EntryMetadata) -> Self {
        metadata.values
    }
}

/// A unit of text content owned by one knowledge base
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    id: EntryId,
    knowledge_base_id: KnowledgeBaseId,
    content: String,
    metadata: EntryMetadata,
    options: ChunkingOptions,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Entry {
    /// Create an entry; content is trimmed and must not be blank
    pub fn new(
        id: EntryId,
        knowledge_base_id: KnowledgeBaseId,
        content: &str,
        metadata: EntryMetadata,
        options: ChunkingOptions,
    ) -> Result<Self, DomainError> {
        options.validate()?;
        let now = Utc::now();

        Ok(Self {
            id,
            knowledge_base_id,
            content: validate_content(content)?,
            metadata,
            options,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn knowledge_base_id(&self) -> KnowledgeBaseId {
        self.knowledge_base_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &EntryMetadata {
        &self.metadata
    }

    pub fn options(&self) -> &ChunkingOptions {
        &self.options
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_content(&mut self, content: &str) -> Result<(), DomainError> {
        self.content = validate_content(content)?;
        self.touch();
        Ok(())
    }

    pub fn merge_metadata(&mut self, updates: BTreeMap<String, Value>) {
        self.metadata.merge(updates);
        self.touch();
    }

    pub fn set_options(&mut self, options: ChunkingOptions) -> Result<(), DomainError> {
        options.validate()?;
        self.options = options;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Entry {
    type Key = EntryId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
