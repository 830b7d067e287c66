//! Chunk strategy reference data

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Maximum length for strategy slugs
pub const MAX_SLUG_LENGTH: usize = 64;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"));

/// Chunk strategy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkStrategyId(u64);

impl ChunkStrategyId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChunkStrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for ChunkStrategyId {
    fn storage_key(&self) -> String {
        self.0.to_string()
    }
}

/// Chunking algorithm backing a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkStrategyKind {
    FixedSize,
    SentenceBoundary,
    Paragraph,
    SlidingWindow,
    Semantic,
}

impl ChunkStrategyKind {
    pub const ALL: [ChunkStrategyKind; 5] = [
        Self::FixedSize,
        Self::Semantic,
        Self::SentenceBoundary,
        Self::Paragraph,
        Self::SlidingWindow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedSize => "fixed-size",
            Self::SentenceBoundary => "sentence-boundary",
            Self::Paragraph => "paragraph",
            Self::SlidingWindow => "sliding-window",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for ChunkStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkStrategyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed-size" | "fixed_size" => Ok(Self::FixedSize),
            "sentence-boundary" | "sentence_boundary" | "sentence" => Ok(Self::SentenceBoundary),
            "paragraph" => Ok(Self::Paragraph),
            "sliding-window" | "sliding_window" => Ok(Self::SlidingWindow),
            "semantic" => Ok(Self::Semantic),
            other => Err(DomainError::validation(format!(
                "Unknown chunking algorithm '{}'",
                other
            ))),
        }
    }
}

/// Validate a strategy slug
pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    if slug.is_empty() {
        return Err(DomainError::validation("slug is required"));
    }

    if slug.len() > MAX_SLUG_LENGTH {
        return Err(DomainError::validation(format!(
            "slug too long: {} characters (max {})",
            slug.len(),
            MAX_SLUG_LENGTH
        )));
    }

    if !SLUG_PATTERN.is_match(slug) {
        return Err(DomainError::validation(format!(
            "Invalid slug '{}': must be lowercase alphanumeric with hyphens",
            slug
        )));
    }

    Ok(())
}

/// A named chunking strategy knowledge bases can reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkStrategy {
    id: ChunkStrategyId,
    name: String,
    slug: String,
    description: String,
    kind: ChunkStrategyKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChunkStrategy {
    /// Create a strategy; the algorithm is taken from `kind` or inferred from the slug
    pub fn new(
        id: ChunkStrategyId,
        name: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
        kind: Option<ChunkStrategyKind>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        let slug = slug.into().trim().to_string();
        let description = description.into().trim().to_string();

        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if description.is_empty() {
            return Err(DomainError::validation("description is required"));
        }
        validate_slug(&slug)?;

        let kind = match kind {
            Some(kind) => kind,
            None => slug.parse().map_err(|_| {
                DomainError::validation(format!(
                    "kind is required when slug '{}' does not name a chunking algorithm",
                    slug
                ))
            })?,
        };

        let now = Utc::now();
        Ok(Self {
            id,
            name,
            slug,
            description,
            kind,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> ChunkStrategyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> ChunkStrategyKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl StorageEntity for ChunkStrategy {
    type Key = ChunkStrategyId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
