//! Entry listing filters and pagination

use std::collections::BTreeSet;

use serde::Serialize;

use super::Entry;
use crate::domain::DomainError;

/// Default page size for entry listings
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Filter applied when listing the entries of a knowledge base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    /// Case-insensitive text matched against content, category and tags
    pub search: Option<String>,
    /// Exact category match
    pub category: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl EntryFilter {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.limit == 0 {
            return Err(DomainError::validation("limit must be at least 1"));
        }
        Ok(())
    }

    /// Whether an entry passes the search and category filters
    pub fn matches(&self, entry: &Entry) -> bool {
        let metadata = entry.metadata();

        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if metadata.category() != category {
                return false;
            }
        }

        let Some(search) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };

        let needle = search.to_lowercase();
        entry.content().to_lowercase().contains(&needle)
            || metadata.category().to_lowercase().contains(&needle)
            || metadata
                .tags()
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Pagination details of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// One page of filtered entries
#[derive(Debug, Clone, Serialize)]
pub struct EntryPage {
    pub entries: Vec<Entry>,
    pub pagination: Pagination,
    /// Distinct categories across all entries of the knowledge base
    pub categories: Vec<String>,
}

impl EntryPage {
    /// Filter, order (newest first) and slice `entries`
    pub fn build(mut entries: Vec<Entry>, filter: &EntryFilter) -> Self {
        let categories: BTreeSet<String> = entries
            .iter()
            .map(|e| e.metadata().category().to_string())
            .collect();

        entries.retain(|e| filter.matches(e));
        entries.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });

        let total = entries.len();
        let page: Vec<Entry> = entries
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();

        Self {
            pagination: Pagination {
                total,
                limit: filter.limit,
                offset: filter.offset,
                has_more: filter.offset.saturating_add(page.len()) < total,
            },
            entries: page,
            categories: categories.into_iter().collect(),
        }
    }
}
