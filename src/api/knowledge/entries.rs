//! Knowledge base entry endpoints

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{required_positive_id, ChunkingOptionsBody};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::entry::{EntryFilter, DEFAULT_PAGE_LIMIT};
use crate::domain::{Entry, EntryPage};
use crate::infrastructure::services::{CreateEntryRequest, IndexedEntry, UpdateEntryRequest};

/// Query parameters for listing entries.
///
/// `limit` and `offset` stay raw: unparseable or zero values fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEntriesQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Leading decimal digits of `raw` as a positive count, else `fallback`
fn lenient_count(raw: Option<&str>, fallback: usize) -> usize {
    let Some(raw) = raw.map(str::trim) else {
        return fallback;
    };
    let digits = raw
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(raw, |(end, _)| &raw[..end]);

    match digits.parse::<usize>() {
        Ok(count) if count > 0 => count,
        _ => fallback,
    }
}

impl From<ListEntriesQuery> for EntryFilter {
    fn from(query: ListEntriesQuery) -> Self {
        let mut filter = EntryFilter::default().with_page(
            lenient_count(query.limit.as_deref(), DEFAULT_PAGE_LIMIT),
            lenient_count(query.offset.as_deref(), 0),
        );
        if let Some(search) = query.search {
            filter = filter.with_search(search);
        }
        if let Some(category) = query.category {
            filter = filter.with_category(category);
        }
        filter
    }
}

/// Request to create an entry under a knowledge base path
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryApiRequest {
    pub content: Option<String>,
    pub metadata: Option<BTreeMap<String, Value>>,
    pub options: Option<ChunkingOptionsBody>,
}

/// Request to create an entry naming its knowledge base in the body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryWithKnowledgeBaseApiRequest {
    pub knowledge_base_id: Option<Value>,
    #[serde(flatten)]
    pub entry: CreateEntryApiRequest,
}

/// Request to update an entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryApiRequest {
    pub content: Option<String>,
    pub metadata: Option<BTreeMap<String, Value>>,
    pub options: Option<ChunkingOptionsBody>,
    pub regenerate_embedding: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub entry: Entry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntryResponse {
    pub entry: Entry,
    pub chunk_count: usize,
}

impl From<IndexedEntry> for CreatedEntryResponse {
    fn from(indexed: IndexedEntry) -> Self {
        Self {
            entry: indexed.entry,
            chunk_count: indexed.report.chunk_count,
        }
    }
}

impl CreateEntryApiRequest {
    fn into_request(self) -> Result<CreateEntryRequest, ApiError> {
        let content = self
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                ApiError::bad_request("Content is required and must be a non-empty string")
                    .with_param("content")
            })?;

        Ok(CreateEntryRequest {
            content,
            metadata: self.metadata,
            options: self.options.as_ref().map(ChunkingOptionsBody::parse).transpose()?,
        })
    }
}

/// GET /knowledge/knowledge-bases/{kb_id}/entries
pub async fn list_entries(
    State(state): State<AppState>,
    Path(kb_id): Path<String>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<EntryPage>, ApiError> {
    let page = state.entry_service.list(&kb_id, query.into()).await?;
    Ok(Json(page))
}

/// POST /knowledge/knowledge-bases/{kb_id}/entries
pub async fn create_entry(
    State(state): State<AppState>,
    Path(kb_id): Path<String>,
    Json(request): Json<CreateEntryApiRequest>,
) -> Result<(StatusCode, Json<CreatedEntryResponse>), ApiError> {
    debug!(kb_id = %kb_id, "Creating entry");

    let indexed = state
        .entry_service
        .create(&kb_id, request.into_request()?)
        .await?;

    Ok((StatusCode::CREATED, Json(indexed.into())))
}

/// POST /knowledge/knowledge-base-entries
pub async fn create_entry_from_body(
    State(state): State<AppState>,
    Json(request): Json<CreateEntryWithKnowledgeBaseApiRequest>,
) -> Result<(StatusCode, Json<CreatedEntryResponse>), ApiError> {
    let entry = request.entry.into_request()?;
    let kb_id = required_positive_id(
        request.knowledge_base_id.as_ref(),
        "Knowledge base ID",
        "knowledgeBaseId",
    )?;

    let indexed = state
        .entry_service
        .create(&kb_id.to_string(), entry)
        .await?;

    Ok((StatusCode::CREATED, Json(indexed.into())))
}

/// GET /knowledge/knowledge-bases/{kb_id}/entries/{entry_id}
pub async fn get_entry(
    State(state): State<AppState>,
    Path((kb_id, entry_id)): Path<(String, String)>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = state.entry_service.get(&kb_id, &entry_id).await?;
    Ok(Json(EntryResponse { entry }))
}

/// PUT /knowledge/knowledge-bases/{kb_id}/entries/{entry_id}
pub async fn update_entry(
    State(state): State<AppState>,
    Path((kb_id, entry_id)): Path<(String, String)>,
    Json(request): Json<UpdateEntryApiRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    debug!(kb_id = %kb_id, entry_id = %entry_id, "Updating entry");

    if matches!(&request.content, Some(content) if content.trim().is_empty()) {
        return Err(ApiError::bad_request("Content must be a non-empty string").with_param("content"));
    }

    let update = UpdateEntryRequest {
        content: request.content,
        metadata: request.metadata,
        options: request
            .options
            .as_ref()
            .map(ChunkingOptionsBody::parse)
            .transpose()?,
        regenerate_embedding: request.regenerate_embedding,
    };

    let entry = state
        .entry_service
        .update(&kb_id, &entry_id, update)
        .await?;

    Ok(Json(EntryResponse { entry }))
}

/// DELETE /knowledge/knowledge-bases/{kb_id}/entries/{entry_id}
pub async fn delete_entry(
    State(state): State<AppState>,
    Path((kb_id, entry_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    debug!(kb_id = %kb_id, entry_id = %entry_id, "Deleting entry");
    state.entry_service.delete(&kb_id, &entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>, offset: Option<&str>) -> EntryFilter {
        ListEntriesQuery {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
            ..Default::default()
        }
        .into()
    }

    #[test]
    fn test_page_defaults() {
        let filter = query(None, None);
        assert_eq!((filter.limit, filter.offset), (DEFAULT_PAGE_LIMIT, 0));
    }

    #[test]
    fn test_unparseable_page_values_fall_back() {
        let filter = query(Some("abc"), Some("-3"));
        assert_eq!((filter.limit, filter.offset), (DEFAULT_PAGE_LIMIT, 0));

        let filter = query(Some("0"), Some(""));
        assert_eq!((filter.limit, filter.offset), (DEFAULT_PAGE_LIMIT, 0));
    }

    #[test]
    fn test_leading_digits_are_used() {
        let filter = query(Some("20items"), Some(" 40 "));
        assert_eq!((filter.limit, filter.offset), (20, 40));
    }

    #[test]
    fn test_large_limit_accepted() {
        let filter = query(Some("5000"), None);
        assert_eq!(filter.limit, 5000);
        assert!(filter.validate().is_ok());
    }
}
