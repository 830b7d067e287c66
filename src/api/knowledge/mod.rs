//! Knowledge API endpoints

pub mod chunk_strategies;
pub mod entries;
pub mod knowledge_bases;
pub mod search;

use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value;

use super::state::AppState;
use super::types::ApiError;
use crate::infrastructure::services::ChunkingOptionsOverride;

/// Create the knowledge API router
pub fn create_knowledge_router() -> Router<AppState> {
    Router::new()
        // Chunk strategies
        .route(
            "/chunk-strategies",
            get(chunk_strategies::list_chunk_strategies)
                .post(chunk_strategies::create_chunk_strategy),
        )
        .route(
            "/chunk-strategies/{strategy_id}",
            delete(chunk_strategies::delete_chunk_strategy),
        )
        // Knowledge bases
        .route(
            "/knowledge-bases",
            get(knowledge_bases::list_knowledge_bases),
        )
        .route(
            "/knowledge-base",
            post(knowledge_bases::create_knowledge_base),
        )
        .route(
            "/knowledge-base/{kb_id}",
            get(knowledge_bases::get_knowledge_base)
                .put(knowledge_bases::update_knowledge_base)
                .delete(knowledge_bases::delete_knowledge_base),
        )
        // Entries
        .route(
            "/knowledge-bases/{kb_id}/entries",
            get(entries::list_entries).post(entries::create_entry),
        )
        .route(
            "/knowledge-bases/{kb_id}/entries/{entry_id}",
            get(entries::get_entry)
                .put(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route(
            "/knowledge-base-entries",
            post(entries::create_entry_from_body),
        )
        // Chunking and search
        .route("/chunks/preview", post(search::preview_chunks))
        .route("/compare-vector", post(search::compare_vector))
}

/// Chunking options as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingOptionsBody {
    pub chunk_size: Option<Value>,
    pub chunk_overlap: Option<Value>,
}

impl ChunkingOptionsBody {
    pub fn parse(&self) -> Result<ChunkingOptionsOverride, ApiError> {
        let chunk_size = match &self.chunk_size {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| {
                        ApiError::bad_request("Chunk size must be a positive number")
                            .with_param("chunkSize")
                    })? as usize,
            ),
        };

        let chunk_overlap = match &self.chunk_overlap {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                ApiError::bad_request("Chunk overlap must be a non-negative number")
                    .with_param("chunkOverlap")
            })? as usize),
        };

        Ok(ChunkingOptionsOverride {
            chunk_size,
            chunk_overlap,
        })
    }
}

/// A required positive integer field, e.g. a knowledge base ID in a body
pub(crate) fn required_positive_id(
    value: Option<&Value>,
    label: &str,
    param: &str,
) -> Result<u64, ApiError> {
    match value {
        None | Some(Value::Null) => {
            Err(ApiError::bad_request(format!("{} is required", label)).with_param(param))
        }
        Some(value) => value.as_u64().filter(|id| *id > 0).ok_or_else(|| {
            ApiError::bad_request(format!("{} must be a valid positive number", label))
                .with_param(param)
        }),
    }
}

/// A required non-blank string field
pub(crate) fn required_text(value: Option<String>, label: &str, param: &str) -> Result<String, ApiError> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", label)).with_param(param))
}
