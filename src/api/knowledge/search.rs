//! Similarity search and chunk preview endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{required_positive_id, ChunkingOptionsBody};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Chunk, ChunkStrategyKind, KnowledgeBaseId, SimilarityQuery, SimilarityResult};
use crate::infrastructure::services::PreviewChunksRequest;

/// Similarity search request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareVectorApiRequest {
    pub prompt: Option<String>,
    pub knowledge_base_id: Option<Value>,
    pub threshold: Option<Value>,
    #[serde(alias = "limiter")]
    pub limit: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareVectorResponse {
    pub entries: Vec<SimilarityResult>,
}

/// Chunk preview request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewChunksApiRequest {
    pub content: Option<String>,
    pub knowledge_base_id: Option<Value>,
    /// Chunking algorithm slug, e.g. `sliding-window`
    pub strategy: Option<String>,
    pub options: Option<ChunkingOptionsBody>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewChunksResponse {
    pub chunks: Vec<Chunk>,
}

impl CompareVectorApiRequest {
    fn into_query(self) -> Result<SimilarityQuery, ApiError> {
        let prompt = self
            .prompt
            .filter(|prompt| !prompt.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Prompt is required").with_param("prompt"))?;

        let kb_id = required_positive_id(
            self.knowledge_base_id.as_ref(),
            "Knowledge base ID",
            "knowledgeBaseId",
        )?;

        let threshold = match self.threshold {
            None | Some(Value::Null) => {
                return Err(ApiError::bad_request("Threshold is required").with_param("threshold"));
            }
            Some(value) => value
                .as_f64()
                .filter(|t| (0.0..=1.0).contains(t))
                .ok_or_else(|| {
                    ApiError::bad_request("Threshold must be a number between 0 and 1")
                        .with_param("threshold")
                })?,
        };

        let limit = match self.limit {
            None | Some(Value::Null) => {
                return Err(ApiError::bad_request("Limiter is required").with_param("limiter"));
            }
            Some(value) => value.as_u64().filter(|l| *l > 0).ok_or_else(|| {
                ApiError::bad_request("Limiter must be a positive number").with_param("limiter")
            })?,
        };

        Ok(SimilarityQuery::new(
            KnowledgeBaseId::new(kb_id),
            prompt,
            threshold as f32,
            limit as usize,
        ))
    }
}

/// POST /knowledge/compare-vector
/// Entries of one knowledge base ranked by similarity to the prompt
pub async fn compare_vector(
    State(state): State<AppState>,
    Json(request): Json<CompareVectorApiRequest>,
) -> Result<Json<CompareVectorResponse>, ApiError> {
    let query = request.into_query()?;
    debug!(
        kb_id = %query.knowledge_base_id,
        threshold = query.threshold,
        limit = query.limit,
        "Comparing prompt against knowledge base"
    );

    let entries = state.coordinator.query(&query).await?;
    Ok(Json(CompareVectorResponse { entries }))
}

/// POST /knowledge/chunks/preview
/// Chunk content without embedding or storing it
pub async fn preview_chunks(
    State(state): State<AppState>,
    Json(request): Json<PreviewChunksApiRequest>,
) -> Result<Json<PreviewChunksResponse>, ApiError> {
    let content = request
        .content
        .ok_or_else(|| ApiError::bad_request("Content is required").with_param("content"))?;

    let knowledge_base_id = match &request.knowledge_base_id {
        None | Some(Value::Null) => None,
        Some(value) => Some(KnowledgeBaseId::new(required_positive_id(
            Some(value),
            "Knowledge base ID",
            "knowledgeBaseId",
        )?)),
    };

    let kind = request
        .strategy
        .as_deref()
        .map(str::parse::<ChunkStrategyKind>)
        .transpose()
        .map_err(|e| ApiError::from(e).with_param("strategy"))?;

    let chunks = state
        .entry_service
        .preview(PreviewChunksRequest {
            content,
            knowledge_base_id,
            kind,
            options: request
                .options
                .as_ref()
                .map(ChunkingOptionsBody::parse)
                .transpose()?,
        })
        .await?;

    Ok(Json(PreviewChunksResponse { chunks }))
}
