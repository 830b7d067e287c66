//! Chunk strategy endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::required_text;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{ChunkStrategy, ChunkStrategyId, ChunkStrategyKind};
use crate::infrastructure::services::CreateChunkStrategyRequest;

/// Request to create a chunk strategy
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChunkStrategyApiRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Chunking algorithm; inferred from the slug when omitted
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListChunkStrategiesResponse {
    pub strategies: Vec<ChunkStrategy>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkStrategyResponse {
    pub chunking_strategy: ChunkStrategy,
}

/// GET /knowledge/chunk-strategies
pub async fn list_chunk_strategies(
    State(state): State<AppState>,
) -> Result<Json<ListChunkStrategiesResponse>, ApiError> {
    let strategies = state.chunk_strategy_service.list().await?;
    Ok(Json(ListChunkStrategiesResponse { strategies }))
}

/// POST /knowledge/chunk-strategies
pub async fn create_chunk_strategy(
    State(state): State<AppState>,
    Json(request): Json<CreateChunkStrategyApiRequest>,
) -> Result<(StatusCode, Json<ChunkStrategyResponse>), ApiError> {
    let name = required_text(request.name, "Name", "name")?;
    let slug = required_text(request.slug, "Slug", "slug")?;
    let description = required_text(request.description, "Description", "description")?;
    let kind = request
        .kind
        .as_deref()
        .map(str::parse::<ChunkStrategyKind>)
        .transpose()
        .map_err(|e| ApiError::from(e).with_param("kind"))?;

    debug!(slug = %slug, "Creating chunk strategy");

    let strategy = state
        .chunk_strategy_service
        .create(CreateChunkStrategyRequest {
            name,
            slug,
            description,
            kind,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ChunkStrategyResponse {
            chunking_strategy: strategy,
        }),
    ))
}

/// DELETE /knowledge/chunk-strategies/{strategy_id}
pub async fn delete_chunk_strategy(
    State(state): State<AppState>,
    Path(strategy_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = strategy_id
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request("Invalid chunking strategy ID").with_param("id"))?;

    state
        .chunk_strategy_service
        .delete(ChunkStrategyId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
