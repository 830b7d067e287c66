//! Knowledge base endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{required_positive_id, required_text};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{ChunkStrategyId, KnowledgeBase};
use crate::infrastructure::services::{CreateKnowledgeBaseRequest, UpdateKnowledgeBaseRequest};

/// Request to create a knowledge base
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKnowledgeBaseApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub chunking_strategy_id: Option<Value>,
}

/// Request to update a knowledge base
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKnowledgeBaseApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub chunking_strategy_id: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseResponse {
    pub knowledge_base: KnowledgeBase,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListKnowledgeBasesResponse {
    pub knowledge_bases: Vec<KnowledgeBase>,
    pub total: usize,
}

/// GET /knowledge/knowledge-bases
/// Most recently updated first
pub async fn list_knowledge_bases(
    State(state): State<AppState>,
) -> Result<Json<ListKnowledgeBasesResponse>, ApiError> {
    let knowledge_bases = state.knowledge_base_service.list().await?;
    let total = knowledge_bases.len();

    Ok(Json(ListKnowledgeBasesResponse {
        knowledge_bases,
        total,
    }))
}

/// POST /knowledge/knowledge-base
pub async fn create_knowledge_base(
    State(state): State<AppState>,
    Json(request): Json<CreateKnowledgeBaseApiRequest>,
) -> Result<(StatusCode, Json<KnowledgeBaseResponse>), ApiError> {
    let name = required_text(request.name, "Name", "name")?;
    let description = required_text(request.description, "Description", "description")?;
    let strategy_id = required_positive_id(
        request.chunking_strategy_id.as_ref(),
        "Chunking strategy ID",
        "chunkingStrategyId",
    )?;

    debug!(name = %name, "Creating knowledge base");

    let kb = state
        .knowledge_base_service
        .create(CreateKnowledgeBaseRequest {
            name,
            description,
            chunking_strategy_id: ChunkStrategyId::new(strategy_id),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(KnowledgeBaseResponse { knowledge_base: kb }),
    ))
}

/// GET /knowledge/knowledge-base/{kb_id}
pub async fn get_knowledge_base(
    State(state): State<AppState>,
    Path(kb_id): Path<String>,
) -> Result<Json<KnowledgeBaseResponse>, ApiError> {
    let kb = state.knowledge_base_service.get_required(&kb_id).await?;
    Ok(Json(KnowledgeBaseResponse { knowledge_base: kb }))
}

/// PUT /knowledge/knowledge-base/{kb_id}
pub async fn update_knowledge_base(
    State(state): State<AppState>,
    Path(kb_id): Path<String>,
    Json(request): Json<UpdateKnowledgeBaseApiRequest>,
) -> Result<Json<KnowledgeBaseResponse>, ApiError> {
    debug!(kb_id = %kb_id, "Updating knowledge base");

    let chunking_strategy_id = match request.chunking_strategy_id {
        None | Some(Value::Null) => None,
        Some(value) => Some(ChunkStrategyId::new(required_positive_id(
            Some(&value),
            "Chunking strategy ID",
            "chunkingStrategyId",
        )?)),
    };

    let kb = state
        .knowledge_base_service
        .update(
            &kb_id,
            UpdateKnowledgeBaseRequest {
                name: request.name,
                description: request.description,
                chunking_strategy_id,
            },
        )
        .await?;

    Ok(Json(KnowledgeBaseResponse { knowledge_base: kb }))
}

/// DELETE /knowledge/knowledge-base/{kb_id}
/// Removes the knowledge base with all of its entries and vectors
pub async fn delete_knowledge_base(
    State(state): State<AppState>,
    Path(kb_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(kb_id = %kb_id, "Deleting knowledge base");
    state.knowledge_base_service.delete(&kb_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
