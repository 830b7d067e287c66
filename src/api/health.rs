//! Health check endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

/// Health response; `checks` only on readiness
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl HealthStatus {
    fn worst(self, other: HealthStatus) -> HealthStatus {
        match (self, other) {
            (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
            (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
            _ => Self::Healthy,
        }
    }
}

impl HealthCheck {
    fn finish(
        name: &'static str,
        started: Instant,
        status: HealthStatus,
        message: Option<String>,
    ) -> Self {
        Self {
            name,
            status,
            message,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: HealthStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: None,
            latency_ms: None,
        }),
    )
}

/// GET /ready
/// Degraded when the vector index holds vectors without an entry record
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let checks = vec![
        check_record_store(&state).await,
        check_vector_index(&state).await,
    ];

    let status = checks
        .iter()
        .map(|check| check.status)
        .fold(HealthStatus::Healthy, HealthStatus::worst);

    let status_code = match status {
        // Degraded still serves traffic
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: Some(checks),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        }),
    )
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_record_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let (status, message) = match state.chunk_strategy_service.list().await {
        Ok(strategies) if strategies.is_empty() => (
            HealthStatus::Degraded,
            Some("No chunking strategies configured".to_string()),
        ),
        Ok(_) => (HealthStatus::Healthy, None),
        Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
    };

    HealthCheck::finish("record_store", start, status, message)
}

async fn check_vector_index(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let (status, message) = match state.coordinator.audit().await {
        Ok(report) if report.is_consistent() => (HealthStatus::Healthy, None),
        Ok(report) => (
            HealthStatus::Degraded,
            Some(format!(
                "{} of {} indexed entries have no entry record",
                report.orphaned.len(),
                report.indexed_entries
            )),
        ),
        Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
    };

    HealthCheck::finish("vector_index", start, status, message)
}
