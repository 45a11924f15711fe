//! HTTP request handlers for the consolidation service.
//!
//! Implements the consolidation and reputation-maintenance endpoints using
//! axum.

use crate::config::ServerConfig;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response as AxumResponse},
    routing::{get, post},
    Router as AxumRouter,
};
use concord_consolidator::{ConsolidateError, Response, WorkloadManager};
use concord_domain::{ObjectClaims, ReputationStore, SourceRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Engine parameters resolved at startup
    pub config: ServerConfig,
    /// Process-wide reputation store
    pub store: Arc<dyn ReputationStore>,
}

impl AppState {
    /// Assemble a workload manager for one request.
    ///
    /// The engines hold no cross-request mutable state; only the store is
    /// shared.
    fn workload_manager(&self) -> Result<WorkloadManager, ConsolidateError> {
        WorkloadManager::new(
            self.config.levels,
            self.config.longevity_factor,
            self.config.dampening,
            self.config.influence,
            self.config.stateful,
            self.store.clone(),
        )
    }
}

/// Consolidation request body
#[derive(Debug, Deserialize)]
pub struct ConsolidateRequest {
    /// Objects to consolidate
    pub objects: Vec<ObjectClaims>,
    /// Source records, required in stateless mode
    #[serde(default)]
    pub sources: Option<Vec<SourceRecord>>,
}

/// Result of a clear request: 1 for success, -1 otherwise
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    /// Outcome flag
    pub success: i32,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: String,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Consolidation pipeline failure
    Consolidate(ConsolidateError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> AxumResponse {
        let (status, message) = match self {
            AppError::Consolidate(e) if e.is_validation() => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Consolidate(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ConsolidateError> for AppError {
    fn from(e: ConsolidateError) -> Self {
        AppError::Consolidate(e)
    }
}

/// POST /consolidate - Consolidate a batch of objects
///
/// Validation failures return 400 before any reputation mutation.
async fn consolidate(
    State(state): State<AppState>,
    Json(request): Json<ConsolidateRequest>,
) -> Result<Json<Response>, AppError> {
    let request_id = Uuid::now_v7();
    info!(
        %request_id,
        objects = request.objects.len(),
        "consolidation request received"
    );

    let manager = state.workload_manager()?;
    let response = manager.run(request.objects, request.sources)?;

    info!(%request_id, "consolidation request completed");
    Ok(Json(response))
}

/// GET /clear - Drop all reputation data
async fn clear(State(state): State<AppState>) -> Json<ClearResponse> {
    let request_id = Uuid::now_v7();
    info!(%request_id, "clear request received");

    let outcome = state
        .workload_manager()
        .and_then(|manager| manager.clear_reputation());
    match outcome {
        Ok(()) => Json(ClearResponse { success: 1 }),
        Err(e) => {
            error!(%request_id, "error deleting reputation data: {}", e);
            Json(ClearResponse { success: -1 })
        }
    }
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/consolidate", post(consolidate))
        .route("/clear", get(clear))
        .route("/health", get(health_check))
        .with_state(state)
}
