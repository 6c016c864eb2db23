//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer; an empty or missing `world` is rejected there before any store
//! access.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use log::info;

use super::dto::{
    BossesResponse, HealthResponse, HistoryQuery, Observation, RefreshResponse, WorldQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::services::eligibility;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health, GET /api/v1/status
///
/// Reports the service version and whether the store answers.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Read endpoints
// =============================================================================

/// GET /api/v1/worlds
pub async fn list_worlds(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    Ok(Json(db_services::list_worlds(state.repository.as_ref()).await?))
}

/// GET /api/v1/bosses?world=W
///
/// Every boss for the world, catalogue placeholders included.
pub async fn get_bosses(
    State(state): State<AppState>,
    Query(query): Query<WorldQuery>,
) -> HandlerResult<BossesResponse> {
    let view =
        eligibility::bosses_for_world(state.repository.as_ref(), &state.catalogue, query.world())
            .await?;
    Ok(Json(view))
}

/// GET /api/v1/spawnables?world=W
pub async fn get_spawnables(
    State(state): State<AppState>,
    Query(query): Query<WorldQuery>,
) -> HandlerResult<BossesResponse> {
    let view = eligibility::spawnables(state.repository.as_ref(), &state.catalogue, query.world())
        .await?;
    Ok(Json(view))
}

/// GET /api/v1/boss/{name}/history?world=W&limit=N
///
/// The store keeps one row per boss, so this returns at most one entry.
pub async fn get_boss_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> HandlerResult<Vec<Observation>> {
    let rows = db_services::get_recent(
        state.repository.as_ref(),
        query.world(),
        &name,
        query.limit(),
    )
    .await?;
    Ok(Json(rows))
}

// =============================================================================
// Refresh
// =============================================================================

/// POST /api/v1/refresh?world=W
///
/// Runs a refresh inline and reports what was stored.
pub async fn refresh_world(
    State(state): State<AppState>,
    Query(query): Query<WorldQuery>,
) -> HandlerResult<RefreshResponse> {
    let summary = state.orchestrator.refresh_world(query.world()).await?;
    info!("on-demand refresh of {} stored {} rows", summary.world, summary.stored);
    Ok(Json(summary.into()))
}
