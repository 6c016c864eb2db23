//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing,
//! request ids), and creates the axum router ready for serving.

use axum::{
    http::{HeaderValue, Request},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use super::handlers;
use super::state::AppState;

/// Generates a v4 UUID for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive, the API is read-mostly and unauthenticated
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/status", get(handlers::health_check))
        .route("/worlds", get(handlers::list_worlds))
        .route("/bosses", get(handlers::get_bosses))
        .route("/spawnables", get(handlers::get_spawnables))
        .route("/boss/{name}/history", get(handlers::get_boss_history))
        .route("/refresh", post(handlers::refresh_world));

    // Layers wrap bottom-up: the request id is set before tracing sees the request
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
        .layer(cors)
        .with_state(state)
}
