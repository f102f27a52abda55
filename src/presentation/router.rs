use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::TranscriptionEngine;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{health_handler, transcribe_handler};
use crate::presentation::state::AppState;

pub fn create_router<E>(state: AppState<E>) -> Router
where
    E: TranscriptionEngine + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let max_body_bytes = state.settings.upload.max_body_bytes();

    // The body-limit layer rejects oversized uploads before the handler
    // runs; axum's own default limit is disabled so the configured cap is
    // the single source of truth.
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/transcribe", post(transcribe_handler::<E>))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
