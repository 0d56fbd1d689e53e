//! API module
//!
//! HTTP request handlers and the router that wires them to the service.

pub mod chat;
pub mod documents;
pub mod health;
pub mod middleware;

use crate::services::ConversationService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler
pub type AppState = Arc<ConversationService>;

/// Build the application router
///
/// `max_upload_bytes` bounds request bodies, which in practice bounds PDF uploads.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health_check))
        .route("/upload_pdf", post(documents::upload_pdf))
        .route("/clear_pdf", delete(documents::clear_pdf))
        .route("/chat", post(chat::chat))
        .route("/history", get(chat::get_history))
        .route("/reset", post(chat::reset_conversation))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
