//! Liveness endpoints

use crate::api::AppState;
use axum::{extract::State, response::Json};
use serde::Serialize;

#[allow(missing_docs)]
#[derive(Serialize)]
pub struct HomeResponse {
    pub message: String,
    pub status: String,
}

#[allow(missing_docs)]
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
    pub pdfs_loaded: usize,
}

/// GET /
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "PDF chat backend is running!".to_string(),
        status: "healthy".to_string(),
    })
}

/// GET /health - Store-wide counters
pub async fn health_check(State(service): State<AppState>) -> Json<HealthResponse> {
    let report = service.health().await;
    Json(HealthResponse {
        status: report.status.to_string(),
        active_sessions: report.active_sessions,
        pdfs_loaded: report.documents_loaded,
    })
}
