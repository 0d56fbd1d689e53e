//! Document API handlers
//!
//! PDF upload and document removal.

use crate::api::AppState;
use crate::error::AppError;
use crate::session::SessionId;
use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::Serialize;
use tracing::warn;

/// Multipart field carrying the PDF
const FILE_FIELD: &str = "file";

/// Response for a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always "success"
    pub message: String,
    /// Total pages in the PDF
    pub pages: usize,
    /// Generated or fallback summary
    pub summary: String,
    /// Characters of extracted text
    pub characters: usize,
}

/// Plain message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

/// POST /upload_pdf - Extract, store and summarize a PDF
pub async fn upload_pdf(
    State(service): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::InvalidInput(format!("Failed to read multipart field: {}", e.body_text()))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != FILE_FIELD {
            warn!("Unknown multipart field: {}", field_name);
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let data = field.bytes().await.map_err(|e| {
            AppError::InvalidInput(format!("Failed to read file data: {}", e.body_text()))
        })?;
        upload = Some((filename, data.to_vec()));
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;

    let outcome = service
        .upload_document(&SessionId::default(), data, &filename)
        .await?;

    Ok(Json(UploadResponse {
        message: "success".to_string(),
        pages: outcome.page_count,
        summary: outcome.summary,
        characters: outcome.character_count,
    }))
}

/// DELETE /clear_pdf - Remove the document, keep the conversation
pub async fn clear_pdf(State(service): State<AppState>) -> Json<MessageResponse> {
    let message = if service.clear_document(&SessionId::default()).await {
        "PDF cleared successfully"
    } else {
        "No PDF to clear"
    };
    Json(MessageResponse {
        message: message.to_string(),
    })
}
