//! Chat API handlers
//!
//! Chat turns, history and reset for the default session.

use crate::api::AppState;
use crate::error::AppError;
use crate::session::{Message, SessionId};
use axum::{body::Bytes, extract::State, response::Json};
use serde::{Deserialize, Serialize};

/// Request body for a chat turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User prompt; missing is treated as empty
    #[serde(default)]
    pub prompt: String,
    /// Whether to include the document excerpt (default true)
    #[serde(default)]
    pub use_pdf: Option<bool>,
}

/// Response for a chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Model reply
    pub response: String,
    /// Whether a document is loaded
    pub has_pdf: bool,
    /// Messages in the conversation after this turn
    pub history_length: usize,
}

/// Response for the history query
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// All messages, oldest first
    pub history: Vec<Message>,
    /// Whether a document is loaded
    pub has_pdf: bool,
}

/// Response for a reset
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Human-readable message
    pub message: String,
    /// Always true
    pub history_cleared: bool,
    /// Always true
    pub pdf_cleared: bool,
}

/// POST /chat - Run one chat turn
///
/// The body is parsed as JSON whatever `Content-Type` the client sends.
pub async fn chat(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid JSON body: {}", e)))?;

    let outcome = service
        .chat(
            &SessionId::default(),
            &request.prompt,
            request.use_pdf.unwrap_or(true),
        )
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.reply,
        has_pdf: outcome.has_document,
        history_length: outcome.history_length,
    }))
}

/// GET /history - Full conversation of the default session
pub async fn get_history(State(service): State<AppState>) -> Json<HistoryResponse> {
    let snapshot = service.history(&SessionId::default()).await;
    Json(HistoryResponse {
        history: snapshot.messages,
        has_pdf: snapshot.has_document,
    })
}

/// POST /reset - Clear conversation and document
pub async fn reset_conversation(State(service): State<AppState>) -> Json<ResetResponse> {
    service.reset(&SessionId::default()).await;
    Json(ResetResponse {
        message: "Conversation reset successfully".to_string(),
        history_cleared: true,
        pdf_cleared: true,
    })
}
