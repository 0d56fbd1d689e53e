//! Error types and error handling for the application
//!
//! This module defines the service error taxonomy and its conversion to HTTP
//! responses. Status codes are decided here and nowhere else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// User-facing message for any generation failure during chat
pub const GENERATION_FAILED_MESSAGE: &str = "Error generating response. Please try again.";

/// Application-level error types
///
/// Every failure a service operation can report is one of these four kinds.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad request shape (wrong file type, empty prompt, malformed body)
    #[error("{0}")]
    InvalidInput(String),

    /// The file parsed as a PDF but produced no text
    #[error("{0}")]
    UnprocessableDocument(String),

    /// The PDF extraction layer failed
    #[error("Error processing PDF: {0}")]
    ProcessingError(String),

    /// The generation collaborator failed
    #[error("{0}")]
    GenerationError(String),
}

impl AppError {
    /// HTTP status code for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessableDocument(_) => StatusCode::BAD_REQUEST,
            AppError::ProcessingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "detail": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
