//! Text generation collaborator
//!
//! The service talks to the hosted model only through [`TextGenerator`];
//! [`GeminiClient`] is the production implementation.

pub mod client;
pub mod gemini_types;

pub use client::{GeminiClient, GeminiError};

use async_trait::async_trait;

/// Produces a text completion for a flat text prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the raw response text
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError>;
}
