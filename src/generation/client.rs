//! Gemini API client
//!
//! Direct HTTP client for the Gemini `generateContent` endpoint.

use crate::config::GeminiConfig;
use crate::generation::gemini_types::{GeminiApiRequest, GeminiApiResponse};
use crate::generation::TextGenerator;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single Gemini call
#[derive(Error, Debug)]
pub enum GeminiError {
    /// No credential configured
    #[error("API key is empty")]
    MissingApiKey,

    /// The HTTP request could not be sent or timed out
    #[error("Failed to send HTTP request to Gemini API: {0}")]
    Request(#[from] reqwest::Error),

    /// HTTP 429
    #[error("Gemini API rate limit exceeded (HTTP 429): {0}")]
    RateLimited(String),

    /// Any other non-success status
    #[error("Gemini API returned error status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("Failed to parse JSON response from Gemini API: {0}")]
    Parse(String),

    /// The prompt was rejected by safety filters
    #[error("Gemini API blocked the prompt: {0}")]
    Blocked(String),

    /// The response carried no usable text
    #[error("Gemini API response {0}")]
    EmptyResponse(&'static str),
}

/// Client for the Gemini REST API
///
/// Holds one `reqwest::Client` for connection pooling. The per-call timeout
/// is configured on that client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from configuration
    ///
    /// # Errors
    /// * Returns `GeminiError::Request` if the HTTP client cannot be built
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Model name requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Call Gemini with a prompt
    ///
    /// # Returns
    /// * `Ok(String)` - The text of the first part of the first candidate
    /// * `Err(GeminiError)` - If the key is missing, the HTTP call fails,
    ///   the response cannot be parsed, or no text is present
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(GeminiError::MissingApiKey),
        };

        let endpoint = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!(
            endpoint = %endpoint,
            model = %self.model,
            prompt_len = prompt.len(),
            "Calling Gemini API"
        );

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(&GeminiApiRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                status_code = status_code,
                error_body = %error_body,
                "Gemini API returned error status"
            );

            if status_code == 429 {
                return Err(GeminiError::RateLimited(error_body));
            }
            return Err(GeminiError::Status {
                status: status_code,
                body: error_body,
            });
        }

        let response_body = response.text().await?;
        let parsed: GeminiApiResponse = serde_json::from_str(&response_body)
            .map_err(|e| GeminiError::Parse(format!("{} - Response body: {}", e, response_body)))?;

        extract_text(parsed)
    }
}

fn extract_text(parsed: GeminiApiResponse) -> Result<String, GeminiError> {
    if let Some(reason) = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
    {
        return Err(GeminiError::Blocked(reason.clone()));
    }

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or(GeminiError::EmptyResponse("contains no candidates"))?;

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or(GeminiError::EmptyResponse("candidate contains no parts"))?;

    if text.is_empty() {
        return Err(GeminiError::EmptyResponse("text is empty"));
    }

    tracing::debug!(
        response_len = text.len(),
        finish_reason = ?candidate.finish_reason,
        "Received response from Gemini API"
    );

    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        self.generate_content(prompt).await
    }
}
