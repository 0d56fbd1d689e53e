//! Gemini API request and response types
//!
//! Structs that mirror the `generateContent` JSON format.

use serde::{Deserialize, Serialize};

/// Top-level Gemini API response
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiResponse {
    /// List of candidate responses from the model
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Optional feedback about the prompt (e.g., if it was blocked)
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A single candidate response from the model
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of this candidate
    #[serde(default)]
    pub content: Option<Content>,
    /// Why the model stopped generating
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content structure containing parts of the response
#[derive(Deserialize, Debug)]
pub struct Content {
    /// List of content parts (typically one text part)
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single part of content
#[derive(Deserialize, Debug)]
pub struct Part {
    /// The text content of this part
    #[serde(default)]
    pub text: String,
}

/// Feedback about the prompt
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Request body for `generateContent`
#[derive(Serialize, Debug)]
pub struct GeminiApiRequest {
    /// List of content items to send
    pub contents: Vec<RequestContent>,
}

impl GeminiApiRequest {
    /// A request carrying a single text prompt
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

/// Content structure for requests
#[derive(Serialize, Debug)]
pub struct RequestContent {
    /// List of content parts
    pub parts: Vec<RequestPart>,
}

/// A single text part for requests
#[derive(Serialize, Debug)]
pub struct RequestPart {
    /// The text content
    pub text: String,
}
