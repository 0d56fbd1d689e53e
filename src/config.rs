//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Generation collaborator configuration
    pub gemini: GeminiConfig,
    /// Context window limits
    pub context: ContextLimits,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
}

/// Gemini client configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; `None` means every generation call fails
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// REST base URL
    pub base_url: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

// Keep the key out of logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_API_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Limits applied when composing prompts for the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    /// Characters of document text included in a chat context
    pub document_chars: usize,
    /// Number of most recent messages included in a chat context
    pub history_messages: usize,
    /// Characters of document text included in the summary prompt
    pub summary_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            document_chars: 3000,
            history_messages: 10,
            summary_chars: 4000,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let gemini_defaults = GeminiConfig::default();
        let context_defaults = ContextLimits::default();

        Self {
            server: ServerConfig {
                port: parse_var("PORT").unwrap_or(8000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES").unwrap_or(20 * 1024 * 1024),
            },
            gemini: GeminiConfig {
                api_key: non_blank_var("GOOGLE_API_KEY")
                    .or_else(|| non_blank_var("GEMINI_API_KEY")),
                model: env::var("GEMINI_MODEL").unwrap_or(gemini_defaults.model),
                base_url: env::var("GEMINI_API_BASE_URL").unwrap_or(gemini_defaults.base_url),
                timeout_secs: parse_var("GEMINI_TIMEOUT_SECS")
                    .unwrap_or(gemini_defaults.timeout_secs),
            },
            context: ContextLimits {
                document_chars: parse_var("CONTEXT_DOCUMENT_CHARS")
                    .unwrap_or(context_defaults.document_chars),
                history_messages: parse_var("CONTEXT_HISTORY_MESSAGES")
                    .unwrap_or(context_defaults.history_messages),
                summary_chars: parse_var("SUMMARY_DOCUMENT_CHARS")
                    .unwrap_or(context_defaults.summary_chars),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
