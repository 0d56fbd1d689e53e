//! Session data models
//!
//! Defines the session key, documents, conversations and messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Session identifier used by the HTTP surface
pub const DEFAULT_SESSION_ID: &str = "default";

/// Key under which a session's document and conversation are stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_ID)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user
    User,
    /// Message from the assistant/AI
    Assistant,
}

impl MessageRole {
    /// Convert the role to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Speaker label used when rendering a transcript for the model
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a message from the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a message from the assistant
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered message history of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    /// Owning session
    pub session_id: SessionId,
    /// Messages in chronological order
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: Vec::new(),
        }
    }

    /// The last `n` messages, oldest first
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

/// Extracted text of the most recently uploaded PDF for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Owning session
    pub session_id: SessionId,
    /// Full extracted text, trimmed
    pub text: String,
}
