//! Prompt composition
//!
//! Builds the flat text blocks sent to the generator: the chat context
//! (document excerpt plus recent turns) and the upload summary prompt.

use crate::config::ContextLimits;
use crate::session::Message;

/// Opening marker of the document block in a chat context
pub const DOCUMENT_HEADER: &str = "=== DOCUMENT CONTEXT ===";

/// Closing marker of the document block in a chat context
pub const DOCUMENT_FOOTER: &str = "=== END DOCUMENT ===";

/// Longest prefix of `text` holding at most `max_chars` characters
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Composes prompts within configured limits
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextBuilder {
    limits: ContextLimits,
}

impl ContextBuilder {
    /// Create a builder with the given limits
    pub fn new(limits: ContextLimits) -> Self {
        Self { limits }
    }

    /// Limits in effect
    pub fn limits(&self) -> ContextLimits {
        self.limits
    }

    /// Chat context for one turn
    ///
    /// `history` must already contain the new user message as its last entry.
    /// Only the trailing `history_messages` entries are rendered.
    pub fn chat_context(&self, document: Option<&str>, history: &[Message]) -> String {
        let mut parts = Vec::new();

        if let Some(text) = document {
            parts.push(format!(
                "{}\n{}\n{}\n",
                DOCUMENT_HEADER,
                char_prefix(text, self.limits.document_chars),
                DOCUMENT_FOOTER
            ));
        }

        let start = history.len().saturating_sub(self.limits.history_messages);
        for message in &history[start..] {
            parts.push(format!("{}: {}", message.role.label(), message.content));
        }

        parts.join("\n")
    }

    /// Prompt asking for a short summary of an uploaded document
    pub fn summary_prompt(&self, text: &str) -> String {
        format!(
            "Analyze this document and provide a concise summary covering:\n\
             1. Main topic/subject\n\
             2. Key points (3-5 bullet points)\n\
             3. Document type/purpose\n\
             \n\
             Document content:\n\
             {}\n\
             \n\
             Keep the summary clear and under 150 words.",
            char_prefix(text, self.limits.summary_chars)
        )
    }
}
