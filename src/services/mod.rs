//! Service layer for business logic
//!
//! This module contains the conversation/document service and the prompt
//! composition it relies on, separated from HTTP handlers.

pub mod context;
pub mod conversation;

pub use context::ContextBuilder;
pub use conversation::{
    ChatOutcome, ConversationService, HealthReport, HistorySnapshot, UploadOutcome,
    FALLBACK_SUMMARY,
};
