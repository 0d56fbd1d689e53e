//! Session state
//!
//! Documents and conversations keyed by session, held in memory.

pub mod models;
pub mod store;

pub use models::{Conversation, Document, Message, MessageRole, SessionId, DEFAULT_SESSION_ID};
pub use store::SessionStore;
