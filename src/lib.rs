//! PDF Chat Backend Library
//!
//! Upload a PDF, get a summary, and chat with a hosted model using the
//! document's text as context. The server binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod generation;
pub mod services;
/// Session state management
///
/// Documents and conversations keyed by session, held in memory.
pub mod session;
