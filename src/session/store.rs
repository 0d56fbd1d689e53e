//! In-memory session store
//!
//! Holds documents and conversations keyed by session. Lives for the lifetime
//! of the process; nothing is persisted.

use crate::session::models::{Conversation, Document, Message, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Key-value store for session documents and conversations
///
/// Individual operations are atomic. Multi-step mutations of one session
/// (append prompt, call the model, append reply) are serialized by holding
/// the guard returned from [`SessionStore::turn_lock`].
#[derive(Debug, Default)]
pub struct SessionStore {
    documents: RwLock<HashMap<SessionId, Document>>,
    conversations: RwLock<HashMap<SessionId, Conversation>>,
    turn_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the per-session turn lock
    ///
    /// Locks nobody holds or waits on are dropped from the map first, so it
    /// only tracks sessions with a turn in progress.
    pub async fn turn_lock(&self, session: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.turn_locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(session.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of sessions with a tracked turn lock
    pub async fn tracked_turn_locks(&self) -> usize {
        self.turn_locks.lock().await.len()
    }

    /// Store a document, replacing any previous one for the session
    pub async fn put_document(&self, session: &SessionId, text: String) {
        let document = Document {
            session_id: session.clone(),
            text,
        };
        self.documents.write().await.insert(session.clone(), document);
    }

    /// Get a copy of the session's document
    pub async fn document(&self, session: &SessionId) -> Option<Document> {
        self.documents.read().await.get(session).cloned()
    }

    /// Whether the session holds a document
    pub async fn has_document(&self, session: &SessionId) -> bool {
        self.documents.read().await.contains_key(session)
    }

    /// Remove the session's document, returning whether one existed
    pub async fn remove_document(&self, session: &SessionId) -> bool {
        self.documents.write().await.remove(session).is_some()
    }

    /// Append a message, creating the conversation if absent
    ///
    /// Returns the conversation length after the append.
    pub async fn append_message(&self, session: &SessionId, message: Message) -> usize {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .entry(session.clone())
            .or_insert_with(|| Conversation::new(session.clone()));
        conversation.messages.push(message);
        conversation.messages.len()
    }

    /// Copy of the last `n` messages of the session, oldest first
    pub async fn recent_messages(&self, session: &SessionId, n: usize) -> Vec<Message> {
        self.conversations
            .read()
            .await
            .get(session)
            .map(|c| c.recent(n).to_vec())
            .unwrap_or_default()
    }

    /// Copy of the full message history of the session
    pub async fn messages(&self, session: &SessionId) -> Vec<Message> {
        self.conversations
            .read()
            .await
            .get(session)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Remove the session's conversation, returning whether one existed
    pub async fn remove_conversation(&self, session: &SessionId) -> bool {
        self.conversations.write().await.remove(session).is_some()
    }

    /// Number of sessions holding a conversation
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Number of sessions holding a document
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }
}
