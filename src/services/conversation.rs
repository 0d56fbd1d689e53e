//! Conversation/document service
//!
//! Owns the session store and the two external collaborators. Every
//! operation takes the session explicitly; the HTTP layer passes the
//! default session.

use crate::document::{is_pdf_filename, ExtractedText, TextExtractor};
use crate::error::{AppError, GENERATION_FAILED_MESSAGE};
use crate::generation::TextGenerator;
use crate::services::context::ContextBuilder;
use crate::session::{Message, SessionId, SessionStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Summary returned when the generator could not produce one
pub const FALLBACK_SUMMARY: &str =
    "PDF uploaded successfully! The document has been processed and is ready for questions.";

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Total pages in the PDF
    pub page_count: usize,
    /// Generated summary, or [`FALLBACK_SUMMARY`]
    pub summary: String,
    /// Characters in the extracted text before trimming
    pub character_count: usize,
}

/// Result of a successful chat turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    /// Trimmed model reply
    pub reply: String,
    /// Whether the session holds a document
    pub has_document: bool,
    /// Conversation length after the turn
    pub history_length: usize,
}

/// Read-only view of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySnapshot {
    /// Full conversation, oldest first
    pub messages: Vec<Message>,
    /// Whether the session holds a document
    pub has_document: bool,
}

/// Store-wide counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// Always "healthy" while the process serves requests
    pub status: &'static str,
    /// Sessions holding a conversation
    pub active_sessions: usize,
    /// Sessions holding a document
    pub documents_loaded: usize,
}

/// The conversation/document service
pub struct ConversationService {
    store: SessionStore,
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn TextGenerator>,
    context: ContextBuilder,
}

impl ConversationService {
    /// Create a service with an empty store
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn TextGenerator>,
        context: ContextBuilder,
    ) -> Self {
        Self {
            store: SessionStore::new(),
            extractor,
            generator,
            context,
        }
    }

    /// Extract a PDF, store its text for the session, and summarize it
    ///
    /// # Errors
    /// * `InvalidInput` - `filename` does not end in `.pdf`
    /// * `ProcessingError` - the extractor failed
    /// * `UnprocessableDocument` - the PDF yielded no text
    pub async fn upload_document(
        &self,
        session: &SessionId,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadOutcome, AppError> {
        if !is_pdf_filename(filename) {
            return Err(AppError::InvalidInput(
                "Please upload a valid PDF file".to_string(),
            ));
        }

        let byte_len = bytes.len();
        let extractor = Arc::clone(&self.extractor);
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&bytes))
            .await
            .map_err(|e| AppError::ProcessingError(e.to_string()))?
            .map_err(|e| {
                error!(filename = %filename, error = %e, "PDF extraction failed");
                AppError::ProcessingError(e.to_string())
            })?;

        let extracted = ExtractedText::from_pages(pages);
        let trimmed = extracted.trimmed();
        if trimmed.is_empty() {
            return Err(AppError::UnprocessableDocument(
                "PDF appears to be empty or unreadable".to_string(),
            ));
        }

        {
            let _turn = self.store.turn_lock(session).await;
            self.store.put_document(session, trimmed.to_string()).await;
        }

        info!(
            session = %session,
            filename = %filename,
            bytes = byte_len,
            pages = extracted.page_count,
            characters = extracted.char_count(),
            "Document stored"
        );

        let summary = self.summarize(&extracted.text).await;

        Ok(UploadOutcome {
            page_count: extracted.page_count,
            summary,
            character_count: extracted.char_count(),
        })
    }

    async fn summarize(&self, text: &str) -> String {
        let prompt = self.context.summary_prompt(text);
        match self.generator.generate(&prompt).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Summary generation failed, using fallback");
                FALLBACK_SUMMARY.to_string()
            }
        }
    }

    /// Run one chat turn
    ///
    /// The turn holds the session's turn lock from appending the prompt
    /// until the reply is appended, so concurrent turns never interleave.
    ///
    /// # Errors
    /// * `InvalidInput` - the prompt is blank; history is unchanged
    /// * `GenerationError` - the generator failed; the prompt stays in history
    pub async fn chat(
        &self,
        session: &SessionId,
        prompt: &str,
        use_document: bool,
    ) -> Result<ChatOutcome, AppError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::InvalidInput("Prompt cannot be empty".to_string()));
        }

        let _turn = self.store.turn_lock(session).await;

        self.store
            .append_message(session, Message::user(prompt))
            .await;

        let document = if use_document {
            self.store.document(session).await
        } else {
            None
        };
        let recent = self
            .store
            .recent_messages(session, self.context.limits().history_messages)
            .await;
        let context = self
            .context
            .chat_context(document.as_ref().map(|d| d.text.as_str()), &recent);

        let reply = self.generator.generate(&context).await.map_err(|e| {
            error!(session = %session, error = %e, "Error in chat generation");
            AppError::GenerationError(GENERATION_FAILED_MESSAGE.to_string())
        })?;
        let reply = reply.trim().to_string();

        let history_length = self
            .store
            .append_message(session, Message::assistant(reply.clone()))
            .await;

        info!(
            session = %session,
            context_len = context.len(),
            with_document = document.is_some(),
            reply_len = reply.len(),
            history_length,
            "Chat turn completed"
        );

        Ok(ChatOutcome {
            reply,
            has_document: self.store.has_document(session).await,
            history_length,
        })
    }

    /// Full history and document presence of a session
    pub async fn history(&self, session: &SessionId) -> HistorySnapshot {
        HistorySnapshot {
            messages: self.store.messages(session).await,
            has_document: self.store.has_document(session).await,
        }
    }

    /// Drop both the conversation and the document of a session
    pub async fn reset(&self, session: &SessionId) {
        let _turn = self.store.turn_lock(session).await;
        let history_cleared = self.store.remove_conversation(session).await;
        let document_cleared = self.store.remove_document(session).await;
        info!(
            session = %session,
            history_cleared,
            document_cleared,
            "Session reset"
        );
    }

    /// Drop the document of a session, returning whether one existed
    pub async fn clear_document(&self, session: &SessionId) -> bool {
        let _turn = self.store.turn_lock(session).await;
        self.store.remove_document(session).await
    }

    /// Store-wide counts
    pub async fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy",
            active_sessions: self.store.conversation_count().await,
            documents_loaded: self.store.document_count().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextLimits;
    use crate::document::ExtractionError;
    use crate::generation::GeminiError;
    use crate::services::context::{DOCUMENT_FOOTER, DOCUMENT_HEADER};
    use crate::session::MessageRole;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeExtractor {
        pages: Vec<String>,
        fail: bool,
    }

    impl FakeExtractor {
        fn pages(pages: &[&str]) -> Self {
            Self {
                pages: pages.iter().map(|p| p.to_string()).collect(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                pages: Vec::new(),
                fail: true,
            }
        }
    }

    impl TextExtractor for FakeExtractor {
        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
            if self.fail {
                return Err(ExtractionError::Load("invalid file header".to_string()));
            }
            Ok(self.pages.clone())
        }
    }

    /// Records prompts and replies with "reply N", or fails every call
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        fail: bool,
        delay: Duration,
    }

    impl RecordingGenerator {
        fn ok() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail: false,
                delay: Duration::ZERO,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::ok()
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        fn last_prompt(&self) -> String {
            self.prompts().last().cloned().expect("no prompt recorded")
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
            let n = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                prompts.len()
            };
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(GeminiError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(format!("  reply {}  ", n))
        }
    }

    fn service(
        extractor: FakeExtractor,
        generator: Arc<RecordingGenerator>,
    ) -> ConversationService {
        ConversationService::new(
            Arc::new(extractor),
            generator,
            ContextBuilder::new(ContextLimits::default()),
        )
    }

    fn session() -> SessionId {
        SessionId::default()
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf_name() {
        let generator = Arc::new(RecordingGenerator::ok());
        let svc = service(FakeExtractor::pages(&["text"]), generator.clone());

        for name in ["notes.txt", "report.PDF", "pdf"] {
            let result = svc.upload_document(&session(), b"%PDF".to_vec(), name).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }
        assert!(generator.prompts().is_empty());
        assert!(!svc.history(&session()).await.has_document);
    }

    #[tokio::test]
    async fn test_upload_empty_text_is_unprocessable() {
        let svc = service(
            FakeExtractor::pages(&["", "   "]),
            Arc::new(RecordingGenerator::ok()),
        );
        let result = svc.upload_document(&session(), vec![], "blank.pdf").await;
        assert!(matches!(result, Err(AppError::UnprocessableDocument(_))));
        assert!(!svc.history(&session()).await.has_document);
    }

    #[tokio::test]
    async fn test_upload_extraction_failure_is_processing_error() {
        let svc = service(FakeExtractor::failing(), Arc::new(RecordingGenerator::ok()));
        let result = svc.upload_document(&session(), vec![1, 2, 3], "bad.pdf").await;
        match result {
            Err(AppError::ProcessingError(message)) => {
                assert!(message.contains("invalid file header"));
            }
            other => panic!("Expected ProcessingError, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_counts_and_summary() {
        let generator = Arc::new(RecordingGenerator::ok());
        let svc = service(FakeExtractor::pages(&["Alpha.", "Beta."]), generator.clone());

        let outcome = svc
            .upload_document(&session(), b"%PDF".to_vec(), "two.pdf")
            .await
            .expect("upload should succeed");

        assert_eq!(outcome.page_count, 2);
        assert_eq!(outcome.character_count, 13);
        assert_eq!(outcome.summary, "reply 1");
        assert!(generator.last_prompt().contains("Alpha.\nBeta."));
        assert!(svc.history(&session()).await.has_document);
    }

    #[tokio::test]
    async fn test_upload_summary_failure_falls_back() {
        let svc = service(
            FakeExtractor::pages(&["content"]),
            Arc::new(RecordingGenerator::failing()),
        );
        let outcome = svc
            .upload_document(&session(), vec![], "doc.pdf")
            .await
            .expect("upload must not fail on summary errors");
        assert_eq!(outcome.summary, FALLBACK_SUMMARY);
        assert!(svc.history(&session()).await.has_document);
    }

    #[tokio::test]
    async fn test_upload_overwrites_previous_document() {
        let generator = Arc::new(RecordingGenerator::ok());
        let svc = ConversationService::new(
            Arc::new(FakeExtractor::pages(&["first"])),
            generator.clone(),
            ContextBuilder::default(),
        );
        svc.upload_document(&session(), vec![], "a.pdf").await.unwrap();
        let svc_second = ConversationService {
            extractor: Arc::new(FakeExtractor::pages(&["second"])),
            ..svc
        };
        svc_second
            .upload_document(&session(), vec![], "b.pdf")
            .await
            .unwrap();

        svc_second.chat(&session(), "what?", true).await.unwrap();
        let prompt = generator.last_prompt();
        assert!(prompt.contains("second"));
        assert!(!prompt.contains("first"));
        assert_eq!(svc_second.health().await.documents_loaded, 1);
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected_without_touching_history() {
        let generator = Arc::new(RecordingGenerator::ok());
        let svc = service(FakeExtractor::pages(&[]), generator.clone());
        svc.chat(&session(), "hello", true).await.unwrap();

        for prompt in ["", "   ", "\n\t"] {
            let result = svc.chat(&session(), prompt, true).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }
        assert_eq!(svc.history(&session()).await.messages.len(), 2);
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_sequential_chats_grow_history_in_order() {
        let svc = service(FakeExtractor::pages(&[]), Arc::new(RecordingGenerator::ok()));

        for i in 0..3 {
            let outcome = svc
                .chat(&session(), &format!("  question {}  ", i), true)
                .await
                .unwrap();
            assert_eq!(outcome.history_length, 2 * (i + 1));
            assert_eq!(outcome.reply, format!("reply {}", i + 1));
            assert!(!outcome.has_document);
        }

        let history = svc.history(&session()).await.messages;
        assert_eq!(history.len(), 6);
        for (i, pair) in history.chunks(2).enumerate() {
            assert_eq!(pair[0], Message::user(format!("question {}", i)));
            assert_eq!(pair[1], Message::assistant(format!("reply {}", i + 1)));
        }
    }

    #[tokio::test]
    async fn test_document_markers_follow_presence_and_flag() {
        let generator = Arc::new(RecordingGenerator::ok());
        let svc = service(FakeExtractor::pages(&["Doc body"]), generator.clone());

        svc.chat(&session(), "no doc yet", true).await.unwrap();
        assert!(!generator.last_prompt().contains(DOCUMENT_HEADER));

        svc.upload_document(&session(), vec![], "d.pdf").await.unwrap();

        let outcome = svc.chat(&session(), "with doc", true).await.unwrap();
        assert!(outcome.has_document);
        let prompt = generator.last_prompt();
        assert!(prompt.starts_with(DOCUMENT_HEADER));
        assert!(prompt.contains(DOCUMENT_FOOTER));
        assert!(prompt.contains("Doc body"));

        let outcome = svc.chat(&session(), "doc disabled", false).await.unwrap();
        assert!(outcome.has_document);
        let prompt = generator.last_prompt();
        assert!(!prompt.contains(DOCUMENT_HEADER));
        assert!(!prompt.contains(DOCUMENT_FOOTER));
    }

    #[tokio::test]
    async fn test_new_prompt_is_last_context_line() {
        let generator = Arc::new(RecordingGenerator::ok());
        let svc = service(FakeExtractor::pages(&[]), generator.clone());

        for i in 0..100 {
            svc.chat(&session(), &format!("q{}", i), true).await.unwrap();
        }

        let prompt = generator.last_prompt();
        let lines: Vec<&str> = prompt.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(*lines.last().unwrap(), "User: q99");
        assert_eq!(lines[0], "Assistant: reply 95");
        assert_eq!(lines[1], "User: q95");
        assert_eq!(svc.history(&session()).await.messages.len(), 200);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_prompt() {
        let svc = service(
            FakeExtractor::pages(&[]),
            Arc::new(RecordingGenerator::failing()),
        );
        let result = svc.chat(&session(), "hello", true).await;
        match result {
            Err(AppError::GenerationError(message)) => {
                assert_eq!(message, GENERATION_FAILED_MESSAGE)
            }
            other => panic!("Expected GenerationError, got: {:?}", other),
        }

        let history = svc.history(&session()).await.messages;
        assert_eq!(history, vec![Message::user("hello")]);
    }

    #[tokio::test]
    async fn test_reset_clears_document_only_session() {
        let svc = service(FakeExtractor::pages(&["text"]), Arc::new(RecordingGenerator::ok()));
        svc.upload_document(&session(), vec![], "x.pdf").await.unwrap();

        svc.reset(&session()).await;
        let snapshot = svc.history(&session()).await;
        assert!(snapshot.messages.is_empty());
        assert!(!snapshot.has_document);

        // Idempotent.
        svc.reset(&session()).await;
        assert_eq!(svc.health().await.documents_loaded, 0);
    }

    #[tokio::test]
    async fn test_clear_document_keeps_history() {
        let svc = service(FakeExtractor::pages(&["text"]), Arc::new(RecordingGenerator::ok()));
        svc.upload_document(&session(), vec![], "x.pdf").await.unwrap();
        svc.chat(&session(), "hi", true).await.unwrap();

        assert!(svc.clear_document(&session()).await);
        assert!(!svc.clear_document(&session()).await);

        let snapshot = svc.history(&session()).await;
        assert!(!snapshot.has_document);
        assert_eq!(snapshot.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_health_counts() {
        let svc = service(FakeExtractor::pages(&["text"]), Arc::new(RecordingGenerator::ok()));
        let report = svc.health().await;
        assert_eq!(report.status, "healthy");
        assert_eq!(report.active_sessions, 0);
        assert_eq!(report.documents_loaded, 0);

        svc.chat(&SessionId::new("a"), "hi", true).await.unwrap();
        svc.upload_document(&SessionId::new("b"), vec![], "b.pdf")
            .await
            .unwrap();
        svc.chat(&SessionId::default(), "hi", true).await.unwrap();

        let report = svc.health().await;
        assert_eq!(report.active_sessions, 2);
        assert_eq!(report.documents_loaded, 1);
    }

    #[tokio::test]
    async fn test_concurrent_turns_are_serialized() {
        let svc = Arc::new(service(
            FakeExtractor::pages(&[]),
            Arc::new(RecordingGenerator::slow(Duration::from_millis(20))),
        ));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.chat(&session(), &format!("p{}", i), true).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("task panicked").expect("chat failed");
        }

        let history = svc.history(&session()).await.messages;
        assert_eq!(history.len(), 8);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[1].role, MessageRole::Assistant);
        }
    }
}
