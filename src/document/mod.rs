//! PDF ingestion
//!
//! Turns uploaded bytes into the text stored for a session.

pub mod extractor;

pub use extractor::{ExtractionError, PdfTextExtractor, TextExtractor};

/// Result of reading an uploaded PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Total number of pages in the file
    pub page_count: usize,
    /// Page texts each followed by a newline; empty pages are skipped
    pub text: String,
}

impl ExtractedText {
    /// Join page texts, appending a newline after each non-empty page
    pub fn from_pages(pages: Vec<String>) -> Self {
        let page_count = pages.len();
        let mut text = String::new();
        for page in pages.iter().filter(|p| !p.is_empty()) {
            text.push_str(page);
            text.push('\n');
        }
        Self { page_count, text }
    }

    /// Number of characters in the untrimmed text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Text with surrounding whitespace removed
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// Whether an upload's file name is accepted as a PDF
///
/// Exact, case-sensitive suffix match.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.ends_with(".pdf")
}
