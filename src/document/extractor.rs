//! PDF text extraction
//!
//! Page-by-page extraction backed by `lopdf`.

use lopdf::Document;
use thiserror::Error;

/// Errors raised while reading a PDF
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The bytes could not be loaded as a PDF
    #[error("Failed to load PDF: {0}")]
    Load(String),

    /// A page's content stream could not be decoded
    #[error("Failed to extract text from page {page}: {reason}")]
    Page {
        /// 1-indexed page number
        page: u32,
        /// Underlying library message
        reason: String,
    },
}

/// Splits a PDF into the text of each of its pages
pub trait TextExtractor: Send + Sync {
    /// Text of every page, in page order
    ///
    /// The returned vector has one entry per page, including pages that
    /// yield no text.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// `lopdf`-based extractor
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Load(e.to_string()))?;

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_num in pages.keys() {
            let text = doc
                .extract_text(&[*page_num])
                .map_err(|e| ExtractionError::Page {
                    page: *page_num,
                    reason: e.to_string(),
                })?;
            texts.push(text);
        }
        Ok(texts)
    }
}
