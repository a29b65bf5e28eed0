//! Digital text-layer extraction.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;

/// Error from a digital extraction attempt.
///
/// Always recoverable at the pipeline level: the document falls through
/// to OCR.
#[derive(Debug, Error)]
#[error("text extraction failed: {0}")]
pub struct ExtractError(pub String);

/// Extracts the embedded text layer of a PDF.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, data: &[u8]) -> Result<String, ExtractError>;
}

/// Extractor over the `pdf-extract` parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTextExtractor;

#[async_trait]
impl TextExtractor for EmbeddedTextExtractor {
    async fn extract_text(&self, data: &[u8]) -> Result<String, ExtractError> {
        // The parser panics on some malformed files; contain that and
        // report it as an ordinary extraction failure.
        let owned = data.to_vec();
        let outcome =
            std::panic::catch_unwind(move || pdf_extract::extract_text_from_mem(&owned));
        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractError(e.to_string())),
            Err(_) => Err(ExtractError("parser panicked on malformed input".to_string())),
        }
    }
}

/// Canned extractor for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedTextExtractor {
    text: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl FixedTextExtractor {
    /// Creates an extractor that always returns the given text.
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            calls: Arc::default(),
        }
    }

    /// Creates an extractor that always fails.
    pub fn failing() -> Self {
        Self {
            text: None,
            calls: Arc::default(),
        }
    }

    /// Number of times `extract_text` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for FixedTextExtractor {
    async fn extract_text(&self, _data: &[u8]) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => Err(ExtractError("injected extraction failure".to_string())),
        }
    }
}
