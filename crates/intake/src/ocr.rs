//! Optical character recognition over a rasterized document.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;

/// Error from the optical-recognition engine.
///
/// Fatal at the pipeline level: there is no fallback after OCR.
#[derive(Debug, Error)]
#[error("optical recognition failed: {0}")]
pub struct OcrError(pub String);

/// Runs character recognition over a document.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognizes text using the given language profile.
    async fn recognize(&self, data: &[u8], language: &str) -> Result<String, OcrError>;
}

/// OCR engine that shells out to the `tesseract` binary.
///
/// The document is staged in a temporary file and recognized text is read
/// from stdout; a non-zero exit is an engine failure.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: String,
}

impl TesseractCli {
    /// Creates an engine driving the given binary.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, data: &[u8], language: &str) -> Result<String, OcrError> {
        let mut input = tempfile::NamedTempFile::new()
            .map_err(|e| OcrError(format!("failed to stage input: {e}")))?;
        input
            .write_all(data)
            .and_then(|()| input.flush())
            .map_err(|e| OcrError(format!("failed to stage input: {e}")))?;

        let output = tokio::process::Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .args(["-l", language])
            .output()
            .await
            .map_err(|e| OcrError(format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Canned engine for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedOcrEngine {
    text: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl FixedOcrEngine {
    /// Creates an engine that always returns the given text.
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            calls: Arc::default(),
        }
    }

    /// Creates an engine that always fails.
    pub fn failing() -> Self {
        Self {
            text: None,
            calls: Arc::default(),
        }
    }

    /// Number of times `recognize` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FixedOcrEngine {
    async fn recognize(&self, _data: &[u8], _language: &str) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => Err(OcrError("injected recognition failure".to_string())),
        }
    }
}
