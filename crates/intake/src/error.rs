use thiserror::Error;

use crate::completion::CompletionError;
use crate::ocr::OcrError;

/// Fatal pipeline errors surfaced to the caller.
///
/// Digital-extraction failures never appear here: they are recovered
/// locally by falling back to OCR. OCR and completion failures are
/// surfaced unmodified, with no transient/permanent distinction and no
/// retry.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The declared media type is not PDF; nothing was processed.
    #[error("only PDF uploads are accepted, got {0:?}")]
    UnsupportedMediaType(String),

    /// The optical-recognition pass failed; no further fallback exists.
    #[error(transparent)]
    Ocr(#[from] OcrError),

    /// The completion service call failed.
    #[error(transparent)]
    Completion(#[from] CompletionError),
}
