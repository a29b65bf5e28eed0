//! Document intake pipeline.
//!
//! Converts an uploaded PDF into extracted text via a layered fallback
//! (embedded text layer, then OCR) and then into a structured-field
//! completion from an external language-model service. The three external
//! collaborators are injected behind traits so every fallback and
//! fatal-vs-recoverable transition can be exercised without real services.

pub mod completion;
pub mod error;
pub mod extract;
pub mod ocr;
pub mod pipeline;

pub use completion::{
    CompletionClient, CompletionError, HttpCompletionClient, HttpCompletionConfig,
    MockCompletionClient,
};
pub use error::IntakeError;
pub use extract::{EmbeddedTextExtractor, ExtractError, FixedTextExtractor, TextExtractor};
pub use ocr::{FixedOcrEngine, OcrEngine, OcrError, TesseractCli};
pub use pipeline::{DocumentIntake, IntakeConfig, IntakeStage, PDF_MEDIA_TYPE};
