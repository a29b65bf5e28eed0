//! The document intake state machine.

use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::error::IntakeError;
use crate::extract::TextExtractor;
use crate::ocr::OcrEngine;

/// The only media type the pipeline accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Instruction template for the field-extraction completion call.
///
/// `{doc_text}` is replaced with the extracted document text.
const FIELD_EXTRACTION_PROMPT: &str = "\
You are a medical document parser.
Extract ONLY the following fields from the text:
- Patient Name
- Date of Birth (MM/DD/YYYY)

If not found, return null for that field.

Text:
{doc_text}
";

/// Stages of the intake state machine.
///
/// ```text
/// TypeCheck ──► DigitalExtract ──┬──────────────► FieldExtraction ──► Done
///     │              (empty text)└► OpticalFallback ──┘    │
///     └──────────────────────────────────┴─────► Failed ◄──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStage {
    TypeCheck,
    DigitalExtract,
    OpticalFallback,
    FieldExtraction,
    Done,
    Failed,
}

impl std::fmt::Display for IntakeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IntakeStage::TypeCheck => "type_check",
            IntakeStage::DigitalExtract => "digital_extract",
            IntakeStage::OpticalFallback => "optical_fallback",
            IntakeStage::FieldExtraction => "field_extraction",
            IntakeStage::Done => "done",
            IntakeStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Language profile passed to the OCR engine.
    pub ocr_language: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            ocr_language: "eng".to_string(),
        }
    }
}

/// The 4-stage document intake pipeline.
///
/// Stages run strictly sequentially within one request. Digital-extraction
/// failures are recovered by falling back to OCR; OCR and completion
/// failures are fatal and surfaced unmodified. The output is the raw
/// completion response.
pub struct DocumentIntake {
    extractor: Arc<dyn TextExtractor>,
    ocr: Arc<dyn OcrEngine>,
    completion: Arc<dyn CompletionClient>,
    config: IntakeConfig,
}

impl DocumentIntake {
    /// Creates a pipeline over the given collaborators.
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        ocr: Arc<dyn OcrEngine>,
        completion: Arc<dyn CompletionClient>,
        config: IntakeConfig,
    ) -> Self {
        Self {
            extractor,
            ocr,
            completion,
            config,
        }
    }

    /// Runs the pipeline over one document.
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn process(&self, data: &[u8], media_type: &str) -> Result<String, IntakeError> {
        metrics::counter!("intake_requests_total").increment(1);

        let mut stage = IntakeStage::TypeCheck;
        let mut text = String::new();

        loop {
            match stage {
                IntakeStage::TypeCheck => {
                    if media_type != PDF_MEDIA_TYPE {
                        return Err(self.fail(
                            stage,
                            IntakeError::UnsupportedMediaType(media_type.to_string()),
                        ));
                    }
                    stage = self.advance(stage, IntakeStage::DigitalExtract);
                }
                IntakeStage::DigitalExtract => {
                    match self.extractor.extract_text(data).await {
                        Ok(extracted) => text = extracted.trim().to_string(),
                        // Recoverable: an unreadable text layer falls
                        // through to OCR with empty intermediate text.
                        Err(e) => {
                            tracing::warn!(error = %e, "digital extraction failed, trying OCR");
                        }
                    }
                    let next = if text.is_empty() {
                        IntakeStage::OpticalFallback
                    } else {
                        IntakeStage::FieldExtraction
                    };
                    stage = self.advance(stage, next);
                }
                IntakeStage::OpticalFallback => {
                    metrics::counter!("intake_ocr_fallbacks_total").increment(1);
                    match self.ocr.recognize(data, &self.config.ocr_language).await {
                        Ok(recognized) => text = recognized,
                        Err(e) => return Err(self.fail(stage, e.into())),
                    }
                    stage = self.advance(stage, IntakeStage::FieldExtraction);
                }
                IntakeStage::FieldExtraction => {
                    let prompt = FIELD_EXTRACTION_PROMPT.replace("{doc_text}", &text);
                    match self.completion.complete(&prompt).await {
                        Ok(response) => {
                            self.advance(stage, IntakeStage::Done);
                            metrics::counter!("intake_completed_total").increment(1);
                            return Ok(response);
                        }
                        Err(e) => return Err(self.fail(stage, e.into())),
                    }
                }
                // Terminal stages return out of the arms that reach them.
                IntakeStage::Done | IntakeStage::Failed => {
                    unreachable!("terminal intake stage in driver loop")
                }
            }
        }
    }

    fn advance(&self, from: IntakeStage, to: IntakeStage) -> IntakeStage {
        tracing::debug!(%from, %to, "intake stage transition");
        to
    }

    fn fail(&self, from: IntakeStage, err: IntakeError) -> IntakeError {
        metrics::counter!("intake_failures_total").increment(1);
        tracing::error!(%from, error = %err, "intake pipeline failed");
        err
    }
}
