//! Core data model: documents, extraction outcomes, batch results, and
//! probed system capabilities.

use crate::error::{ErrorKind, ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One input PDF, validated on construction. Immutable once accepted;
/// owned by the pipeline for the duration of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    byte_len: u64,
}

impl Document {
    /// Validate and accept a PDF document path.
    ///
    /// The file must exist, be a regular file, and carry a `.pdf`
    /// extension (case-insensitive).
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            ExtractError::document_open_with_source(format!("{}: {}", path.display(), e), e)
        })?;
        if !metadata.is_file() {
            return Err(ExtractError::document_open(format!(
                "{}: not a regular file",
                path.display()
            )));
        }

        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(ExtractError::document_open(format!(
                "{}: not a PDF file",
                path.display()
            )));
        }

        Ok(Self {
            path,
            byte_len: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// File name component, lossily decoded.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Which extraction path produced a result, with method-specific metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text layer pulled straight from the PDF.
    Structured,
    /// Rasterize-and-recognize at the given resolution.
    Ocr { dpi: u32 },
}

impl ExtractionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Ocr { .. } => "ocr",
        }
    }
}

/// Per-document page accounting produced by both adapters.
///
/// `pages_processed` counts pages that parsed or recognized successfully,
/// even when they contained no text; `pages_total` counts pages attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStats {
    pub pages_processed: usize,
    pub pages_total: usize,
}

/// A successful extraction. `text` is guaranteed non-empty and
/// non-whitespace-only; the pipeline surfaces `NoTextExtracted` instead of
/// ever constructing an empty success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSuccess {
    pub text: String,
    pub pages_processed: usize,
    pub pages_total: usize,
    pub method: ExtractionMethod,
    pub char_count: usize,
    pub word_count: usize,
    pub duration: Duration,
}

impl ExtractionSuccess {
    /// Wall-clock processing time in seconds.
    pub fn processing_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Result of one extraction call: either a success record or a failure
/// labeled with the error taxonomy kind and a human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Success(ExtractionSuccess),
    Failure { reason: ErrorKind, message: String },
}

impl ExtractionOutcome {
    /// Build a failure outcome from an error, preserving its taxonomy kind.
    pub fn failure(err: &ExtractError) -> Self {
        Self::Failure {
            reason: err.kind(),
            message: err.to_string(),
        }
    }

    /// Build a failure outcome with the `Unexpected` kind.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Failure {
            reason: ErrorKind::Unexpected,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn as_success(&self) -> Option<&ExtractionSuccess> {
        match self {
            Self::Success(s) => Some(s),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_success(self) -> Option<ExtractionSuccess> {
        match self {
            Self::Success(s) => Some(s),
            Self::Failure { .. } => None,
        }
    }
}

/// One slot of a batch result, annotated with its 1-based position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub batch_index: usize,
    pub batch_total: usize,
    pub outcome: ExtractionOutcome,
}

/// Ordered batch result: one item per input document, input order
/// preserved regardless of completion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub items: Vec<BatchItem>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of documents that extracted successfully.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_success()).count()
    }
}

/// Availability of the external capability providers, probed once and
/// read-only afterwards. Safe to share across workers unsynchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCapabilities {
    pub structured_parser: bool,
    pub rasterizer: bool,
    pub ocr_engine: bool,
}

impl SystemCapabilities {
    /// Whether the OCR path is usable end to end.
    pub fn ocr_ready(&self) -> bool {
        self.rasterizer && self.ocr_engine
    }

    /// All capabilities present.
    pub fn all() -> Self {
        Self {
            structured_parser: true,
            rasterizer: true,
            ocr_engine: true,
        }
    }
}

/// Per-call extraction flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Force the OCR path; no fallback in the other direction.
    pub use_ocr: bool,
    /// Fall back to OCR when structured extraction fails or yields nothing.
    pub fallback_to_ocr: bool,
    /// Rasterization resolution for the OCR path.
    pub dpi: u32,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            use_ocr: false,
            fallback_to_ocr: true,
            dpi: crate::core::config::DEFAULT_OCR_DPI,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_document_open_missing_file() {
        let err = Document::open("/nonexistent/input.pdf").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentOpenFailed);
        // the underlying I/O error is reported, not a fixed label
        let message = err.to_string();
        assert!(message.contains("/nonexistent/input.pdf"));
        assert!(message.contains("os error"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn test_document_open_rejects_non_pdf_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "plain text").unwrap();
        let err = Document::open(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("not a PDF file"));
    }

    #[tokio::test]
    async fn test_document_open_accepts_pdf() {
        let mut file = tempfile::Builder::new().suffix(".PDF").tempfile().unwrap();
        file.write_all(b"%PDF-1.4").unwrap();
        let doc = Document::open(file.path()).await.unwrap();
        assert_eq!(doc.byte_len(), 8);
        assert!(doc.file_name().to_lowercase().ends_with(".pdf"));
    }

    #[test]
    fn test_outcome_serialization_tags_status() {
        let outcome = ExtractionOutcome::Failure {
            reason: ErrorKind::NoTextExtracted,
            message: "no text could be extracted from the document".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["reason"], "no_text_extracted");
    }

    #[test]
    fn test_success_serialization_carries_method_metadata() {
        let outcome = ExtractionOutcome::Success(ExtractionSuccess {
            text: "Hello".into(),
            pages_processed: 1,
            pages_total: 1,
            method: ExtractionMethod::Ocr { dpi: 300 },
            char_count: 5,
            word_count: 1,
            duration: Duration::from_millis(20),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["method"]["name"], "ocr");
        assert_eq!(json["method"]["dpi"], 300);
    }

    #[test]
    fn test_batch_outcome_succeeded_count() {
        let outcome = BatchOutcome {
            items: vec![
                BatchItem {
                    batch_index: 1,
                    batch_total: 2,
                    outcome: ExtractionOutcome::unexpected("boom"),
                },
                BatchItem {
                    batch_index: 2,
                    batch_total: 2,
                    outcome: ExtractionOutcome::Success(ExtractionSuccess {
                        text: "ok".into(),
                        pages_processed: 1,
                        pages_total: 1,
                        method: ExtractionMethod::Structured,
                        char_count: 2,
                        word_count: 1,
                        duration: Duration::ZERO,
                    }),
                },
            ],
        };
        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.succeeded(), 1);
    }

    #[test]
    fn test_capabilities_ocr_ready() {
        let mut caps = SystemCapabilities::all();
        assert!(caps.ocr_ready());
        caps.ocr_engine = false;
        assert!(!caps.ocr_ready());
    }
}
