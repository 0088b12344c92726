//! Error types for textmill.
//!
//! All fallible operations in the library return [`Result`], built on the
//! [`ExtractError`] enum. Errors follow a strict propagation policy:
//!
//! - Per-page failures ([`ExtractError::PageExtractFailed`] and per-page
//!   recognition failures) are absorbed where they occur: logged, counted,
//!   excluded from output. They never abort the containing extraction.
//! - Per-document failures surface as a `Failure` outcome to the batch
//!   coordinator, which isolates them from sibling documents.
//! - Nothing escapes the pipeline boundary: `ExtractionPipeline::process`
//!   is a total function over its inputs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all extraction operations.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to open document: {message}")]
    DocumentOpenFailed {
        message: String,
        #[source]
        source: Option<Source>,
    },

    /// Per-page structured extraction failure. Always absorbed by the
    /// adapter; carried here so page context survives into logs.
    #[error("failed to extract page {page}: {message}")]
    PageExtractFailed { page: usize, message: String },

    #[error("rasterization failed: {message}")]
    RasterizationFailed {
        message: String,
        #[source]
        source: Option<Source>,
    },

    /// Per-page OCR failure. Absorbed by the OCR adapter.
    #[error("text recognition failed: {message}")]
    RecognitionFailed {
        message: String,
        #[source]
        source: Option<Source>,
    },

    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("no text could be extracted from the document")]
    NoTextExtracted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ExtractError {
    /// Create a DocumentOpenFailed error.
    pub fn document_open<S: Into<String>>(message: S) -> Self {
        Self::DocumentOpenFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a DocumentOpenFailed error with source.
    pub fn document_open_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DocumentOpenFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a PageExtractFailed error.
    pub fn page<S: Into<String>>(page: usize, message: S) -> Self {
        Self::PageExtractFailed {
            page,
            message: message.into(),
        }
    }

    /// Create a RasterizationFailed error.
    pub fn rasterization<S: Into<String>>(message: S) -> Self {
        Self::RasterizationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a RasterizationFailed error with source.
    pub fn rasterization_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RasterizationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a RecognitionFailed error.
    pub fn recognition<S: Into<String>>(message: S) -> Self {
        Self::RecognitionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a RecognitionFailed error with source.
    pub fn recognition_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RecognitionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The flat taxonomy kind for this error, carried in `Failure` outcomes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DocumentOpenFailed { .. } => ErrorKind::DocumentOpenFailed,
            Self::PageExtractFailed { .. } => ErrorKind::PageExtractFailed,
            Self::RasterizationFailed { .. } => ErrorKind::RasterizationFailed,
            Self::RecognitionFailed { .. } => ErrorKind::RecognitionFailed,
            Self::CapabilityUnavailable(_) => ErrorKind::CapabilityUnavailable,
            Self::NoTextExtracted => ErrorKind::NoTextExtracted,
            Self::Io(_) | Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// Flat, serializable error taxonomy carried in `Failure` outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DocumentOpenFailed,
    PageExtractFailed,
    RasterizationFailed,
    RecognitionFailed,
    CapabilityUnavailable,
    NoTextExtracted,
    Unexpected,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::DocumentOpenFailed => "document_open_failed",
            Self::PageExtractFailed => "page_extract_failed",
            Self::RasterizationFailed => "rasterization_failed",
            Self::RecognitionFailed => "recognition_failed",
            Self::CapabilityUnavailable => "capability_unavailable",
            Self::NoTextExtracted => "no_text_extracted",
            Self::Unexpected => "unexpected",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_open_error() {
        let err = ExtractError::document_open("corrupt header");
        assert_eq!(err.to_string(), "failed to open document: corrupt header");
        assert_eq!(err.kind(), ErrorKind::DocumentOpenFailed);
    }

    #[test]
    fn test_document_open_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad data");
        let err = ExtractError::document_open_with_source("corrupt header", source);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_page_error_carries_page_number() {
        let err = ExtractError::page(3, "content stream truncated");
        assert_eq!(err.to_string(), "failed to extract page 3: content stream truncated");
        assert_eq!(err.kind(), ErrorKind::PageExtractFailed);
    }

    #[test]
    fn test_recognition_error() {
        let err = ExtractError::recognition("engine produced no output");
        assert_eq!(err.kind(), ErrorKind::RecognitionFailed);
        assert!(err.to_string().contains("text recognition failed"));
    }

    #[test]
    fn test_rasterization_error_with_source() {
        let source = std::io::Error::other("spawn failed");
        let err = ExtractError::rasterization_with_source("failed to run pdftoppm", source);
        assert_eq!(err.kind(), ErrorKind::RasterizationFailed);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_maps_to_unexpected_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExtractError = io_err.into();
        assert!(matches!(err, ExtractError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_no_text_extracted_display() {
        let err = ExtractError::NoTextExtracted;
        assert_eq!(err.to_string(), "no text could be extracted from the document");
        assert_eq!(err.kind(), ErrorKind::NoTextExtracted);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NoTextExtracted).unwrap();
        assert_eq!(json, "\"no_text_extracted\"");
        assert_eq!(ErrorKind::CapabilityUnavailable.to_string(), "capability_unavailable");
    }
}
