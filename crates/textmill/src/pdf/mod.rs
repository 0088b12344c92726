//! Structured extraction: pulling the embedded text layer from a PDF
//! without rendering an image.

mod lopdf_backend;
mod structured;

pub use lopdf_backend::LopdfParser;
pub use structured::StructuredExtractor;

use crate::error::Result;
use std::path::Path;

/// An opened document exposing its page tree and embedded text layer.
pub trait DocumentPages: Send {
    fn page_count(&self) -> usize;

    /// Text of the given 1-based page.
    fn page_text(&self, page: usize) -> Result<String>;
}

/// Capability provider for structured parsing.
///
/// Implementations are synchronous; the adapter runs them on a blocking
/// thread.
pub trait StructuredParser: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentPages>>;
}
