//! Structured parser backed by lopdf.

use crate::error::{ExtractError, Result};
use crate::pdf::{DocumentPages, StructuredParser};
use std::path::Path;

/// In-process PDF parser; no external binary involved.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfParser;

struct LoadedPdf {
    doc: lopdf::Document,
    /// Page numbers in page-tree order.
    pages: Vec<u32>,
}

impl DocumentPages for LoadedPdf {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String> {
        let number = self
            .pages
            .get(page.wrapping_sub(1))
            .ok_or_else(|| ExtractError::page(page, "page out of range"))?;
        self.doc
            .extract_text(&[*number])
            .map_err(|e| ExtractError::page(page, e.to_string()))
    }
}

impl StructuredParser for LopdfParser {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentPages>> {
        let doc = lopdf::Document::load(path).map_err(|e| {
            ExtractError::document_open_with_source(format!("{}: {}", path.display(), e), e)
        })?;
        let pages = doc.get_pages().into_keys().collect();
        Ok(Box::new(LoadedPdf { doc, pages }))
    }
}
