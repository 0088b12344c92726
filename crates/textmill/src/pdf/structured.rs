//! Structured extraction adapter.

use crate::error::{ExtractError, Result};
use crate::pdf::StructuredParser;
use crate::text::page_marker;
use crate::types::{Document, PageStats};
use std::path::Path;
use std::sync::Arc;

/// Pulls the embedded text layer page by page.
///
/// A page that fails to parse is logged and skipped, excluded from
/// `pages_processed`; extraction overall fails only when the document
/// cannot be opened at all. The raw output may be empty, the caller owns
/// fallback.
pub struct StructuredExtractor {
    parser: Arc<dyn StructuredParser>,
}

impl StructuredExtractor {
    pub fn new(parser: Arc<dyn StructuredParser>) -> Self {
        Self { parser }
    }

    pub async fn extract(&self, doc: &Document) -> Result<(String, PageStats)> {
        let parser = Arc::clone(&self.parser);
        let path = doc.path().to_path_buf();
        let name = doc.file_name();

        tracing::info!(document = %name, "starting structured extraction");

        // Parsing is CPU-bound, keep it off the async threads.
        let (text, stats) = tokio::task::spawn_blocking(move || extract_pages(parser.as_ref(), &path))
            .await
            .map_err(|e| ExtractError::Unexpected(format!("structured extraction task failed: {e}")))??;

        tracing::info!(
            document = %name,
            pages_processed = stats.pages_processed,
            pages_total = stats.pages_total,
            chars = text.len(),
            "structured extraction completed"
        );
        Ok((text, stats))
    }
}

fn extract_pages(parser: &dyn StructuredParser, path: &Path) -> Result<(String, PageStats)> {
    let pages = parser.open(path)?;
    let pages_total = pages.page_count();

    let mut text = String::new();
    let mut pages_processed = 0;
    for page in 1..=pages_total {
        match pages.page_text(page) {
            Ok(content) => {
                pages_processed += 1;
                if !content.trim().is_empty() {
                    text.push_str(&page_marker(page));
                    text.push_str(&content);
                    text.push('\n');
                }
            }
            Err(err) => {
                tracing::warn!(page, error = %err, "skipping unreadable page");
            }
        }
    }

    Ok((
        text,
        PageStats {
            pages_processed,
            pages_total,
        },
    ))
}
