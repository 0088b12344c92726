//! OCR extraction adapter: rasterize, preprocess, recognize.

use crate::core::config::ExtractionConfig;
use crate::error::{ExtractError, Result};
use crate::ocr::preprocess::preprocess;
use crate::ocr::{OcrEngine, Rasterizer, RecognitionOptions};
use crate::text::page_marker;
use crate::types::{Document, PageStats, SystemCapabilities};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Extracts text from a document by rasterizing every page and recognizing
/// each page image.
///
/// Pages are recognized with bounded parallelism but reassembled in strict
/// page order before concatenation. A page whose recognition fails is
/// logged and skipped, never retried (recognition failures are typically
/// deterministic for the same image); extraction as a whole fails only
/// when the document cannot be rasterized at all or when the required
/// capabilities are absent.
pub struct OcrExtractor {
    rasterizer: Arc<dyn Rasterizer>,
    engine: Arc<dyn OcrEngine>,
    options: RecognitionOptions,
    capabilities: SystemCapabilities,
    max_concurrent_pages: usize,
}

impl OcrExtractor {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        engine: Arc<dyn OcrEngine>,
        capabilities: SystemCapabilities,
        config: &ExtractionConfig,
    ) -> Self {
        Self {
            rasterizer,
            engine,
            options: RecognitionOptions::from(&config.ocr),
            capabilities,
            max_concurrent_pages: config.max_concurrent_pages.unwrap_or_else(num_cpus::get),
        }
    }

    pub async fn extract(&self, doc: &Document, dpi: u32) -> Result<(String, PageStats)> {
        if !self.capabilities.rasterizer {
            return Err(ExtractError::CapabilityUnavailable(
                "rasterizer (pdftoppm) is not available".into(),
            ));
        }
        if !self.capabilities.ocr_engine {
            return Err(ExtractError::CapabilityUnavailable(
                "OCR engine (tesseract) is not available".into(),
            ));
        }

        tracing::info!(document = %doc.file_name(), dpi, "starting OCR extraction");

        let images = self.rasterizer.rasterize(doc.path(), dpi).await?;
        let pages_total = images.len();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_pages));
        let mut tasks = JoinSet::new();
        for (index, image) in images.into_iter().enumerate() {
            let engine = Arc::clone(&self.engine);
            let options = self.options.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            index,
                            Err(ExtractError::Unexpected("page worker pool shut down".into())),
                        );
                    }
                };
                let prepared = match tokio::task::spawn_blocking(move || preprocess(&image)).await {
                    Ok(prepared) => prepared,
                    Err(e) => {
                        return (
                            index,
                            Err(ExtractError::Unexpected(format!("preprocessing task failed: {e}"))),
                        );
                    }
                };
                let result = engine.recognize(&prepared, &options).await;
                (index, result)
            });
        }

        // Reassemble in page order; completion order carries no meaning.
        let mut slots: Vec<Option<String>> = vec![None; pages_total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(text))) => slots[index] = Some(text),
                Ok((index, Err(err))) => {
                    tracing::warn!(page = index + 1, error = %err, "skipping page that failed recognition");
                }
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "page recognition task panicked");
                }
            }
        }

        let mut text = String::new();
        let mut pages_processed = 0;
        for (index, slot) in slots.into_iter().enumerate() {
            if let Some(content) = slot {
                pages_processed += 1;
                if !content.trim().is_empty() {
                    text.push_str(&page_marker(index + 1));
                    text.push_str(&content);
                    text.push('\n');
                }
            }
        }

        tracing::info!(
            document = %doc.file_name(),
            pages_processed,
            pages_total,
            chars = text.len(),
            "OCR extraction completed"
        );

        Ok((
            text,
            PageStats {
                pages_processed,
                pages_total,
            },
        ))
    }
}
