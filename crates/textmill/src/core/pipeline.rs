//! Extraction pipeline: strategy selection, fallback, and result assembly.
//!
//! `process` is a total function: every path through it, including
//! provider errors and panicked worker tasks, terminates in an
//! [`ExtractionOutcome`]. No error escapes to the caller.

use crate::core::capabilities::CapabilityProbe;
use crate::core::config::ExtractionConfig;
use crate::error::{ExtractError, Result};
use crate::ocr::{OcrEngine, OcrExtractor, PopplerRasterizer, Rasterizer, TesseractEngine};
use crate::pdf::{LopdfParser, StructuredExtractor, StructuredParser};
use crate::text::{normalize, strip_page_markers};
use crate::types::{
    Document, ExtractionMethod, ExtractionOutcome, ExtractionSuccess, PageStats, ProcessOptions,
    SystemCapabilities,
};
use std::sync::Arc;
use std::time::Instant;

pub struct ExtractionPipeline {
    structured: StructuredExtractor,
    ocr: OcrExtractor,
    capabilities: SystemCapabilities,
    config: ExtractionConfig,
}

impl ExtractionPipeline {
    /// Build a pipeline with the default providers (lopdf, pdftoppm,
    /// tesseract), probing external capabilities once up front.
    pub async fn new(config: ExtractionConfig) -> Self {
        let capabilities = CapabilityProbe::new(config.capabilities.clone()).probe().await;
        tracing::info!(?capabilities, "extraction pipeline initialized");

        let rasterizer = Arc::new(PopplerRasterizer::new(&config.capabilities));
        let engine = Arc::new(TesseractEngine::new(&config.capabilities));
        Self::with_providers(Arc::new(LopdfParser), rasterizer, engine, capabilities, config)
    }

    /// Build a pipeline from injected providers and pre-computed
    /// capabilities.
    pub fn with_providers(
        parser: Arc<dyn StructuredParser>,
        rasterizer: Arc<dyn Rasterizer>,
        engine: Arc<dyn OcrEngine>,
        capabilities: SystemCapabilities,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            structured: StructuredExtractor::new(parser),
            ocr: OcrExtractor::new(rasterizer, engine, capabilities, &config),
            capabilities,
            config,
        }
    }

    /// Probed capability flags; read-only for the pipeline lifetime.
    pub fn capabilities(&self) -> &SystemCapabilities {
        &self.capabilities
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract with flags derived from the configuration.
    pub async fn process(&self, doc: &Document) -> ExtractionOutcome {
        let options = ProcessOptions {
            use_ocr: self.config.force_ocr,
            fallback_to_ocr: self.config.fallback_to_ocr,
            dpi: self.config.ocr.dpi,
        };
        self.process_with(doc, &options).await
    }

    /// Extract one document with explicit flags.
    pub async fn process_with(&self, doc: &Document, options: &ProcessOptions) -> ExtractionOutcome {
        let started = Instant::now();
        tracing::info!(document = %doc.file_name(), use_ocr = options.use_ocr, "processing document");

        let attempt = self.select_and_extract(doc, options).await;
        let outcome = match attempt {
            Err(outcome) => outcome,
            Ok((raw, stats, method)) => match self.finish(raw, stats, method, started) {
                Ok(success) => ExtractionOutcome::Success(success),
                Err(err) => ExtractionOutcome::failure(&err),
            },
        };

        match &outcome {
            ExtractionOutcome::Success(success) => {
                tracing::info!(
                    document = %doc.file_name(),
                    method = success.method.label(),
                    chars = success.char_count,
                    elapsed = ?started.elapsed(),
                    "document processed"
                );
            }
            ExtractionOutcome::Failure { reason, message } => {
                tracing::error!(document = %doc.file_name(), %reason, message, "document failed");
            }
        }
        outcome
    }

    /// Run the state machine up to raw text: forced OCR is terminal, the
    /// structured path may fall back to OCR on error or empty output.
    async fn select_and_extract(
        &self,
        doc: &Document,
        options: &ProcessOptions,
    ) -> std::result::Result<(String, PageStats, ExtractionMethod), ExtractionOutcome> {
        let ocr_method = ExtractionMethod::Ocr { dpi: options.dpi };

        if options.use_ocr {
            return match self.ocr.extract(doc, options.dpi).await {
                Ok((text, stats)) => Ok((text, stats, ocr_method)),
                Err(err) => Err(ExtractionOutcome::failure(&err)),
            };
        }

        match self.structured.extract(doc).await {
            Ok((text, stats)) if !text.trim().is_empty() => {
                Ok((text, stats, ExtractionMethod::Structured))
            }
            Ok(_) if options.fallback_to_ocr => {
                tracing::info!(document = %doc.file_name(), "structured extraction yielded no text, falling back to OCR");
                match self.ocr.extract(doc, options.dpi).await {
                    Ok((text, stats)) => Ok((text, stats, ocr_method)),
                    Err(err) => Err(ExtractionOutcome::failure(&err)),
                }
            }
            Ok(_) => Err(ExtractionOutcome::failure(&ExtractError::NoTextExtracted)),
            Err(err) if options.fallback_to_ocr => {
                tracing::info!(document = %doc.file_name(), error = %err, "structured extraction failed, falling back to OCR");
                match self.ocr.extract(doc, options.dpi).await {
                    Ok((text, stats)) => Ok((text, stats, ocr_method)),
                    Err(ocr_err) => Err(ExtractionOutcome::Failure {
                        reason: ocr_err.kind(),
                        message: format!(
                            "both structured extraction and OCR failed; structured: {err}; ocr: {ocr_err}"
                        ),
                    }),
                }
            }
            Err(err) => Err(ExtractionOutcome::failure(&err)),
        }
    }

    /// Normalize the winning text and assemble the success record.
    /// Normalization never turns a real failure into a success: empty
    /// normalized output surfaces as `NoTextExtracted`.
    fn finish(
        &self,
        raw: String,
        stats: PageStats,
        method: ExtractionMethod,
        started: Instant,
    ) -> Result<ExtractionSuccess> {
        let stripped = strip_page_markers(&raw);
        let text = normalize(&stripped);
        if text.trim().is_empty() {
            return Err(ExtractError::NoTextExtracted);
        }

        let char_count = text.chars().count();
        let word_count = text.split_whitespace().count();
        Ok(ExtractionSuccess {
            text,
            pages_processed: stats.pages_processed,
            pages_total: stats.pages_total,
            method,
            char_count,
            word_count,
            duration: started.elapsed(),
        })
    }
}
