//! Image-based extraction: rasterization, preprocessing, and recognition.
//!
//! The rasterizer and OCR engine are external capability providers behind
//! traits; the default implementations shell out to poppler's pdftoppm and
//! to tesseract.

mod extractor;
mod poppler;
pub mod preprocess;
mod tesseract;

pub use extractor::OcrExtractor;
pub use poppler::PopplerRasterizer;
pub use tesseract::TesseractEngine;

use crate::core::config::OcrConfig;
use crate::error::Result;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::Path;
use std::time::Duration;

/// Engine and layout settings for one recognition call.
#[derive(Debug, Clone)]
pub struct RecognitionOptions {
    pub language: String,
    /// Engine mode. 3 = default neural engine.
    pub oem: u8,
    /// Page segmentation mode. 6 = assume a single uniform block of text.
    pub psm: u8,
    /// Upper bound for one engine invocation.
    pub timeout: Duration,
}

impl From<&OcrConfig> for RecognitionOptions {
    fn from(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            oem: config.oem,
            psm: config.psm,
            timeout: config.timeout(),
        }
    }
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self::from(&OcrConfig::default())
    }
}

/// Converts PDF pages into bitmap images at a given resolution.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Rasterize every page of the document, in page order.
    async fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>>;
}

/// Recognizes text in a page image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &DynamicImage, options: &RecognitionOptions) -> Result<String>;
}
