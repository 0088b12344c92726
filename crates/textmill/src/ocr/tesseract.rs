//! OCR engine backed by the tesseract binary.

use crate::core::config::CapabilityConfig;
use crate::error::{ExtractError, Result};
use crate::ocr::{OcrEngine, RecognitionOptions};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tokio::time::timeout;

/// Shells out to `tesseract <image> stdout` with explicit engine and page
/// segmentation modes. One invocation per page image, bounded by the
/// configured timeout; failures are per-page and absorbed by the caller.
pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    pub fn new(config: &CapabilityConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &DynamicImage, options: &RecognitionOptions) -> Result<String> {
        // tesseract reads from disk, so the page image goes through a
        // temporary PNG. Encoding is CPU work, keep it off the async threads.
        let image = image.clone();
        let scratch: NamedTempFile = tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
            let file = tempfile::Builder::new()
                .prefix("textmill-page-")
                .suffix(".png")
                .tempfile()
                .map_err(|e| ExtractError::recognition_with_source("failed to create scratch image", e))?;
            image
                .save(file.path())
                .map_err(|e| ExtractError::recognition_with_source("failed to encode page image", e))?;
            Ok(file)
        })
        .await
        .map_err(|e| ExtractError::Unexpected(format!("image encode task failed: {e}")))??;

        let run = Command::new(&self.binary)
            .arg(scratch.path())
            .arg("stdout")
            .arg("-l")
            .arg(&options.language)
            .arg("--oem")
            .arg(options.oem.to_string())
            .arg("--psm")
            .arg(options.psm.to_string())
            .output();
        let output = timeout(options.timeout, run)
            .await
            .map_err(|_| {
                ExtractError::recognition(format!(
                    "tesseract timed out after {}s",
                    options.timeout.as_secs()
                ))
            })?
            .map_err(|e| ExtractError::recognition_with_source("failed to run tesseract", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
