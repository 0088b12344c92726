//! Rasterizer backed by poppler's pdftoppm.

use crate::core::config::CapabilityConfig;
use crate::error::{ExtractError, Result};
use crate::ocr::Rasterizer;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Renders pages into a scratch directory as PNG and decodes them in page
/// order. The scratch directory is removed when rasterization completes.
pub struct PopplerRasterizer {
    binary: PathBuf,
    timeout: Duration,
}

impl PopplerRasterizer {
    pub fn new(config: &CapabilityConfig) -> Self {
        Self {
            binary: config.pdftoppm_path.clone(),
            timeout: config.rasterize_timeout(),
        }
    }
}

#[async_trait]
impl Rasterizer for PopplerRasterizer {
    async fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        let scratch = tempfile::tempdir()
            .map_err(|e| ExtractError::rasterization_with_source("failed to create scratch directory", e))?;
        let prefix = scratch.path().join("page");

        tracing::debug!(path = %path.display(), dpi, "rasterizing document");

        let run = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(path)
            .arg(&prefix)
            .output();
        let output = timeout(self.timeout, run)
            .await
            .map_err(|_| {
                ExtractError::rasterization(format!(
                    "pdftoppm timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ExtractError::rasterization_with_source("failed to run pdftoppm", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::rasterization(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // Decode off the async threads; the scratch dir must outlive the decode.
        tokio::task::spawn_blocking(move || decode_page_images(scratch.path()))
            .await
            .map_err(|e| ExtractError::Unexpected(format!("image decode task failed: {e}")))?
    }
}

/// Collect and decode `page-*.png` outputs in page order. pdftoppm
/// zero-pads page numbers, so a lexical sort yields page order.
fn decode_page_images(dir: &Path) -> Result<Vec<DynamicImage>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| ExtractError::rasterization_with_source("failed to read scratch directory", e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(ExtractError::rasterization("pdftoppm produced no page images"));
    }

    let mut images = Vec::with_capacity(files.len());
    for file in &files {
        let img = image::open(file).map_err(|e| {
            ExtractError::rasterization_with_source(format!("failed to decode {}", file.display()), e)
        })?;
        images.push(img);
    }
    Ok(images)
}
