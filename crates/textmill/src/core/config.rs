//! Configuration for the extraction pipeline.
//!
//! All structs are serde-derived with per-field defaults so partial TOML
//! files work. Binary locations for the external engines are explicit
//! configuration, not process-environment probing.

use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default rasterization resolution. Balances recognition accuracy against
/// processing time.
pub const DEFAULT_OCR_DPI: u32 = 300;

/// Main extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Force OCR even for PDFs with an embedded text layer.
    #[serde(default)]
    pub force_ocr: bool,

    /// Fall back to OCR when structured extraction fails or yields no text.
    #[serde(default = "default_true")]
    pub fallback_to_ocr: bool,

    /// OCR engine settings.
    #[serde(default)]
    pub ocr: OcrConfig,

    /// External binary locations and probe behavior.
    #[serde(default)]
    pub capabilities: CapabilityConfig,

    /// Maximum concurrent document extractions in batch operations
    /// (None = num_cpus * 2).
    #[serde(default)]
    pub max_concurrent_extractions: Option<usize>,

    /// Maximum concurrent page recognitions within one document
    /// (None = num_cpus).
    #[serde(default)]
    pub max_concurrent_pages: Option<usize>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            force_ocr: false,
            fallback_to_ocr: true,
            ocr: OcrConfig::default(),
            capabilities: CapabilityConfig::default(),
            max_concurrent_extractions: None,
            max_concurrent_pages: None,
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ExtractError::Unexpected(format!("invalid config file {}: {}", path.display(), e))
        })
    }
}

/// OCR engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Rasterization resolution in dots per inch.
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Recognition language code (e.g. "eng", "deu").
    #[serde(default = "default_language")]
    pub language: String,

    /// Engine mode. 3 = default neural engine.
    #[serde(default = "default_oem")]
    pub oem: u8,

    /// Page segmentation mode. 6 = assume a single uniform block of text.
    #[serde(default = "default_psm")]
    pub psm: u8,

    /// Per-invocation timeout for engine calls, in seconds.
    #[serde(default = "default_ocr_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            language: default_language(),
            oem: default_oem(),
            psm: default_psm(),
            timeout_secs: default_ocr_timeout_secs(),
        }
    }
}

impl OcrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// External binary locations and probe behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityConfig {
    /// Rasterizer binary (poppler's pdftoppm).
    #[serde(default = "default_pdftoppm")]
    pub pdftoppm_path: PathBuf,

    /// OCR engine binary.
    #[serde(default = "default_tesseract")]
    pub tesseract_path: PathBuf,

    /// Upper bound for each availability check.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Upper bound for a whole-document rasterization call, in seconds.
    #[serde(default = "default_rasterize_timeout_secs")]
    pub rasterize_timeout_secs: u64,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            pdftoppm_path: default_pdftoppm(),
            tesseract_path: default_tesseract(),
            probe_timeout_secs: default_probe_timeout_secs(),
            rasterize_timeout_secs: default_rasterize_timeout_secs(),
        }
    }
}

impl CapabilityConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn rasterize_timeout(&self) -> Duration {
        Duration::from_secs(self.rasterize_timeout_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_dpi() -> u32 {
    DEFAULT_OCR_DPI
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_oem() -> u8 {
    3
}

fn default_psm() -> u8 {
    6
}

fn default_ocr_timeout_secs() -> u64 {
    120
}

fn default_pdftoppm() -> PathBuf {
    PathBuf::from("pdftoppm")
}

fn default_tesseract() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_probe_timeout_secs() -> u64 {
    10
}

fn default_rasterize_timeout_secs() -> u64 {
    300
}
