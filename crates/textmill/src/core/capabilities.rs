//! Capability probe for the external engines.
//!
//! Determines whether the rasterizer (pdftoppm) and OCR engine (tesseract)
//! are usable in the current environment. Each check runs the binary with
//! its version flag under a bounded timeout and degrades to `false` on
//! timeout, non-zero exit, or a missing binary; the probe itself never
//! fails. Results are safe to cache for the process lifetime since
//! capability does not change at runtime in practice.

use crate::core::config::CapabilityConfig;
use crate::types::SystemCapabilities;
use std::ffi::OsStr;
use tokio::process::Command;
use tokio::time::timeout;

/// Pure function of [`CapabilityConfig`]: no environment mutation, no side
/// effects beyond running the version checks.
#[derive(Debug, Clone)]
pub struct CapabilityProbe {
    config: CapabilityConfig,
}

impl CapabilityProbe {
    pub fn new(config: CapabilityConfig) -> Self {
        Self { config }
    }

    /// Probe all capability providers. Idempotent.
    ///
    /// The structured parser is in-process and always available; the
    /// flag exists for injected providers and for the public contract.
    pub async fn probe(&self) -> SystemCapabilities {
        let rasterizer = self.check(&self.config.pdftoppm_path, &["-v"]).await;
        let ocr_engine = self.check(&self.config.tesseract_path, &["--version"]).await;

        if !rasterizer {
            tracing::warn!("pdftoppm not available, rasterization disabled");
        }
        if !ocr_engine {
            tracing::warn!("tesseract not available, OCR disabled");
        }

        SystemCapabilities {
            structured_parser: true,
            rasterizer,
            ocr_engine,
        }
    }

    async fn check(&self, binary: impl AsRef<OsStr>, args: &[&str]) -> bool {
        let binary = binary.as_ref();
        let run = Command::new(binary).args(args).output();
        match timeout(self.config.probe_timeout(), run).await {
            Ok(Ok(output)) if output.status.success() => {
                tracing::debug!(binary = %binary.to_string_lossy(), "capability check passed");
                true
            }
            Ok(Ok(output)) => {
                tracing::warn!(
                    binary = %binary.to_string_lossy(),
                    status = %output.status,
                    "capability check exited non-zero"
                );
                false
            }
            Ok(Err(err)) => {
                tracing::warn!(binary = %binary.to_string_lossy(), error = %err, "capability check failed to run");
                false
            }
            Err(_) => {
                tracing::warn!(binary = %binary.to_string_lossy(), "capability check timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_missing_binaries_degrade_to_false() {
        let probe = CapabilityProbe::new(CapabilityConfig {
            pdftoppm_path: PathBuf::from("/nonexistent/pdftoppm"),
            tesseract_path: PathBuf::from("/nonexistent/tesseract"),
            ..CapabilityConfig::default()
        });
        let caps = probe.probe().await;
        assert!(caps.structured_parser);
        assert!(!caps.rasterizer);
        assert!(!caps.ocr_engine);
        assert!(!caps.ocr_ready());
    }

    #[tokio::test]
    async fn test_probe_is_idempotent() {
        let probe = CapabilityProbe::new(CapabilityConfig {
            pdftoppm_path: PathBuf::from("/nonexistent/pdftoppm"),
            tesseract_path: PathBuf::from("/nonexistent/tesseract"),
            ..CapabilityConfig::default()
        });
        assert_eq!(probe.probe().await, probe.probe().await);
    }
}
