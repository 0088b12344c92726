//! Textmill - PDF text extraction with automatic OCR fallback.
//!
//! Textmill converts PDF documents into normalized plain text. It prefers
//! the fast structured path (pulling the embedded text layer) and falls
//! back to rasterization plus optical character recognition for scanned
//! documents, with per-page error isolation on both paths.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use textmill::{Document, ExtractionConfig, ExtractionOutcome, ExtractionPipeline};
//!
//! # async fn example() -> textmill::Result<()> {
//! let pipeline = ExtractionPipeline::new(ExtractionConfig::default()).await;
//! let doc = Document::open("document.pdf").await?;
//! match pipeline.process(&doc).await {
//!     ExtractionOutcome::Success(success) => println!("{}", success.text),
//!     ExtractionOutcome::Failure { reason, message } => {
//!         eprintln!("extraction failed ({reason}): {message}")
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): pipeline state machine, batch coordination,
//!   capability probing, configuration
//! - **PDF** (`pdf`): structured extraction through the embedded text layer
//! - **OCR** (`ocr`): rasterization, image preprocessing, recognition
//! - **Text** (`text`): output normalization
//!
//! The PDF parser, rasterizer, and OCR engine are external capability
//! providers behind traits; their availability is probed, never assumed.

#![deny(unsafe_code)]

pub mod artifact;
pub mod core;
pub mod error;
pub mod ocr;
pub mod pdf;
pub mod text;
pub mod types;

pub use crate::core::batch::{CancellationFlag, process_batch, process_batch_paths};
pub use crate::core::capabilities::CapabilityProbe;
pub use crate::core::config::{CapabilityConfig, DEFAULT_OCR_DPI, ExtractionConfig, OcrConfig};
pub use crate::core::pipeline::ExtractionPipeline;
pub use crate::error::{ErrorKind, ExtractError, Result};
pub use crate::types::{
    BatchItem, BatchOutcome, Document, ExtractionMethod, ExtractionOutcome, ExtractionSuccess,
    PageStats, ProcessOptions, SystemCapabilities,
};
