//! Shared mock capability providers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, Luma};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use textmill::ocr::{OcrEngine, Rasterizer, RecognitionOptions};
use textmill::pdf::{DocumentPages, StructuredParser};
use textmill::{
    CancellationFlag, Document, ExtractError, ExtractionConfig, ExtractionPipeline, Result,
    SystemCapabilities,
};

/// Width of the first mock page image; page `i` is `BASE_WIDTH + i` wide
/// so the mock engine can tell pages apart regardless of completion order.
pub const BASE_WIDTH: u32 = 10;

#[derive(Debug, Clone)]
pub enum PageScript {
    Text(&'static str),
    Fail,
}

/// Structured parser with a fixed page script.
pub struct ScriptedParser {
    pages: Vec<PageScript>,
    fail_open: Option<&'static str>,
    pub open_calls: AtomicUsize,
}

impl ScriptedParser {
    pub fn with_pages(pages: Vec<PageScript>) -> Self {
        Self {
            pages,
            fail_open: None,
            open_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_open(message: &'static str) -> Self {
        Self {
            pages: Vec::new(),
            fail_open: Some(message),
            open_calls: AtomicUsize::new(0),
        }
    }

    pub fn open_count(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }
}

struct ScriptedPages {
    pages: Vec<PageScript>,
}

impl DocumentPages for ScriptedPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String> {
        match &self.pages[page - 1] {
            PageScript::Text(text) => Ok((*text).to_string()),
            PageScript::Fail => Err(ExtractError::page(page, "scripted page failure")),
        }
    }
}

impl StructuredParser for ScriptedParser {
    fn open(&self, _path: &Path) -> Result<Box<dyn DocumentPages>> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_open {
            return Err(ExtractError::document_open(message));
        }
        Ok(Box::new(ScriptedPages {
            pages: self.pages.clone(),
        }))
    }
}

/// Structured parser driven by the fake document's content, for batch
/// tests. Content format: `<delay_millis>|<page text>`; a page text of
/// `fail` turns into an open failure.
pub struct FileBackedParser;

impl StructuredParser for FileBackedParser {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentPages>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExtractError::document_open_with_source("unreadable fake document", e))?;
        let (delay, text) = content.split_once('|').unwrap_or(("0", content.as_str()));
        let millis: u64 = delay.trim().parse().unwrap_or(0);
        if millis > 0 {
            std::thread::sleep(Duration::from_millis(millis));
        }
        if text.trim() == "fail" {
            return Err(ExtractError::document_open("scripted open failure"));
        }
        Ok(Box::new(ScriptedPages {
            pages: vec![PageScript::Text(Box::leak(text.to_string().into_boxed_str()))],
        }))
    }
}

/// Parser that cancels a batch from inside the first open call.
pub struct CancellingParser {
    pub flag: CancellationFlag,
    pub inner: FileBackedParser,
}

impl StructuredParser for CancellingParser {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentPages>> {
        self.flag.cancel();
        self.inner.open(path)
    }
}

/// Rasterizer producing `page_count` blank images of distinct widths.
pub struct ScriptedRasterizer {
    pub page_count: usize,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl ScriptedRasterizer {
    pub fn with_pages(page_count: usize) -> Self {
        Self {
            page_count,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            page_count: 0,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Rasterizer for ScriptedRasterizer {
    async fn rasterize(&self, _path: &Path, _dpi: u32) -> Result<Vec<DynamicImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ExtractError::rasterization("scripted rasterization failure"));
        }
        Ok((0..self.page_count)
            .map(|i| {
                DynamicImage::ImageLuma8(GrayImage::from_pixel(
                    BASE_WIDTH + i as u32,
                    8,
                    Luma([255u8]),
                ))
            })
            .collect())
    }
}

/// OCR engine keyed on mock page widths; `None` scripts a recognition
/// failure for that page.
pub struct ScriptedEngine {
    pub pages: Vec<Option<&'static str>>,
    pub calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn with_pages(pages: Vec<Option<&'static str>>) -> Self {
        Self {
            pages,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for ScriptedEngine {
    async fn recognize(&self, image: &DynamicImage, _options: &RecognitionOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let index = image.width().saturating_sub(BASE_WIDTH) as usize;
        match self.pages.get(index) {
            Some(Some(text)) => Ok((*text).to_string()),
            Some(None) => Err(ExtractError::recognition(format!(
                "scripted failure on page {}",
                index + 1
            ))),
            None => Ok(String::new()),
        }
    }
}

/// Assemble a pipeline from mock providers.
pub fn mock_pipeline(
    parser: Arc<dyn StructuredParser>,
    rasterizer: Arc<ScriptedRasterizer>,
    engine: Arc<ScriptedEngine>,
    capabilities: SystemCapabilities,
    config: ExtractionConfig,
) -> ExtractionPipeline {
    ExtractionPipeline::with_providers(parser, rasterizer, engine, capabilities, config)
}

/// Write a fake `.pdf` file and accept it as a document.
pub async fn fake_document(dir: &Path, name: &str, content: &str) -> Document {
    init_tracing();
    let path: PathBuf = dir.join(name);
    tokio::fs::write(&path, content).await.unwrap();
    Document::open(&path).await.unwrap()
}

/// Route pipeline logs through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
