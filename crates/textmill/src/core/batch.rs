//! Batch coordination across documents.
//!
//! Documents are processed with bounded parallelism; results come back in
//! input order regardless of completion order, one per input. A failing
//! document never prevents its siblings from being attempted.

use crate::core::pipeline::ExtractionPipeline;
use crate::types::{BatchItem, BatchOutcome, Document, ExtractionOutcome, ProcessOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Cooperative cancellation handle for a running batch.
///
/// Checked per document once a worker slot is acquired; documents seen
/// after cancellation yield a failure result so the batch still returns
/// one result per input.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Process a batch of accepted documents.
///
/// Returns only after every document has been attempted. Item `i` of the
/// result corresponds to input `i` and carries a 1-based `batch_index`.
pub async fn process_batch(
    pipeline: Arc<ExtractionPipeline>,
    documents: Vec<Document>,
    options: &ProcessOptions,
    cancel: &CancellationFlag,
) -> BatchOutcome {
    let inputs = documents.into_iter().map(Input::Document).collect();
    run_batch(pipeline, inputs, options, cancel).await
}

/// Process a batch of paths, validating each inside its worker so an
/// unopenable file becomes a failure at its slot instead of aborting the
/// batch.
pub async fn process_batch_paths(
    pipeline: Arc<ExtractionPipeline>,
    paths: Vec<PathBuf>,
    options: &ProcessOptions,
    cancel: &CancellationFlag,
) -> BatchOutcome {
    let inputs = paths.into_iter().map(Input::Path).collect();
    run_batch(pipeline, inputs, options, cancel).await
}

enum Input {
    Document(Document),
    Path(PathBuf),
}

async fn run_batch(
    pipeline: Arc<ExtractionPipeline>,
    inputs: Vec<Input>,
    options: &ProcessOptions,
    cancel: &CancellationFlag,
) -> BatchOutcome {
    let total = inputs.len();
    if total == 0 {
        return BatchOutcome::default();
    }

    tracing::info!(total, "starting batch processing");

    let max_concurrent = pipeline
        .config()
        .max_concurrent_extractions
        .unwrap_or_else(|| num_cpus::get() * 2);
    let semaphore = Arc::new(Semaphore::new(max_concurrent));

    let mut tasks = JoinSet::new();
    for (index, input) in inputs.into_iter().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let semaphore = Arc::clone(&semaphore);
        let options = options.clone();
        let cancel = cancel.clone();

        tasks.spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return (index, ExtractionOutcome::unexpected("worker pool shut down")),
            };
            if cancel.is_cancelled() {
                return (index, ExtractionOutcome::unexpected("batch cancelled"));
            }
            let outcome = match input {
                Input::Document(doc) => pipeline.process_with(&doc, &options).await,
                Input::Path(path) => match Document::open(&path).await {
                    Ok(doc) => pipeline.process_with(&doc, &options).await,
                    Err(err) => ExtractionOutcome::failure(&err),
                },
            };
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<ExtractionOutcome>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(join_err) => {
                tracing::error!(error = %join_err, "batch worker panicked");
            }
        }
    }

    let items = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| BatchItem {
            batch_index: index + 1,
            batch_total: total,
            outcome: slot
                .unwrap_or_else(|| ExtractionOutcome::unexpected("extraction task panicked")),
        })
        .collect();

    let outcome = BatchOutcome { items };
    tracing::info!(
        succeeded = outcome.succeeded(),
        total,
        "batch processing completed"
    );
    outcome
}
