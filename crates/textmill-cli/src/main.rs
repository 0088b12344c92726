//! Command-line interface for textmill.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use textmill::{
    CancellationFlag, Document, ExtractionConfig, ExtractionOutcome, ExtractionPipeline,
    ProcessOptions, artifact, process_batch_paths,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "textmill")]
#[command(about = "Extract text from PDF documents, with OCR fallback for scans", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit machine-readable JSON instead of plain output
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a single PDF
    Extract {
        /// Input PDF file
        file: PathBuf,

        /// Force OCR even when the PDF has an embedded text layer
        #[arg(long)]
        ocr: bool,

        /// Do not fall back to OCR when structured extraction yields nothing
        #[arg(long)]
        no_fallback: bool,

        /// Rasterization resolution for the OCR path
        #[arg(long)]
        dpi: Option<u32>,

        /// Recognition language for the OCR path (e.g. "eng", "deu")
        #[arg(long)]
        lang: Option<String>,

        /// Write a timestamped result artifact into this directory
        /// instead of printing the text to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract text from several PDFs with bounded parallelism
    Batch {
        /// Input PDF files
        files: Vec<PathBuf>,

        /// Force OCR for every document
        #[arg(long)]
        ocr: bool,

        /// Maximum concurrent document extractions
        #[arg(short = 'c', long)]
        max_concurrent: Option<usize>,

        /// Write timestamped result artifacts into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Probe the external capability providers and report availability
    Capabilities,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => ExtractionConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ExtractionConfig::default(),
    };

    match cli.command {
        Commands::Extract {
            file,
            ocr,
            no_fallback,
            dpi,
            lang,
            output,
        } => {
            if let Some(lang) = lang {
                config.ocr.language = lang;
            }
            let pipeline = ExtractionPipeline::new(config).await;
            tracing::info!(capabilities = ?pipeline.capabilities(), "pipeline ready");
            let options = ProcessOptions {
                use_ocr: ocr,
                fallback_to_ocr: !no_fallback,
                dpi: dpi.unwrap_or(pipeline.config().ocr.dpi),
            };
            let doc = Document::open(&file)
                .await
                .with_context(|| format!("cannot read {}", file.display()))?;
            let outcome = pipeline.process_with(&doc, &options).await;
            report_single(&doc, &outcome, output.as_deref(), cli.json)?;
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Batch {
            files,
            ocr,
            max_concurrent,
            output,
        } => {
            if files.is_empty() {
                bail!("no input files given");
            }
            if max_concurrent.is_some() {
                config.max_concurrent_extractions = max_concurrent;
            }
            let pipeline = Arc::new(ExtractionPipeline::new(config).await);
            tracing::info!(documents = files.len(), "starting batch");
            let options = ProcessOptions {
                use_ocr: ocr,
                fallback_to_ocr: pipeline.config().fallback_to_ocr,
                dpi: pipeline.config().ocr.dpi,
            };
            let batch = process_batch_paths(
                pipeline,
                files.clone(),
                &options,
                &CancellationFlag::new(),
            )
            .await;
            report_batch(&files, &batch, output.as_deref(), cli.json)?;
            if batch.succeeded() < batch.len() {
                std::process::exit(1);
            }
        }
        Commands::Capabilities => {
            let pipeline = ExtractionPipeline::new(config).await;
            let caps = pipeline.capabilities();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(caps)?);
            } else {
                println!("structured parser: {}", available(caps.structured_parser));
                println!("rasterizer:        {}", available(caps.rasterizer));
                println!("ocr engine:        {}", available(caps.ocr_engine));
                println!(
                    "ocr path:          {}",
                    if caps.ocr_ready() { "ready" } else { "not ready" }
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn available(flag: bool) -> &'static str {
    if flag { "available" } else { "missing" }
}

fn report_single(
    doc: &Document,
    outcome: &ExtractionOutcome,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    }
    match outcome {
        ExtractionOutcome::Success(success) => {
            if let Some(dir) = output {
                let path = write_artifact(doc, success, dir)?;
                if !json {
                    eprintln!("wrote {}", path.display());
                }
            } else if !json {
                println!("{}", success.text);
            }
        }
        ExtractionOutcome::Failure { reason, message } => {
            if !json {
                eprintln!("extraction failed ({reason}): {message}");
            }
        }
    }
    Ok(())
}

fn report_batch(
    files: &[PathBuf],
    batch: &textmill::BatchOutcome,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(batch)?);
    }
    if let Some(dir) = output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    }
    for (file, item) in files.iter().zip(&batch.items) {
        match &item.outcome {
            ExtractionOutcome::Success(success) => {
                if let Some(dir) = output {
                    let stem = file
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "document".to_string());
                    let name = artifact::timestamped_filename(&stem);
                    let path = dir.join(name);
                    std::fs::write(&path, artifact::render(&file_name(file), success))
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    if !json {
                        eprintln!(
                            "[{}/{}] wrote {}",
                            item.batch_index,
                            item.batch_total,
                            path.display()
                        );
                    }
                } else if !json {
                    println!(
                        "[{}/{}] {}: {} characters via {}",
                        item.batch_index,
                        item.batch_total,
                        file_name(file),
                        success.char_count,
                        success.method.label()
                    );
                }
            }
            ExtractionOutcome::Failure { reason, message } => {
                if !json {
                    eprintln!(
                        "[{}/{}] {}: failed ({reason}): {message}",
                        item.batch_index,
                        item.batch_total,
                        file_name(file)
                    );
                }
            }
        }
    }
    Ok(())
}

fn write_artifact(
    doc: &Document,
    success: &textmill::ExtractionSuccess,
    dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    let stem = doc
        .path()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let path = dir.join(artifact::timestamped_filename(&stem));
    std::fs::write(&path, artifact::render(&doc.file_name(), success))
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
