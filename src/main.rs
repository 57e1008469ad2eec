// src/main.rs
mod utils;
mod document;
mod extractors;
mod fetch;
mod storage;

use std::path::PathBuf;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use utils::AppError;
use document::HtmlDocument;
use extractors::{CoverageStatus, OrderExtractor, ORDER_FIELDS};
use fetch::Source;
use storage::StorageManager;

/// Output rendering of an extracted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One tab-separated row, ready to paste into a spreadsheet
    Tsv,
    /// JSON object keyed by field name
    Json,
}

/// Command Line Interface for the order data extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Saved HTML page of the order (use "-" for stdin)
    #[arg(short, long, conflicts_with = "url", required_unless_present = "url")]
    input: Option<String>,

    /// Download the order page from this URL instead
    #[arg(short, long)]
    url: Option<String>,

    /// Capture date of the snapshot, YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Output format written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,

    /// Append the row to <dir>/orders.tsv and save JSON metadata there
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Debug mode - save raw and annotated snapshots under <output-dir>/debug
    #[arg(short, long, requires = "output_dir")]
    debug: bool,
}

impl Args {
    fn source(&self) -> Result<Source, AppError> {
        match (&self.input, &self.url) {
            (Some(input), None) => Ok(Source::from_input(input)),
            (None, Some(url)) => Ok(Source::Url(url.clone())),
            _ => Err(AppError::Config("Exactly one of --input or --url is required".to_string())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting extraction for args: {:?}", args);

    // 3. Load the page snapshot
    let source = args.source()?;
    let html = fetch::load_snapshot(&source).await?;
    tracing::info!("Loaded snapshot ({} bytes)", html.len());

    let capture_date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let document = HtmlDocument::parse(&html).with_capture_date(capture_date);

    // 4. Extract all fields
    let extractor = OrderExtractor::new();
    let result = extractor.extract(&document);
    let coverage = result.coverage();

    match coverage.status() {
        CoverageStatus::Complete => tracing::info!("{}", coverage.summary()),
        CoverageStatus::Partial | CoverageStatus::Limited => {
            tracing::warn!("{}", coverage.summary());
            tracing::warn!(
                "Missing fields (written as {}): {}",
                extractors::SENTINEL,
                result.missing().join(", ")
            );
        }
    }
    for (name, value) in result.names().zip(result.values()) {
        tracing::debug!("{}: {}", name, value);
    }

    // 5. Write the row
    match args.format {
        OutputFormat::Tsv => println!("{}", storage::format_row(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    // 6. Persist if requested
    if let Some(output_dir) = &args.output_dir {
        let storage = StorageManager::new(output_dir)?;
        let source_label = match &source {
            Source::File(path) => path.display().to_string(),
            Source::Stdin => "stdin".to_string(),
            Source::Url(url) => url.clone(),
        };

        storage.append_row(&result)?;
        storage.save_metadata(&result, &source_label)?;

        if args.debug {
            let debug_dir = storage.base_dir().join("debug");
            std::fs::create_dir_all(&debug_dir)?;

            let raw_path = debug_dir.join("raw_snapshot.html");
            std::fs::write(&raw_path, &html)?;
            tracing::info!("Saved raw snapshot to: {}", raw_path.display());

            let annotated_path = debug_dir.join("snapshot_annotated.html");
            if let Err(e) = utils::html_debug::save_annotated_snapshot(&html, &annotated_path, &ORDER_FIELDS) {
                tracing::warn!("Failed to create annotated snapshot: {}", e);
            }
        }
    }

    tracing::info!("Processing finished. Coverage: {}", coverage);
    Ok(())
}
