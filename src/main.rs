// src/main.rs
mod config;
mod extractors;
mod pdf;
mod storage;
mod utils;

use std::path::PathBuf;

use clap::Parser;

use config::ExtractionConfig;
use extractors::SectionExtractor;
use storage::ExtractionReport;
use utils::AppError;

/// Command Line Interface for the Sample Exercise extractor
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Extract 'Sample Exercise' sections from PDF textbooks",
    long_about = None
)]
struct Args {
    /// Path to the input PDF file
    input_pdf: PathBuf,

    /// Path for the output PDF file
    #[arg(short, long, default_value = "sample_exercises_extracted.pdf")]
    output: PathBuf,

    /// Enable preview mode with visual indicators
    #[arg(long)]
    preview: bool,

    /// Disable progress indicators
    #[arg(long)]
    no_progress: bool,

    /// Override the section header pattern (case-insensitive regex)
    #[arg(long)]
    pattern: Option<String>,

    /// Load extraction settings from a JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON extraction report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting extraction for args: {:?}", args);

    // 3. Validate input file before touching anything else
    if !args.input_pdf.exists() {
        return Err(AppError::Config(format!(
            "Input file '{}' does not exist.",
            args.input_pdf.display()
        )));
    }

    // 4. Build the configuration: file first, then CLI overrides
    let mut config = match &args.config {
        Some(path) => ExtractionConfig::from_json_file(path)?,
        None => ExtractionConfig::default(),
    };
    if args.preview {
        config.preview_mode = true;
    }
    if args.no_progress {
        config.show_progress = false;
    }
    if let Some(pattern) = &args.pattern {
        config.pattern_regex = pattern.clone();
    }

    // 5. Run the extraction
    let extractor = SectionExtractor::new(config)?;

    println!(
        "Extracting 'Sample Exercise' sections from '{}'...",
        args.input_pdf.display()
    );
    let summary = extractor.extract(&args.input_pdf, &args.output)?;

    println!(
        "Successfully extracted {} exercise sections to '{}'",
        summary.extracted_count,
        args.output.display()
    );

    // 6. Optional JSON report next to the output document
    if let Some(report_path) = &args.report {
        let report = ExtractionReport::new(
            &args.input_pdf,
            &args.output,
            &extractor.config().pattern_regex,
            &summary,
        );
        storage::save_report(report_path, &report)?;
    }

    // Zero sections is a warning, not a failure
    if summary.extracted_count == 0 {
        tracing::warn!("No exercise sections were found in the PDF");
        println!("Warning: No exercise sections were found in the PDF.");
    } else {
        tracing::info!(
            "Extraction completed successfully with {} sections",
            summary.extracted_count
        );
    }

    Ok(())
}
