//! Process command - extract fields from a single contract PDF.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use contrax_core::ExtractionPipeline;

use super::config::{load_config, resolve_model_dir};
use super::output::{OutputFormat, format_result, print_logs};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Document identifier (default: derived from the file's modification time)
    #[arg(long)]
    doc_id: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the embedded text layer
    #[arg(long)]
    text_only: bool,

    /// Print the processing log to stderr
    #[arg(long)]
    show_logs: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    resolve_model_dir(&mut config, args.model_dir.clone());

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Extracting {}", args.input.display()));
    pb.enable_steady_tick(Duration::from_millis(120));

    let mut builder = ExtractionPipeline::builder().with_config(config);
    if args.text_only {
        builder = builder.without_ocr();
    }
    let pipeline = builder.build();

    let input = args.input.clone();
    let doc_id = args.doc_id.clone();
    let result =
        tokio::task::spawn_blocking(move || pipeline.process_file(&input, doc_id.as_deref())).await?;

    pb.finish_and_clear();

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_logs {
        print_logs(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
