//! Batch processing command for multiple contract PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use contrax_core::{ExtractionPipeline, ExtractionResult, ExtractionStatus};

use super::config::{load_config, resolve_model_dir};
use super::output::{OutputFormat, failure_reason, format_result, status_line};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input PDFs (e.g. "contracts/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the embedded text layer
    #[arg(long)]
    text_only: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    resolve_model_dir(&mut config, args.model_dir.clone());

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut builder = ExtractionPipeline::builder().with_config(config);
    if args.text_only {
        builder = builder.without_ocr();
    }
    let pipeline = Arc::new(builder.build());

    // The pipeline is stateless; each file runs on its own blocking task.
    let mut tasks = stream::iter(files)
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            tokio::task::spawn_blocking(move || {
                let result = pipeline.process_file(&path, None);
                (path, result)
            })
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(joined) = tasks.next().await {
        let (path, result) = joined?;
        overall_pb.println(status_line(&result));
        overall_pb.inc(1);
        results.push((path, result));
    }
    overall_pb.finish_and_clear();

    results.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(output_dir) = &args.output_dir {
        for (path, result) in &results {
            let output_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("contract");
            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_result(result, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results
        .iter()
        .filter(|(_, r)| r.status() == ExtractionStatus::Error)
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} completed, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, result) in &failed {
            println!("  - {}: {}", path.display(), failure_reason(result));
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[(PathBuf, ExtractionResult)]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["file", "docId", "status", "parties", "dates", "amount", "confidence"])?;

    for (file, result) in results {
        let file_name = file.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let parties = format!(
            "{} / {}",
            result.contractor_a().unwrap_or("-"),
            result.contractor_b().unwrap_or("-")
        );
        let dates = format!(
            "{} ~ {}",
            result.start_date().unwrap_or("-"),
            result.end_date().unwrap_or("-")
        );
        let amount = result.amount().map(|a| a.to_string()).unwrap_or_default();
        let confidence = format!("{:.2}", result.confidence());

        wtr.write_record([
            file_name,
            result.doc_id(),
            result.status().as_str(),
            parties.as_str(),
            dates.as_str(),
            amount.as_str(),
            confidence.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
