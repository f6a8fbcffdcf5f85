//! Rendering of extraction results (JSON, CSV, text) and their logs.

use console::style;

use contrax_core::{ExtractionResult, ExtractionStatus, LogLevel};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "docId",
        "fileName",
        "totalPages",
        "contractorA",
        "contractorB",
        "startDate",
        "endDate",
        "amount",
        "confidence",
        "status",
    ])?;

    let total_pages = result.total_pages().to_string();
    let amount = result.amount().map(|a| a.to_string()).unwrap_or_default();
    let confidence = format!("{:.2}", result.confidence());
    wtr.write_record([
        result.doc_id(),
        result.file_name(),
        total_pages.as_str(),
        result.contractor_a().unwrap_or_default(),
        result.contractor_b().unwrap_or_default(),
        result.start_date().unwrap_or_default(),
        result.end_date().unwrap_or_default(),
        amount.as_str(),
        confidence.as_str(),
        result.status().as_str(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let missing = "-";
    let mut output = String::new();

    output.push_str(&format!("Document: {} ({})\n", result.doc_id(), result.file_name()));
    output.push_str(&format!("Status: {}\n", result.status()));
    output.push_str(&format!("Pages: {}\n", result.total_pages()));
    output.push('\n');

    output.push_str("Parties:\n");
    output.push_str(&format!("  갑: {}\n", result.contractor_a().unwrap_or(missing)));
    output.push_str(&format!("  을: {}\n", result.contractor_b().unwrap_or(missing)));
    output.push('\n');

    output.push_str("Period:\n");
    output.push_str(&format!("  Start: {}\n", result.start_date().unwrap_or(missing)));
    output.push_str(&format!("  End:   {}\n", result.end_date().unwrap_or(missing)));
    output.push('\n');

    match result.amount() {
        Some(amount) => output.push_str(&format!("Amount: {} KRW\n", group_thousands(amount))),
        None => output.push_str(&format!("Amount: {}\n", missing)),
    }
    output.push_str(&format!("Confidence: {:.2}\n", result.confidence()));

    output
}

/// `55000000` -> `55,000,000`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Print the processing log to stderr.
pub fn print_logs(result: &ExtractionResult) {
    eprintln!("{}", style(format!("Processing log ({}):", result.file_name())).bold());
    for entry in result.logs() {
        let level = match entry.level {
            LogLevel::Info => style(entry.level.to_string()).blue(),
            LogLevel::Warn => style(entry.level.to_string()).yellow(),
            LogLevel::Error => style(entry.level.to_string()).red(),
        };
        eprintln!(
            "  {} {:<5} {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            level,
            entry.message
        );
    }
}

/// One-line status for a finished document.
pub fn status_line(result: &ExtractionResult) -> String {
    match result.status() {
        ExtractionStatus::Completed => format!(
            "{} {}: {} of 5 fields, confidence {:.2}",
            style("✓").green(),
            result.file_name(),
            result.fields().filled_count(),
            result.confidence()
        ),
        _ => format!(
            "{} {}: {}",
            style("✗").red(),
            result.file_name(),
            failure_reason(result)
        ),
    }
}

/// Message of the last ERROR entry, for failed results.
pub fn failure_reason(result: &ExtractionResult) -> &str {
    result
        .logs()
        .iter()
        .rev()
        .find(|e| e.level == LogLevel::Error)
        .map(|e| e.message.as_str())
        .unwrap_or("unknown error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(55_000_000), "55,000,000");
    }
}
