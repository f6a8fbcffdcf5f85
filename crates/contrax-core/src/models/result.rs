//! Extraction result model handed to downstream collaborators.

use serde::{Deserialize, Serialize};

use super::log::ExtractionLog;
use crate::contract::confidence;

/// Processing status of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// Pipeline still running. Never observable outside the pipeline.
    Processing,
    /// Acquisition succeeded and all extractors ran.
    Completed,
    /// Acquisition faulted or an internal error occurred.
    Error,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Processing => "processing",
            ExtractionStatus::Completed => "completed",
            ExtractionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five structured fields of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractFields {
    /// First party (갑), canonical company name.
    pub contractor_a: Option<String>,
    /// Second party (을), canonical company name.
    pub contractor_b: Option<String>,
    /// Contract start date, `YYYY-MM-DD` when normalizable.
    pub start_date: Option<String>,
    /// Contract end date, `YYYY-MM-DD` when normalizable.
    pub end_date: Option<String>,
    /// Total contract amount in monetary units.
    pub amount: Option<u64>,
}

impl ContractFields {
    /// Number of populated fields, 0..=5.
    pub fn filled_count(&self) -> usize {
        [
            self.contractor_a.is_some(),
            self.contractor_b.is_some(),
            self.start_date.is_some(),
            self.end_date.is_some(),
            self.amount.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Output of one pipeline invocation.
///
/// Built and mutated only inside the pipeline; callers receive it by value
/// and can only read it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    doc_id: String,
    file_name: String,
    total_pages: u32,
    raw_text: String,
    #[serde(flatten)]
    fields: ContractFields,
    confidence: f64,
    status: ExtractionStatus,
    logs: ExtractionLog,
}

impl ExtractionResult {
    pub(crate) fn new(doc_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            file_name: file_name.into(),
            total_pages: 0,
            raw_text: String::new(),
            fields: ContractFields::default(),
            confidence: 0.0,
            status: ExtractionStatus::Processing,
            logs: ExtractionLog::new(),
        }
    }

    pub(crate) fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
    }

    pub(crate) fn set_raw_text(&mut self, raw_text: String) {
        self.raw_text = raw_text;
    }

    pub(crate) fn set_fields(&mut self, fields: ContractFields) {
        self.fields = fields;
    }

    /// Resolve to `completed` and derive the confidence from the fields.
    pub(crate) fn complete(&mut self, logs: ExtractionLog) {
        self.status = ExtractionStatus::Completed;
        self.confidence = confidence::score(&self.fields);
        self.logs = logs;
    }

    /// Resolve to `error`. Confidence is forced to zero regardless of fields.
    pub(crate) fn fail(&mut self, logs: ExtractionLog) {
        self.status = ExtractionStatus::Error;
        self.confidence = 0.0;
        self.logs = logs;
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Untouched transcript, before whitespace normalization.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn fields(&self) -> &ContractFields {
        &self.fields
    }

    pub fn contractor_a(&self) -> Option<&str> {
        self.fields.contractor_a.as_deref()
    }

    pub fn contractor_b(&self) -> Option<&str> {
        self.fields.contractor_b.as_deref()
    }

    pub fn start_date(&self) -> Option<&str> {
        self.fields.start_date.as_deref()
    }

    pub fn end_date(&self) -> Option<&str> {
        self.fields.end_date.as_deref()
    }

    pub fn amount(&self) -> Option<u64> {
        self.fields.amount
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn status(&self) -> ExtractionStatus {
        self.status
    }

    pub fn logs(&self) -> &ExtractionLog {
        &self.logs
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
