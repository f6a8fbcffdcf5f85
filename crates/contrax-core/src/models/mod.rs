//! Data models: extraction result, processing log, configuration.

pub mod config;
pub mod log;
pub mod result;

pub use config::{ContraxConfig, ExtractionConfig, OcrConfig, PdfConfig};
pub use log::{ExtractionLog, LogEntry, LogLevel};
pub use result::{ContractFields, ExtractionResult, ExtractionStatus};
