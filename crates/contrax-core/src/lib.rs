//! Core library for Korean contract PDF field extraction.
//!
//! This crate provides:
//! - Text acquisition (embedded text layer, raster + OCR fallback)
//! - Contract field extraction (parties, contract period, amount)
//! - A deterministic completeness score and a timestamped processing log
//! - The pipeline orchestrator producing one `ExtractionResult` per document

pub mod contract;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod text;

pub use contract::{ContractParser, FieldExtraction, FieldExtractor};
pub use error::{AcquisitionFault, ContraxError, ExtractionError, OcrError, PdfError, Result};
pub use models::{
    ContractFields, ContraxConfig, ExtractionConfig, ExtractionLog, ExtractionResult,
    ExtractionStatus, LogEntry, LogLevel, OcrConfig, PdfConfig,
};
pub use ocr::{DisabledOcr, OcrEngine, OcrSession};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{PageRenderer, PdfExtractor, PdfRasterizer, TextLayer, TextLayerReader};
pub use pipeline::{ExtractionPipeline, PipelineBuilder, PipelineState};
pub use text::{AcquiredText, TextAcquirer, TextSource, normalize_whitespace};
