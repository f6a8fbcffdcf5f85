//! Pipeline orchestrator: acquisition, normalization, field extraction, scoring.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::time::{Instant, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::contract::{ContractParser, confidence};
use crate::error::AcquisitionFault;
use crate::models::config::ContraxConfig;
use crate::models::log::ExtractionLog;
use crate::models::result::ExtractionResult;
use crate::ocr::{DisabledOcr, OcrEngine};
use crate::pdf::{PageRenderer, PdfExtractor, PdfRasterizer, TextLayerReader};
use crate::text::{TextAcquirer, normalize_whitespace};

#[cfg(feature = "native")]
use crate::ocr::PureOcrEngine;

/// Lifecycle of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Created,
    Acquiring,
    Extracting,
    /// Terminal: fields extracted and scored, status `completed`.
    Scored,
    /// Terminal: acquisition fault or internal error, status `error`.
    Faulted,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Scored | PipelineState::Faulted)
    }

    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Created, Acquiring)
                | (Acquiring, Extracting)
                | (Acquiring, Faulted)
                | (Extracting, Scored)
                | (Extracting, Faulted)
        )
    }
}

/// Tracks the state of a single run.
struct Run {
    state: PipelineState,
}

impl Run {
    fn new() -> Self {
        Self {
            state: PipelineState::Created,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("Pipeline state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Contract extraction pipeline.
///
/// Holds only configuration and the capability implementations; nothing is
/// retained between invocations, so one instance can serve concurrent calls.
pub struct ExtractionPipeline {
    config: ContraxConfig,
    reader: Box<dyn TextLayerReader + Send + Sync>,
    renderer: Box<dyn PageRenderer + Send + Sync>,
    ocr: Box<dyn OcrEngine + Send + Sync>,
    parser: ContractParser,
}

impl ExtractionPipeline {
    /// Create a pipeline with the default capabilities for `config`.
    pub fn new(config: ContraxConfig) -> Self {
        PipelineBuilder::new().with_config(config).build()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &ContraxConfig {
        &self.config
    }

    /// Process a PDF file. The document id defaults to `DOC-<mtime millis>`.
    pub fn process_file(&self, path: &Path, doc_id: Option<&str>) -> ExtractionResult {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match fs::read(path) {
            Ok(data) => {
                let doc_id = doc_id
                    .map(str::to_string)
                    .unwrap_or_else(|| file_document_id(path, &data));
                self.run(&data, &file_name, doc_id)
            }
            Err(e) => {
                let doc_id = doc_id.map(str::to_string).unwrap_or_else(|| file_document_id(path, &[]));
                self.reject(&file_name, doc_id, AcquisitionFault::from(e))
            }
        }
    }

    /// Process a seekable byte source from its beginning.
    pub fn process_reader<R: Read + Seek>(
        &self,
        mut source: R,
        file_name: &str,
        doc_id: Option<&str>,
    ) -> ExtractionResult {
        let mut data = Vec::new();
        let read = source
            .seek(SeekFrom::Start(0))
            .and_then(|_| source.read_to_end(&mut data));

        match read {
            Ok(_) => self.process_bytes(&data, file_name, doc_id),
            Err(e) => {
                let doc_id = doc_id.map(str::to_string).unwrap_or_else(|| content_document_id(&data));
                self.reject(file_name, doc_id, AcquisitionFault::from(e))
            }
        }
    }

    /// Process an in-memory PDF. The document id defaults to a content hash.
    pub fn process_bytes(&self, data: &[u8], file_name: &str, doc_id: Option<&str>) -> ExtractionResult {
        let doc_id = doc_id
            .map(str::to_string)
            .unwrap_or_else(|| content_document_id(data));
        self.run(data, file_name, doc_id)
    }

    fn run(&self, data: &[u8], file_name: &str, doc_id: String) -> ExtractionResult {
        let start = Instant::now();
        let mut result = ExtractionResult::new(doc_id, file_name);
        let mut log = ExtractionLog::new();
        let mut lifecycle = Run::new();

        log.info(format!("Processing started for file: {}", file_name));
        lifecycle.advance(PipelineState::Acquiring);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.execute(data, &mut result, &mut log, &mut lifecycle)
        }));

        match outcome {
            Ok(Ok(())) => {
                lifecycle.advance(PipelineState::Scored);
                result.complete(log);
            }
            Ok(Err(fault)) => {
                log.error(format!("Extraction failed: {}", fault));
                lifecycle.advance(PipelineState::Faulted);
                result.fail(log);
            }
            Err(_) => {
                log.error("Extraction failed: internal error while processing document");
                lifecycle.advance(PipelineState::Faulted);
                result.fail(log);
            }
        }

        debug!(
            "Processed {} in {}ms: status={}, confidence={:.2}",
            file_name,
            start.elapsed().as_millis(),
            result.status(),
            result.confidence()
        );
        result
    }

    fn execute(
        &self,
        data: &[u8],
        result: &mut ExtractionResult,
        log: &mut ExtractionLog,
        lifecycle: &mut Run,
    ) -> Result<(), AcquisitionFault> {
        let acquirer = TextAcquirer::new(
            self.reader.as_ref(),
            self.renderer.as_ref(),
            self.ocr.as_ref(),
            &self.config.pdf,
            &self.config.ocr.language,
        );
        let acquired = acquirer.acquire(data, log)?;
        debug!("Acquired text via {:?}", acquired.source);

        result.set_total_pages(acquired.total_pages);
        log.info(format!(
            "PDF Text Extracted (Length: {} chars)",
            acquired.text.chars().count()
        ));
        let normalized = normalize_whitespace(&acquired.text);
        result.set_raw_text(acquired.text);
        lifecycle.advance(PipelineState::Extracting);

        let parsed = self.parser.parse(&normalized);
        log.append(parsed.log);
        log.info("Rule-based extraction pipeline finished.");

        let fields = parsed.value;
        log.info(format!(
            "Confidence score: {:.2} ({}/{} fields)",
            confidence::score(&fields),
            fields.filled_count(),
            confidence::EXPECTED_FIELDS
        ));
        result.set_fields(fields);
        Ok(())
    }

    /// Resolve a run that could not even read its input.
    fn reject(&self, file_name: &str, doc_id: String, fault: AcquisitionFault) -> ExtractionResult {
        let mut result = ExtractionResult::new(doc_id, file_name);
        let mut log = ExtractionLog::new();
        log.info(format!("Processing started for file: {}", file_name));
        log.error(format!("Extraction failed: {}", fault));
        result.fail(log);
        result
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new(ContraxConfig::default())
    }
}

/// Builder for [`ExtractionPipeline`]. Unset capabilities fall back to the
/// lopdf/pdf-extract reader, the pdftoppm rasterizer and the bundled OCR
/// engine (or no OCR without the `native` feature).
#[derive(Default)]
pub struct PipelineBuilder {
    config: ContraxConfig,
    reader: Option<Box<dyn TextLayerReader + Send + Sync>>,
    renderer: Option<Box<dyn PageRenderer + Send + Sync>>,
    ocr: Option<Box<dyn OcrEngine + Send + Sync>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ContraxConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_reader(mut self, reader: impl TextLayerReader + Send + Sync + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    pub fn with_renderer(mut self, renderer: impl PageRenderer + Send + Sync + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_ocr(mut self, ocr: impl OcrEngine + Send + Sync + 'static) -> Self {
        self.ocr = Some(Box::new(ocr));
        self
    }

    /// Disable the OCR fallback; short text layers degrade to an empty transcript.
    pub fn without_ocr(self) -> Self {
        self.with_ocr(DisabledOcr)
    }

    pub fn build(self) -> ExtractionPipeline {
        let ocr = self
            .ocr
            .unwrap_or_else(|| default_ocr_engine(&self.config));
        ExtractionPipeline {
            parser: ContractParser::new(&self.config.extraction),
            reader: self.reader.unwrap_or_else(|| Box::new(PdfExtractor::new())),
            renderer: self.renderer.unwrap_or_else(|| Box::new(PdfRasterizer::new())),
            ocr,
            config: self.config,
        }
    }
}

#[cfg(feature = "native")]
fn default_ocr_engine(config: &ContraxConfig) -> Box<dyn OcrEngine + Send + Sync> {
    Box::new(PureOcrEngine::new(config.ocr.clone()))
}

#[cfg(not(feature = "native"))]
fn default_ocr_engine(_config: &ContraxConfig) -> Box<dyn OcrEngine + Send + Sync> {
    Box::new(DisabledOcr)
}

/// `DOC-<mtime millis>`, or the content id when the mtime is unavailable.
fn file_document_id(path: &Path, data: &[u8]) -> String {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| format!("DOC-{}", d.as_millis()))
        .unwrap_or_else(|| content_document_id(data))
}

/// `DOC-<16 hex digits>`: the leading 8 bytes of the SHA-256 of the document.
fn content_document_id(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let hex: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("DOC-{}", hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_transitions() {
        use PipelineState::*;
        assert!(Created.can_transition_to(Acquiring));
        assert!(Acquiring.can_transition_to(Faulted));
        assert!(Extracting.can_transition_to(Scored));
        assert!(!Created.can_transition_to(Scored));
        assert!(!Scored.can_transition_to(Acquiring));
        assert!(!Faulted.can_transition_to(Extracting));
        assert!(Scored.is_terminal() && Faulted.is_terminal());
        assert!(!Extracting.is_terminal());
    }

    #[test]
    fn test_content_document_id_is_stable() {
        let a = content_document_id(b"%PDF-1.7 same bytes");
        assert_eq!(a, content_document_id(b"%PDF-1.7 same bytes"));
        assert_ne!(a, content_document_id(b"%PDF-1.7 other bytes"));
        assert!(a.starts_with("DOC-"));
        assert_eq!(a.len(), 4 + 16);
    }

    #[test]
    fn test_content_document_id_is_sha256_prefix() {
        assert_eq!(content_document_id(b""), "DOC-e3b0c44298fc1c14");
        assert_eq!(content_document_id(b"abc"), "DOC-ba7816bf8f01cfea");
    }

    #[test]
    fn test_file_document_id_uses_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let id = file_document_id(&path, b"%PDF-1.7");
        assert!(id.starts_with("DOC-"));
        assert!(id[4..].chars().all(|c| c.is_ascii_digit()), "{}", id);
    }

    #[test]
    fn test_missing_file_is_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let result = ExtractionPipeline::builder()
            .without_ocr()
            .build()
            .process_file(&dir.path().join("missing.pdf"), Some("DOC-1"));

        assert_eq!(result.doc_id(), "DOC-1");
        assert_eq!(result.file_name(), "missing.pdf");
        assert_eq!(result.status(), crate::models::result::ExtractionStatus::Error);
        assert_eq!(result.confidence(), 0.0);
        assert!(result.logs().contains("Extraction failed"));
    }
}
