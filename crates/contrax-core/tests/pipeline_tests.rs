//! End-to-end tests of the extraction pipeline with fake capabilities and
//! in-memory PDFs.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use contrax_core::{
    ContraxConfig, DisabledOcr, ExtractionPipeline, ExtractionResult, ExtractionStatus, LogLevel,
    OcrEngine, OcrError, OcrSession, PageRenderer, PdfConfig, PdfError, PdfExtractor, TextLayer,
    TextLayerReader,
};
use image::DynamicImage;
use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, dictionary};
use pretty_assertions::assert_eq;

const CONTRACT: &str = r#"소프트웨어 개발 용역 계약서

주식회사 알파솔루션 (이하 "갑"이라 한다)과 (주)베타테크 (이하 "을"이라 한다)는
다음과 같이 용역 계약을 체결한다.

제2조 (계약 기간)
계약 기간은 2024년 1월 1일부터 2024년 12월 31일까지로 한다.

제3조 (계약 금액)
총 계약 금액은 금 55,000,000원정으로 하며 부가가치세는 별도로 한다.
"#;

struct FakeReader {
    pages: u32,
    text: String,
}

impl FakeReader {
    fn new(pages: u32, text: &str) -> Self {
        Self {
            pages,
            text: text.to_string(),
        }
    }
}

impl TextLayerReader for FakeReader {
    fn read(&self, _data: &[u8]) -> Result<TextLayer, PdfError> {
        Ok(TextLayer {
            page_count: self.pages,
            text: self.text.clone(),
            extraction_error: None,
        })
    }
}

struct EncryptedReader;

impl TextLayerReader for EncryptedReader {
    fn read(&self, _data: &[u8]) -> Result<TextLayer, PdfError> {
        Err(PdfError::Encrypted)
    }
}

struct PanickingReader;

impl TextLayerReader for PanickingReader {
    fn read(&self, _data: &[u8]) -> Result<TextLayer, PdfError> {
        panic!("content stream walker hit an impossible state")
    }
}

/// Blank renderer recording which pages were requested.
#[derive(Clone, Default)]
struct RecordingRenderer {
    pages: Arc<Mutex<Vec<u32>>>,
}

impl PageRenderer for RecordingRenderer {
    fn render_page(&self, _data: &[u8], page: u32, _dpi: u32) -> Result<DynamicImage, PdfError> {
        self.pages.lock().unwrap().push(page);
        Ok(DynamicImage::new_luma8(16, 16))
    }
}

/// OCR engine returning the same transcript for the first page only.
struct ScriptedOcr {
    first_page: String,
}

struct ScriptedSession<'a> {
    engine: &'a ScriptedOcr,
    calls: usize,
}

impl OcrEngine for ScriptedOcr {
    fn open(&self, _language: &str) -> Result<Box<dyn OcrSession + '_>, OcrError> {
        Ok(Box::new(ScriptedSession {
            engine: self,
            calls: 0,
        }))
    }
}

impl OcrSession for ScriptedSession<'_> {
    fn recognize(&mut self, _image: &DynamicImage) -> Result<String, OcrError> {
        self.calls += 1;
        if self.calls == 1 {
            Ok(self.engine.first_page.clone())
        } else {
            Ok(String::new())
        }
    }
}

fn pipeline_with(reader: impl TextLayerReader + Send + Sync + 'static) -> ExtractionPipeline {
    ExtractionPipeline::builder()
        .with_reader(reader)
        .with_renderer(RecordingRenderer::default())
        .without_ocr()
        .build()
}

fn messages(result: &ExtractionResult) -> Vec<(LogLevel, String)> {
    result
        .logs()
        .iter()
        .map(|e| (e.level, e.message.clone()))
        .collect()
}

/// Minimal PDF with one Courier text line per page.
fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in page_texts {
        let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Re-save `data` with RC4 128-bit standard security and the given user password.
fn encrypt_pdf(data: &[u8], user_password: &str) -> Vec<u8> {
    let mut doc = Document::load_mem(data).unwrap();
    let file_id = Object::string_literal("contrax-fixture-id");
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);

    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner-secret",
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_well_formed_contract_completes_with_full_confidence() {
    let pipeline = pipeline_with(FakeReader::new(2, CONTRACT));
    let result = pipeline.process_bytes(b"%PDF-1.7", "contract.pdf", Some("DOC-42"));

    assert_eq!(result.status(), ExtractionStatus::Completed);
    assert_eq!(result.confidence(), 1.0);
    assert_eq!(result.doc_id(), "DOC-42");
    assert_eq!(result.file_name(), "contract.pdf");
    assert_eq!(result.total_pages(), 2);
    assert_eq!(result.contractor_a(), Some("주식회사 알파솔루션"));
    assert_eq!(result.contractor_b(), Some("(주) 베타테크"));
    assert_eq!(result.start_date(), Some("2024-01-01"));
    assert_eq!(result.end_date(), Some("2024-12-31"));
    assert_eq!(result.amount(), Some(55_000_000));
    // raw text is the untouched transcript
    assert_eq!(result.raw_text(), CONTRACT);

    let log = messages(&result);
    assert_eq!(log[0].1, "Processing started for file: contract.pdf");
    assert!(result.logs().contains("Rule-based extraction pipeline finished."));
    assert_eq!(result.logs().count(LogLevel::Error), 0);
    assert_eq!(result.logs().count(LogLevel::Warn), 0);
}

#[test]
fn test_encrypted_document_is_single_error() {
    let pipeline = pipeline_with(EncryptedReader);
    let result = pipeline.process_bytes(b"%PDF-1.7", "locked.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Error);
    assert_eq!(result.confidence(), 0.0);
    assert_eq!(result.raw_text(), "");

    let errors: Vec<_> = result
        .logs()
        .iter()
        .filter(|e| e.level == LogLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("encrypted"));
}

#[test]
fn test_short_text_layer_triggers_ocr_fallback() {
    let renderer = RecordingRenderer::default();
    let pipeline = ExtractionPipeline::builder()
        .with_reader(FakeReader::new(3, "계약서"))
        .with_renderer(renderer.clone())
        .with_ocr(ScriptedOcr {
            first_page: CONTRACT.to_string(),
        })
        .build();

    let result = pipeline.process_bytes(b"%PDF-1.7", "scan.pdf", None);

    assert!(result.logs().contains("falling back to OCR at 300 DPI"));
    assert_eq!(*renderer.pages.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(result.raw_text(), CONTRACT);
    assert_eq!(result.status(), ExtractionStatus::Completed);
    assert_eq!(result.confidence(), 1.0);
}

#[test]
fn test_unavailable_ocr_degrades_to_empty_transcript() {
    let pipeline = pipeline_with(FakeReader::new(1, "짧음"));
    let result = pipeline.process_bytes(b"%PDF-1.7", "scan.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Completed);
    assert_eq!(result.raw_text(), "");
    assert_eq!(result.confidence(), 0.0);
    assert!(result.logs().contains("OCR engine unavailable"));
    assert_eq!(result.logs().count(LogLevel::Error), 0);
}

#[test]
fn test_ocr_is_capped_at_configured_pages() {
    let renderer = RecordingRenderer::default();
    let pipeline = ExtractionPipeline::builder()
        .with_reader(FakeReader::new(25, ""))
        .with_renderer(renderer.clone())
        .with_ocr(ScriptedOcr {
            first_page: String::new(),
        })
        .build();

    let result = pipeline.process_bytes(b"%PDF-1.7", "long.pdf", None);

    assert_eq!(renderer.pages.lock().unwrap().len(), 10);
    assert_eq!(result.total_pages(), 25);
    assert!(result.logs().contains("pages 11-25 skipped"));
    assert_eq!(result.status(), ExtractionStatus::Completed);
}

#[test]
fn test_configured_thresholds_are_honored() {
    let config = ContraxConfig {
        pdf: PdfConfig {
            min_text_length: 5,
            max_ocr_pages: 2,
            ..PdfConfig::default()
        },
        ..ContraxConfig::default()
    };
    let pipeline = ExtractionPipeline::builder()
        .with_config(config)
        .with_reader(FakeReader::new(4, "계약서 본문"))
        .without_ocr()
        .build();

    let result = pipeline.process_bytes(b"%PDF-1.7", "short.pdf", None);

    assert!(!result.logs().contains("falling back to OCR"));
    assert_eq!(result.raw_text(), "계약서 본문");
}

#[test]
fn test_extraction_is_deterministic() {
    let pipeline = pipeline_with(FakeReader::new(1, CONTRACT));
    let first = pipeline.process_bytes(b"%PDF-1.7 same", "a.pdf", None);
    let second = pipeline.process_bytes(b"%PDF-1.7 same", "a.pdf", None);

    assert_eq!(first.doc_id(), second.doc_id());
    assert_eq!(first.fields(), second.fields());
    assert_eq!(first.confidence(), second.confidence());
    assert_eq!(messages(&first), messages(&second));
}

#[test]
fn test_internal_panic_is_mapped_to_error() {
    let pipeline = pipeline_with(PanickingReader);
    let result = pipeline.process_bytes(b"%PDF-1.7", "weird.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Error);
    assert_eq!(result.confidence(), 0.0);
    assert_eq!(result.logs().count(LogLevel::Error), 1);
    assert!(result.logs().contains("internal error"));
}

#[test]
fn test_out_of_range_amount_leaves_field_absent() {
    let text = CONTRACT.replace("55,000,000", "0");
    let pipeline = pipeline_with(FakeReader::new(1, &text));
    let result = pipeline.process_bytes(b"%PDF-1.7", "zero.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Completed);
    assert_eq!(result.amount(), None);
    assert_eq!(result.confidence(), 0.8);
    assert_eq!(result.logs().count(LogLevel::Warn), 1);
}

#[test]
fn test_process_reader_reads_from_start() {
    let pipeline = pipeline_with(FakeReader::new(1, CONTRACT));
    let mut cursor = Cursor::new(b"%PDF-1.7 cursor".to_vec());
    cursor.set_position(5);

    let from_reader = pipeline.process_reader(&mut cursor, "c.pdf", None);
    let from_bytes = pipeline.process_bytes(b"%PDF-1.7 cursor", "c.pdf", None);

    assert_eq!(from_reader.doc_id(), from_bytes.doc_id());
    assert_eq!(from_reader.status(), ExtractionStatus::Completed);
}

#[test]
fn test_result_json_shape() {
    let pipeline = pipeline_with(FakeReader::new(1, CONTRACT));
    let result = pipeline.process_bytes(b"%PDF-1.7", "contract.pdf", Some("DOC-7"));
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(json["docId"], "DOC-7");
    assert_eq!(json["status"], "completed");
    assert_eq!(json["contractorA"], "주식회사 알파솔루션");
    assert_eq!(json["amount"], 55_000_000);
    assert_eq!(json["confidence"], 1.0);
    assert_eq!(json["logs"][0]["level"], "INFO");
}

#[test]
fn test_pipeline_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ExtractionPipeline>();
}

#[test]
fn test_real_pdf_not_a_pdf_is_corrupt() {
    let result = ExtractionPipeline::default().process_bytes(b"PK\x03\x04 zip archive", "notes.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Error);
    assert_eq!(result.logs().count(LogLevel::Error), 1);
    assert!(result.logs().contains("corrupt"));
}

#[test]
fn test_real_pdf_without_pages_is_corrupt() {
    let data = build_pdf(&[]);
    let result = ExtractionPipeline::default().process_bytes(&data, "empty.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Error);
    assert_eq!(result.confidence(), 0.0);
    assert!(result.logs().contains("corrupt"));
}

#[test]
fn test_real_pdf_short_text_without_ocr() {
    let data = build_pdf(&["Hello"]);
    let pipeline = ExtractionPipeline::builder().with_ocr(DisabledOcr).build();
    let result = pipeline.process_bytes(&data, "hello.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Completed);
    assert_eq!(result.total_pages(), 1);
    assert!(result.logs().contains("falling back to OCR"));
    assert!(result.logs().contains("OCR engine unavailable"));
}

#[test]
fn test_real_pdf_with_empty_user_password_is_decrypted() {
    let data = encrypt_pdf(&build_pdf(&["Hello", "World"]), "");
    let pipeline = ExtractionPipeline::builder().without_ocr().build();
    let result = pipeline.process_bytes(&data, "open.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Completed);
    assert_eq!(result.total_pages(), 2);
    assert_eq!(result.logs().count(LogLevel::Error), 0);
    assert!(!result.logs().contains("encrypted"));
}

#[test]
fn test_real_pdf_with_user_password_is_single_error() {
    let data = encrypt_pdf(&build_pdf(&["Hello"]), "user-secret");
    let pipeline = ExtractionPipeline::builder().without_ocr().build();
    let result = pipeline.process_bytes(&data, "locked.pdf", None);

    assert_eq!(result.status(), ExtractionStatus::Error);
    assert_eq!(result.confidence(), 0.0);
    assert_eq!(result.raw_text(), "");

    let errors: Vec<_> = result
        .logs()
        .iter()
        .filter(|e| e.level == LogLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("encrypted"));
}

#[test]
fn test_pdf_extractor_reports_password_protection() {
    let data = encrypt_pdf(&build_pdf(&["Hello"]), "user-secret");
    assert!(matches!(PdfExtractor::new().read(&data), Err(PdfError::Encrypted)));

    let open = encrypt_pdf(&build_pdf(&["Hello"]), "");
    assert_eq!(PdfExtractor::new().read(&open).unwrap().page_count, 1);
}

#[test]
fn test_process_file_uses_file_name_and_mtime_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("계약서.pdf");
    std::fs::write(&path, build_pdf(&["Hello"])).unwrap();

    let pipeline = ExtractionPipeline::builder().without_ocr().build();
    let result = pipeline.process_file(&path, None);

    assert_eq!(result.file_name(), "계약서.pdf");
    assert!(result.doc_id().starts_with("DOC-"));
    assert!(result.doc_id()[4..].chars().all(|c| c.is_ascii_digit()));
}
