//! PDF text layer extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfError, Result, TextLayer, TextLayerReader, has_pdf_header};

/// Text layer reader backed by lopdf (container, encryption, pages) and
/// pdf-extract (text decoding).
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    fn decode_text(&self, doc: &Document, data: &[u8]) -> std::result::Result<String, String> {
        let primary = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(data)
        }));

        let reason = match primary {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "pdf-extract panicked while decoding content streams".to_string(),
        };
        debug!("pdf-extract failed ({}), retrying with lopdf", reason);

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let fallback = panic::catch_unwind(AssertUnwindSafe(|| doc.extract_text(&pages)));
        match fallback {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(format!("{}; lopdf: {}", reason, e)),
            Err(_) => Err(reason),
        }
    }
}

impl TextLayerReader for PdfExtractor {
    fn read(&self, data: &[u8]) -> Result<TextLayer> {
        let (doc, plain) = load_document(data)?;

        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }
        debug!("Loaded PDF with {} pages", page_count);

        let bytes = plain.as_deref().unwrap_or(data);
        let (text, extraction_error) = match self.decode_text(&doc, bytes) {
            Ok(text) => (text, None),
            Err(reason) => {
                warn!("Text layer could not be decoded: {}", reason);
                (String::new(), Some(reason))
            }
        };
        trace!("Text layer: {} bytes", text.len());

        Ok(TextLayer {
            page_count,
            text,
            extraction_error,
        })
    }
}

/// Parse a PDF container, decrypting it when it only carries an empty user
/// password.
///
/// Returns the document and, for decrypted documents, the re-serialized
/// plain bytes that downstream decoders should read instead of `data`.
pub(crate) fn load_document(data: &[u8]) -> Result<(Document, Option<Vec<u8>>)> {
    if !has_pdf_header(data) {
        return Err(PdfError::Parse("missing %PDF header".to_string()));
    }

    let mut doc = Document::load_mem(data).map_err(|e| {
        let message = e.to_string();
        let lower = message.to_lowercase();
        if lower.contains("encrypt") || lower.contains("decrypt") || lower.contains("password") {
            PdfError::Encrypted
        } else {
            PdfError::Parse(message)
        }
    })?;

    if !doc.is_encrypted() {
        return Ok((doc, None));
    }

    if doc.decrypt("").is_err() {
        return Err(PdfError::Encrypted);
    }
    debug!("Decrypted PDF with empty password");

    let mut plain = Vec::new();
    doc.save_to(&mut plain)
        .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
    Ok((doc, Some(plain)))
}
