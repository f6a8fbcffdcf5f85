//! Text acquisition: embedded text layer first, raster + OCR fallback.

use tracing::debug;

use crate::error::{AcquisitionFault, OcrError};
use crate::models::config::PdfConfig;
use crate::models::log::ExtractionLog;
use crate::ocr::OcrEngine;
use crate::pdf::{PageRenderer, TextLayerReader};

/// Where the acquired transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Embedded text layer, long enough to use directly.
    TextLayer,
    /// Page rasterization followed by OCR.
    Ocr,
    /// OCR was needed but the engine was unavailable; the transcript is empty.
    Degraded,
}

/// Outcome of a successful acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredText {
    /// Untouched transcript, possibly empty.
    pub text: String,
    /// Page count reported by the container.
    pub total_pages: u32,
    /// Which path produced `text`.
    pub source: TextSource,
}

/// Obtains a best-effort transcript of one PDF.
pub struct TextAcquirer<'a> {
    reader: &'a dyn TextLayerReader,
    renderer: &'a dyn PageRenderer,
    ocr: &'a dyn OcrEngine,
    config: &'a PdfConfig,
    language: &'a str,
}

impl<'a> TextAcquirer<'a> {
    pub fn new(
        reader: &'a dyn TextLayerReader,
        renderer: &'a dyn PageRenderer,
        ocr: &'a dyn OcrEngine,
        config: &'a PdfConfig,
        language: &'a str,
    ) -> Self {
        Self {
            reader,
            renderer,
            ocr,
            config,
            language,
        }
    }

    /// Acquire a transcript, appending progress to `log`.
    ///
    /// Only container-level problems (encryption, corruption, unreadable
    /// input) are returned as faults; the caller logs them. Everything else,
    /// including an unusable OCR engine, degrades into log entries.
    pub fn acquire(
        &self,
        data: &[u8],
        log: &mut ExtractionLog,
    ) -> Result<AcquiredText, AcquisitionFault> {
        let layer = self.reader.read(data)?;
        log.info("PDF document loaded successfully.");
        log.info(format!("Total pages: {}", layer.page_count));

        if let Some(reason) = &layer.extraction_error {
            log.warn(format!("Embedded text layer could not be decoded: {}", reason));
        }

        let embedded_chars = layer.text.trim().chars().count();
        if self.config.prefer_embedded_text {
            if embedded_chars >= self.config.min_text_length {
                log.info(format!("Using embedded text layer ({} chars)", embedded_chars));
                return Ok(AcquiredText {
                    text: layer.text,
                    total_pages: layer.page_count,
                    source: TextSource::TextLayer,
                });
            }
            log.info(format!(
                "Embedded text insufficient ({} chars < {}); falling back to OCR at {} DPI",
                embedded_chars, self.config.min_text_length, self.config.render_dpi
            ));
        } else {
            log.info(format!(
                "Embedded text layer skipped by configuration; falling back to OCR at {} DPI",
                self.config.render_dpi
            ));
        }

        let (text, source) = self.ocr_pages(data, layer.page_count, log);
        Ok(AcquiredText {
            text,
            total_pages: layer.page_count,
            source,
        })
    }

    fn ocr_pages(&self, data: &[u8], page_count: u32, log: &mut ExtractionLog) -> (String, TextSource) {
        let mut session = match self.ocr.open(self.language) {
            Ok(session) => session,
            Err(e) => {
                log.warn(format!(
                    "OCR engine unavailable for language '{}' ({}); continuing with empty transcript",
                    self.language, e
                ));
                return (String::new(), TextSource::Degraded);
            }
        };

        let cap = u32::try_from(self.config.max_ocr_pages).unwrap_or(u32::MAX);
        let last_page = page_count.min(cap);
        if page_count > last_page {
            log.info(format!(
                "OCR limited to the first {} of {} pages; pages {}-{} skipped",
                last_page,
                page_count,
                last_page + 1,
                page_count
            ));
        }

        let mut pages = Vec::new();
        for page in 1..=last_page {
            let image = match self.renderer.render_page(data, page, self.config.render_dpi) {
                Ok(image) => image,
                Err(e) => {
                    log.warn(format!("Page {}: rendering failed, skipping: {}", page, e));
                    continue;
                }
            };
            debug!("Page {} rendered at {}x{}", page, image.width(), image.height());

            match session.recognize(&image) {
                Ok(text) if !text.trim().is_empty() => {
                    log.info(format!(
                        "Page {}: OCR recognized {} chars",
                        page,
                        text.trim().chars().count()
                    ));
                    pages.push(text);
                }
                Ok(_) => log.info(format!("Page {}: OCR found no text", page)),
                Err(OcrError::Unavailable(reason)) => {
                    log.warn(format!(
                        "Page {}: OCR engine became unavailable ({}); remaining pages skipped",
                        page, reason
                    ));
                    break;
                }
                Err(e) => log.warn(format!("Page {}: OCR failed, skipping: {}", page, e)),
            }
        }

        if pages.is_empty() {
            log.warn("OCR produced no text; continuing with empty transcript");
        }

        (pages.join("\n\n"), TextSource::Ocr)
    }
}
