//! OCR engine seam used by the text acquirer's fallback path.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;

use crate::error::OcrError;

/// A recognized text region.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    /// Axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub rect: (f32, f32, f32, f32),
    /// Recognized text.
    pub text: String,
    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

/// Factory for OCR sessions.
///
/// Opening a session loads whatever the engine needs for one language. An
/// engine whose runtime or language data is missing returns
/// [`OcrError::Unavailable`]; the acquirer treats that as a degraded
/// condition, never as a fault.
pub trait OcrEngine {
    fn open(&self, language: &str) -> Result<Box<dyn OcrSession + '_>, OcrError>;
}

/// A loaded engine recognizing pages for one language.
pub trait OcrSession {
    /// Recognize the text on one rasterized page.
    fn recognize(&mut self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Engine used when OCR is disabled; every session is unavailable.
#[derive(Debug, Clone, Default)]
pub struct DisabledOcr;

impl OcrEngine for DisabledOcr {
    fn open(&self, _language: &str) -> Result<Box<dyn OcrSession + '_>, OcrError> {
        Err(OcrError::Unavailable("OCR is disabled".to_string()))
    }
}

/// Join regions into a transcript in reading order: rows top to bottom,
/// regions within a row left to right.
pub fn join_reading_order(mut regions: Vec<TextRegion>, row_height: f32) -> String {
    let row_height = row_height.max(1.0);
    regions.sort_by(|a, b| {
        let row_a = (a.rect.1 / row_height) as i64;
        let row_b = (b.rect.1 / row_height) as i64;
        row_a
            .cmp(&row_b)
            .then_with(|| a.rect.0.partial_cmp(&b.rect.0).unwrap_or(std::cmp::Ordering::Equal))
    });

    regions
        .iter()
        .map(|r| r.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
