//! PDF processing module.

mod extractor;
mod render;

pub use extractor::PdfExtractor;
pub use render::PdfRasterizer;

pub(crate) use extractor::load_document;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Embedded text layer of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLayer {
    /// Number of pages in the document (always at least one).
    pub page_count: u32,
    /// Transcript of the embedded text, possibly empty.
    pub text: String,
    /// Set when the container loaded but its text could not be decoded.
    pub extraction_error: Option<String>,
}

/// Reads the embedded text layer of a PDF.
///
/// Implementations fail with [`PdfError::Encrypted`] for password-protected
/// documents, [`PdfError::NoPages`] or [`PdfError::Parse`] for unusable
/// containers. A container that loads but whose text cannot be decoded is
/// not a failure; it yields an empty transcript with `extraction_error` set.
pub trait TextLayerReader {
    fn read(&self, data: &[u8]) -> Result<TextLayer>;
}

/// Rasterizes a single page of a PDF.
pub trait PageRenderer {
    /// Render page `page` (1-indexed) at `dpi`.
    fn render_page(&self, data: &[u8], page: u32, dpi: u32) -> Result<DynamicImage>;
}

/// Whether the first kilobyte of `data` carries a `%PDF-` marker.
pub fn has_pdf_header(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}
