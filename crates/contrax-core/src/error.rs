//! Error types for the contrax-core library.

use thiserror::Error;

/// Main error type for the contrax library.
#[derive(Error, Debug)]
pub enum ContraxError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF container.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to rasterize a page.
    #[error("failed to render page: {0}")]
    Render(String),

    /// The PDF requires a password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// The byte source could not be read.
    #[error("failed to read PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The engine or its language data is not installed.
    #[error("OCR unavailable: {0}")]
    Unavailable(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to contract field extraction. Never escalated past the
/// extractor that produced them; they become warnings in the log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Failed to parse a value.
    #[error("failed to parse {field}: {value:?}")]
    Parse { field: String, value: String },

    /// A parsed value fell outside the accepted range.
    #[error("{field} {value} outside accepted range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Terminal faults of the text acquisition stage.
///
/// Anything not listed here is a degraded-but-recoverable condition and is
/// reported through the extraction log instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionFault {
    /// The document requires a password.
    #[error("document is encrypted and requires a password")]
    Encrypted,

    /// The container cannot be parsed (bad header, truncated, zero pages).
    #[error("document is corrupt: {0}")]
    Corrupt(String),

    /// The byte source could not be read.
    #[error("failed to read document: {0}")]
    Io(String),
}

impl From<PdfError> for AcquisitionFault {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Encrypted => AcquisitionFault::Encrypted,
            PdfError::Io(e) => AcquisitionFault::Io(e.to_string()),
            PdfError::NoPages => AcquisitionFault::Corrupt("document has no pages".to_string()),
            other => AcquisitionFault::Corrupt(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AcquisitionFault {
    fn from(err: std::io::Error) -> Self {
        AcquisitionFault::Io(err.to_string())
    }
}

/// Result type for the contrax library.
pub type Result<T> = std::result::Result<T, ContraxError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pdf_error_maps_to_fault() {
        assert_eq!(AcquisitionFault::from(PdfError::Encrypted), AcquisitionFault::Encrypted);
        assert_eq!(
            AcquisitionFault::from(PdfError::NoPages),
            AcquisitionFault::Corrupt("document has no pages".to_string())
        );
        assert!(matches!(
            AcquisitionFault::from(PdfError::Parse("bad xref".to_string())),
            AcquisitionFault::Corrupt(msg) if msg.contains("bad xref")
        ));
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        assert!(matches!(
            AcquisitionFault::from(PdfError::Io(io)),
            AcquisitionFault::Io(msg) if msg.contains("short read")
        ));
    }

    #[test]
    fn test_io_error_converts_to_contrax_error() {
        let err: ContraxError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ContraxError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }

    #[test]
    fn test_encrypted_fault_message_mentions_encryption() {
        assert!(AcquisitionFault::Encrypted.to_string().contains("encrypted"));
    }
}
