//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ContraxError;

/// Main configuration for the contrax pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContraxConfig {
    /// PDF text acquisition configuration.
    pub pdf: PdfConfig,

    /// OCR fallback configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// PDF text acquisition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to rasterize and OCR.
    pub max_ocr_pages: usize,

    /// Minimum embedded text length (characters) before falling back to OCR.
    pub min_text_length: usize,

    /// Use the embedded text layer when it is long enough.
    pub prefer_embedded_text: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_ocr_pages: 10,
            min_text_length: 100,
            prefer_embedded_text: true,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Allow the OCR fallback at all.
    pub enabled: bool,

    /// Language hint; selects `{language}_rec.onnx` and `{language}_dict.txt`.
    pub language: String,

    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Keep `[UNK]` placeholders in recognized text.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "korean".to_string(),
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Recognition model file name for a language.
    pub fn recognition_model(&self, language: &str) -> String {
        format!("{}_rec.onnx", language)
    }

    /// Character dictionary file name for a language.
    pub fn dictionary(&self, language: &str) -> String {
        format!("{}_dict.txt", language)
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Smallest accepted contract amount.
    pub min_amount: u64,

    /// Largest accepted contract amount.
    pub max_amount: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_amount: 1,
            max_amount: 1_000_000_000_000,
        }
    }
}

impl ContraxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ContraxError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ContraxError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ContraxError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ContraxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ContraxError> {
        if self.pdf.render_dpi == 0 {
            return Err(ContraxError::Config("pdf.render_dpi must be positive".to_string()));
        }
        if self.extraction.min_amount > self.extraction.max_amount {
            return Err(ContraxError::Config(
                "extraction.min_amount must not exceed extraction.max_amount".to_string(),
            ));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(ContraxError::Config("ocr.language must not be empty".to_string()));
        }
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.ocr.model_dir.join(model_name)
    }
}
