//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{OcrEngine, OcrSession, TextRegion, join_reading_order};

/// OCR engine backed by `pure-onnx-ocr` (PaddleOCR models, no external
/// runtime). Models are looked up per language in the configured directory:
/// `det.onnx`, `{language}_rec.onnx`, `{language}_dict.txt`.
#[derive(Debug, Clone)]
pub struct PureOcrEngine {
    config: OcrConfig,
}

impl PureOcrEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Create an engine reading models from a directory, default settings otherwise.
    pub fn from_dir(model_dir: &Path) -> Self {
        Self::new(OcrConfig {
            model_dir: model_dir.to_path_buf(),
            ..OcrConfig::default()
        })
    }

    fn model_files(&self, language: &str) -> [PathBuf; 3] {
        let dir = &self.config.model_dir;
        [
            dir.join(&self.config.detection_model),
            dir.join(self.config.recognition_model(language)),
            dir.join(self.config.dictionary(language)),
        ]
    }
}

impl OcrEngine for PureOcrEngine {
    fn open(&self, language: &str) -> Result<Box<dyn OcrSession + '_>, OcrError> {
        if !self.config.enabled {
            return Err(OcrError::Unavailable("OCR is disabled in configuration".to_string()));
        }

        let [det_path, rec_path, dict_path] = self.model_files(language);
        if let Some(missing) = [&det_path, &rec_path, &dict_path].into_iter().find(|p| !p.exists()) {
            return Err(OcrError::Unavailable(format!(
                "model data for language '{}' not found: {}",
                language,
                missing.display()
            )));
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::Unavailable(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine for '{}' from {}",
            language,
            self.config.model_dir.display()
        );

        Ok(Box::new(PureOcrSession {
            engine,
            keep_unk: self.config.keep_unk,
        }))
    }
}

struct PureOcrSession {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl OcrSession for PureOcrSession {
    fn recognize(&mut self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let regions: Vec<TextRegion> = results
            .iter()
            .map(|r| TextRegion {
                rect: polygon_rect(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        debug!(
            "OCR: {} text regions on {}x{} page in {}ms",
            regions.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        // Rows are grouped by roughly one line of 10pt text at the render DPI.
        let row_height = (height as f32 / 120.0).max(20.0);
        Ok(join_reading_order(regions, row_height))
    }
}

/// Axis-aligned bounds of a detected polygon.
fn polygon_rect(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32, f32, f32) {
    let mut rect = (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for coord in polygon.exterior().coords() {
        let (x, y) = (coord.x as f32, coord.y as f32);
        rect.0 = rect.0.min(x);
        rect.1 = rect.1.min(y);
        rect.2 = rect.2.max(x);
        rect.3 = rect.3.max(y);
    }
    if rect.0.is_infinite() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_language_data_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("det.onnx"), b"").unwrap();

        let engine = PureOcrEngine::from_dir(dir.path());
        match engine.open("korean") {
            Err(OcrError::Unavailable(msg)) => assert!(msg.contains("korean_rec.onnx")),
            Err(other) => panic!("expected Unavailable, got {}", other),
            Ok(_) => panic!("expected Unavailable, got a session"),
        }
    }

    #[test]
    fn test_disabled_config_is_unavailable() {
        let engine = PureOcrEngine::new(OcrConfig {
            enabled: false,
            ..OcrConfig::default()
        });
        assert!(matches!(engine.open("korean"), Err(OcrError::Unavailable(_))));
    }
}
