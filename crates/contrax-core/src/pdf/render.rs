//! Page rasterization for the OCR fallback.
//!
//! Pages are rendered with poppler's `pdftoppm` at the requested DPI. When
//! the tool is missing or fails, the largest image embedded on the page is
//! decoded instead, which covers the common case of scanned contracts where
//! every page is a single full-page image.

use std::path::PathBuf;
use std::process::Command;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PageRenderer, PdfError, Result, load_document};

/// Renders pages with `pdftoppm`, falling back to embedded page images.
#[derive(Debug, Clone)]
pub struct PdfRasterizer {
    pdftoppm: PathBuf,
    embedded_fallback: bool,
}

impl PdfRasterizer {
    pub fn new() -> Self {
        Self {
            pdftoppm: PathBuf::from("pdftoppm"),
            embedded_fallback: true,
        }
    }

    /// Use a specific `pdftoppm` binary.
    pub fn with_pdftoppm(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdftoppm = path.into();
        self
    }

    /// Enable or disable decoding embedded images when `pdftoppm` fails.
    pub fn with_embedded_fallback(mut self, enabled: bool) -> Self {
        self.embedded_fallback = enabled;
        self
    }

    fn render_with_pdftoppm(&self, data: &[u8], page: u32, dpi: u32) -> Result<DynamicImage> {
        let temp_dir = tempfile::tempdir()?;
        let pdf_path = temp_dir.path().join("input.pdf");
        let output_prefix = temp_dir.path().join("page");
        std::fs::write(&pdf_path, data)?;

        let output = Command::new(&self.pdftoppm)
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg(&pdf_path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| {
                PdfError::Render(format!("failed to run {}: {}", self.pdftoppm.display(), e))
            })?;

        if !output.status.success() {
            return Err(PdfError::Render(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let image_path = output_prefix.with_extension("png");
        image::open(&image_path)
            .map_err(|e| PdfError::Render(format!("failed to read rendered page: {}", e)))
    }

    fn embedded_page_image(&self, data: &[u8], page: u32) -> Result<DynamicImage> {
        let (doc, _) = load_document(data)?;
        let pages = doc.get_pages();
        let page_id = *pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        page_image_objects(&doc, page_id)
            .into_iter()
            .filter_map(|id| doc.get_object(id).ok())
            .filter_map(|obj| decode_image(obj))
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| PdfError::Render(format!("no embedded image on page {}", page)))
    }
}

impl Default for PdfRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for PdfRasterizer {
    fn render_page(&self, data: &[u8], page: u32, dpi: u32) -> Result<DynamicImage> {
        match self.render_with_pdftoppm(data, page, dpi) {
            Ok(image) => Ok(image),
            Err(err) if self.embedded_fallback => {
                debug!("pdftoppm unavailable for page {} ({}), decoding embedded image", page, err);
                self.embedded_page_image(data, page)
                    .map_err(|fallback| PdfError::Render(format!("{}; {}", err, fallback)))
            }
            Err(err) => Err(err),
        }
    }
}

/// Image XObjects referenced from a page's resources, walking up the page
/// tree for inherited resources.
fn page_image_objects(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let mut node = doc.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(dict) = node {
        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res))) = doc.dereference(resources) {
                if let Ok(xobjects) = res.get(b"XObject") {
                    if let Ok((_, Object::Dictionary(xdict))) = doc.dereference(xobjects) {
                        return xdict
                            .iter()
                            .filter_map(|(_, obj)| obj.as_reference().ok())
                            .collect();
                    }
                }
                return Vec::new();
            }
        }

        depth += 1;
        if depth > 32 {
            break;
        }
        node = dict
            .get(b"Parent")
            .and_then(|p| p.as_reference())
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }

    Vec::new()
}

fn decode_image(obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.clone()),
        Object::Array(arr) => arr.last().and_then(|o| o.as_name().ok()).map(|n| n.to_vec()),
        _ => None,
    });

    match filter.as_deref() {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter");
            return None;
        }
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        return None;
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| o.as_name().ok())
        .unwrap_or(b"DeviceRGB");

    let pixels = (width as usize) * (height as usize);
    match color_space {
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8)
        }
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            RgbImage::from_raw(width, height, data[..pixels * 3].to_vec())
                .map(DynamicImage::ImageRgb8)
        }
        _ => None,
    }
}
