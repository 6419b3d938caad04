use std::path::Path;

use crate::backend::{BackendError, OcrEngine, Rasterizer};

/// Tesseract language code for Portuguese. Filings are always OCR'd in it.
pub const OCR_LANGUAGE: &str = "por";

/// Last-resort strategy: rasterize every page and run OCR over each image.
///
/// Page images live in a scratch directory owned by the call, removed on
/// every exit path including errors.
pub struct OcrExtractor {
    rasterizer: Box<dyn Rasterizer>,
    engine: Box<dyn OcrEngine>,
}

impl OcrExtractor {
    pub fn new(rasterizer: Box<dyn Rasterizer>, engine: Box<dyn OcrEngine>) -> Self {
        Self { rasterizer, engine }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Concatenated OCR text of all pages, in page order.
    pub fn extract(&self, path: &Path) -> Result<String, BackendError> {
        let scratch = tempfile::Builder::new().prefix("processo-ocr-").tempdir()?;
        let images = self.rasterizer.render_pages(path, scratch.path())?;
        tracing::debug!(pages = images.len(), lang = OCR_LANGUAGE, "rendered pages for OCR");

        let mut text = String::new();
        for (i, image) in images.iter().enumerate() {
            let page_text = self.engine.recognize(image, OCR_LANGUAGE)?;
            tracing::trace!(page = i + 1, chars = page_text.len(), "page recognized");
            text.push_str(&page_text);
        }
        Ok(text)
    }
}
