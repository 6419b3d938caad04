use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::layout::PositionedLine;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("{tool} not found. Install poppler-utils and tesseract-ocr (tesseract-ocr-por)")]
    ToolNotFound { tool: String },
    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },
    #[error("engine panicked: {0}")]
    Panicked(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whole-document text extraction with no structural output.
pub trait TextBackend: Send + Sync {
    /// Name of this engine (for diagnostics).
    fn name(&self) -> &str;

    /// Extract the full text content of a PDF file.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}

/// An engine that exposes per-page text and positioned lines.
///
/// The structured strategy needs page geometry to rebuild the tables of
/// the structured page; everything else only reads page text.
pub trait LayoutBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Open a document. The returned handle is read-only and lives for a
    /// single extraction.
    fn open(&self, path: &Path) -> Result<Box<dyn LayoutDocument + '_>, BackendError>;
}

/// An open document as seen by a [`LayoutBackend`]. Page indices are 0-based.
pub trait LayoutDocument {
    fn page_count(&self) -> Result<usize, BackendError>;

    fn page_text(&self, index: usize) -> Result<String, BackendError>;

    /// Text lines of a page with their bounding boxes, in engine order.
    fn page_lines(&self, index: usize) -> Result<Vec<PositionedLine>, BackendError>;
}

/// Output format for rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Renders PDF pages to image files.
pub trait Rasterizer: Send + Sync {
    /// Render every page into `out_dir`, returning the image paths in page order.
    fn render_pages(&self, path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, BackendError>;

    /// Render a single 0-based page into `out_dir`.
    fn render_page(
        &self,
        path: &Path,
        index: usize,
        out_dir: &Path,
        format: ImageFormat,
    ) -> Result<PathBuf, BackendError>;
}

/// Optical character recognition over a single page image.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, image: &Path, language: &str) -> Result<String, BackendError>;
}
