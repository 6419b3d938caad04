use std::path::Path;

use mupdf::{Document, Page, TextPage, TextPageFlags};

use processo_core::{
    BBox, BackendError, LayoutBackend, LayoutDocument, PositionedLine, TextBackend,
};

/// MuPDF-based text and layout engine.
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (AGPL-3.0) so the rest of the workspace does not transitively depend on it.
///
/// Serves two strategies: whole-document text (plain text extractor A) and
/// per-page positioned lines for rebuilding the structured page's tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

fn open_document(path: &Path) -> Result<Document, BackendError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;
    Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))
}

fn extraction_error(e: mupdf::Error) -> BackendError {
    BackendError::ExtractionError(e.to_string())
}

fn load_text_page(page: &Page) -> Result<TextPage, BackendError> {
    page.to_text_page(TextPageFlags::empty())
        .map_err(extraction_error)
}

/// Page text in block/line order, one line per output line.
fn collect_text(text_page: &TextPage) -> String {
    let mut out = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            let line_text: String = line
                .chars()
                .map(|c| c.char().unwrap_or('\u{FFFD}'))
                .collect();
            out.push_str(&line_text);
            out.push('\n');
        }
    }
    out
}

fn collect_lines(text_page: &TextPage) -> Vec<PositionedLine> {
    let mut lines = Vec::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            let text: String = line
                .chars()
                .map(|c| c.char().unwrap_or('\u{FFFD}'))
                .collect();
            if text.trim().is_empty() {
                continue;
            }
            let r = line.bounds();
            lines.push(PositionedLine::new(text, BBox::new(r.x0, r.y0, r.x1, r.y1)));
        }
    }
    lines
}

impl TextBackend for MupdfBackend {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let document = MupdfDocument::open(path)?;
        let count = document.page_count()?;
        let mut pages_text = Vec::with_capacity(count);
        for index in 0..count {
            pages_text.push(document.page_text(index)?);
        }
        Ok(pages_text.join("\n"))
    }
}

impl LayoutBackend for MupdfBackend {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn LayoutDocument + '_>, BackendError> {
        Ok(Box::new(MupdfDocument::open(path)?))
    }
}

/// An open MuPDF document.
pub struct MupdfDocument {
    document: Document,
}

impl MupdfDocument {
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let document = open_document(path)?;
        Ok(Self { document })
    }

    fn text_page(&self, index: usize) -> Result<TextPage, BackendError> {
        let index = i32::try_from(index)
            .map_err(|_| BackendError::ExtractionError(format!("page index {index} out of range")))?;
        let page = self.document.load_page(index).map_err(extraction_error)?;
        load_text_page(&page)
    }
}

impl LayoutDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        let count = self.document.page_count().map_err(extraction_error)?;
        Ok(count.max(0) as usize)
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        Ok(collect_text(&self.text_page(index)?))
    }

    fn page_lines(&self, index: usize) -> Result<Vec<PositionedLine>, BackendError> {
        let lines = collect_lines(&self.text_page(index)?);
        tracing::trace!(page = index + 1, lines = lines.len(), "positioned lines");
        Ok(lines)
    }
}
