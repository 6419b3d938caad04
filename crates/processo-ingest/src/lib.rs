use std::path::{Path, PathBuf};

use processo_core::structured::STRUCTURED_PAGE_INDEX;
use processo_core::{
    BackendError, Config, ExtractionPipeline, ImageFormat, OcrExtractor, Rasterizer,
    SectionSplitter, Sections, StructuredTableExtractor,
};
use processo_pdf_mupdf::MupdfBackend;
use processo_poppler::{PdftoppmRasterizer, PdftotextBackend, TesseractEngine};
use processo_sections::{HeadingSplitter, RegexSplitter};

// Re-export domain types for convenience
pub use processo_core::{ExtractionResult, Method};

/// Page rasterizer configured from `config`.
pub fn rasterizer(config: &Config) -> PdftoppmRasterizer {
    PdftoppmRasterizer::new(&config.pdftoppm_path).with_dpi(config.ocr_dpi)
}

/// The production cascade: MuPDF tables, MuPDF text, pdftotext, then
/// pdftoppm + tesseract OCR.
pub fn default_pipeline(config: &Config) -> ExtractionPipeline {
    let ocr = OcrExtractor::new(
        Box::new(rasterizer(config)),
        Box::new(TesseractEngine::new(&config.tesseract_path)),
    );

    ExtractionPipeline::new(
        StructuredTableExtractor::new(Box::new(MupdfBackend)),
        Box::new(MupdfBackend),
        Box::new(PdftotextBackend::new(&config.pdftotext_path)),
        ocr,
    )
}

/// Output of the pre-AI stage for one document.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub extraction: ExtractionResult,
    /// Sections from the label-driven splitter; these feed the summary.
    pub sections: Sections,
    /// Sections from the heading-driven splitter, shown for comparison.
    pub heading_sections: Sections,
}

/// Extract a document and split its text with both splitters.
pub fn preprocess(path: &Path, pipeline: &ExtractionPipeline) -> Preprocessed {
    split_with(pipeline.extract(path), &RegexSplitter, &HeadingSplitter)
}

fn split_with(
    extraction: ExtractionResult,
    primary: &dyn SectionSplitter,
    secondary: &dyn SectionSplitter,
) -> Preprocessed {
    let text = extraction.text();
    let sections = primary.split(text);
    let heading_sections = secondary.split(text);
    tracing::debug!(
        method = %extraction.method(),
        primary = primary.name(),
        secondary = secondary.name(),
        "sections split"
    );
    Preprocessed {
        extraction,
        sections,
        heading_sections,
    }
}

/// Render the structured page (the second page) as a JPEG into `out_dir`.
pub fn render_structured_page(
    rasterizer: &dyn Rasterizer,
    path: &Path,
    out_dir: &Path,
) -> Result<PathBuf, BackendError> {
    rasterizer.render_page(path, STRUCTURED_PAGE_INDEX, out_dir, ImageFormat::Jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use processo_core::pipeline::STRATEGY_ORDER;

    #[test]
    fn split_runs_both_splitters_over_the_text() {
        let text = "Autor: Maria Souza\n1\nDos fatos\nHouve cobrança.\nDos pedidos\n";
        let out = split_with(
            ExtractionResult::PlainB(text.to_string()),
            &RegexSplitter,
            &HeadingSplitter,
        );
        assert_eq!(out.extraction.method(), Method::PlainB);
        assert_eq!(out.sections.facts, "Houve cobrança.");
        assert_eq!(out.sections.parties[0].role.as_deref(), Some("Autor"));
        assert_eq!(out.heading_sections.facts, "Houve cobrança.\n");
    }

    #[test]
    fn empty_extraction_splits_to_empty_sections() {
        let out = split_with(ExtractionResult::None, &RegexSplitter, &HeadingSplitter);
        assert!(out.sections.is_empty());
        assert!(out.heading_sections.is_empty());
    }

    #[test]
    fn default_pipeline_uses_configured_engines() {
        let pipeline = default_pipeline(&Config::default());
        let engines = pipeline.engines();
        let methods: Vec<_> = engines.iter().map(|(method, _)| *method).collect();
        assert_eq!(methods, STRATEGY_ORDER);
        let names: Vec<_> = engines.iter().map(|(_, name)| *name).collect();
        assert_eq!(names, vec!["mupdf", "mupdf", "pdftotext", "tesseract"]);
    }
}
