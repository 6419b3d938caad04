use std::path::Path;

use crate::backend::{BackendError, LayoutBackend};
use crate::layout::TableDetector;
use crate::model::StructuredContent;
use crate::tables;

/// Index of the page that carries the case metadata tables (the second page).
pub const STRUCTURED_PAGE_INDEX: usize = 1;

/// Highest-fidelity strategy: narrative text from every other page plus
/// the tables of the structured page.
pub struct StructuredTableExtractor {
    backend: Box<dyn LayoutBackend>,
    detector: TableDetector,
    structured_page: usize,
}

impl StructuredTableExtractor {
    pub fn new(backend: Box<dyn LayoutBackend>) -> Self {
        Self {
            backend,
            detector: TableDetector::default(),
            structured_page: STRUCTURED_PAGE_INDEX,
        }
    }

    pub fn with_detector(mut self, detector: TableDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_structured_page(mut self, index: usize) -> Self {
        self.structured_page = index;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Any engine error aborts the whole strategy.
    pub fn extract(&self, path: &Path) -> Result<StructuredContent, BackendError> {
        let document = self.backend.open(path)?;
        let page_count = document.page_count()?;

        let mut raw_tables = Vec::new();
        if page_count > self.structured_page {
            let lines = document.page_lines(self.structured_page)?;
            raw_tables = self
                .detector
                .detect(&lines)
                .into_iter()
                .filter(|t| t.len() > 1)
                .collect();
            tracing::debug!(
                page = self.structured_page + 1,
                tables = raw_tables.len(),
                "tables found on structured page"
            );
        }
        let parsed = tables::parse_tables(&raw_tables);

        let mut text = String::new();
        for index in (0..page_count).filter(|&i| i != self.structured_page) {
            let page_text = document.page_text(index)?;
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&page_text);
        }

        Ok(StructuredContent {
            text,
            subjects: parsed.subjects,
            parties: parsed.parties,
            additional_info: parsed.additional_info,
            raw_tables,
        })
    }
}
