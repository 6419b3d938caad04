//! Ordered extraction strategies with fallback.
//!
//! Strategies run strictly in sequence, most structured first and OCR
//! last. The first result that passes its success test is returned; every
//! error or panic inside a strategy only moves the pipeline on to the next
//! one. Exhausting all strategies yields [`ExtractionResult::None`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::backend::{BackendError, TextBackend};
use crate::model::{ExtractionResult, Method};
use crate::ocr::OcrExtractor;
use crate::structured::StructuredTableExtractor;

/// Strategy order. `Method::None` is the sentinel and never attempted.
pub const STRATEGY_ORDER: [Method; 4] = [
    Method::Structured,
    Method::PlainA,
    Method::PlainB,
    Method::Ocr,
];

pub struct ExtractionPipeline {
    structured: StructuredTableExtractor,
    plain_a: Box<dyn TextBackend>,
    plain_b: Box<dyn TextBackend>,
    ocr: OcrExtractor,
}

impl ExtractionPipeline {
    pub fn new(
        structured: StructuredTableExtractor,
        plain_a: Box<dyn TextBackend>,
        plain_b: Box<dyn TextBackend>,
        ocr: OcrExtractor,
    ) -> Self {
        Self {
            structured,
            plain_a,
            plain_b,
            ocr,
        }
    }

    /// Run the cascade over one document. Never fails.
    pub fn extract(&self, path: &Path) -> ExtractionResult {
        for method in STRATEGY_ORDER {
            match self.run_guarded(method, path) {
                Ok(result) if result.is_usable() => {
                    tracing::info!(
                        method = %method,
                        path = %path.display(),
                        chars = result.text().len(),
                        "extraction succeeded"
                    );
                    return result;
                }
                Ok(_) => {
                    tracing::debug!(method = %method, "strategy produced no usable output");
                }
                Err(e) => {
                    tracing::debug!(method = %method, error = %e, "strategy failed");
                }
            }
        }

        tracing::warn!(path = %path.display(), "all extraction strategies failed");
        ExtractionResult::None
    }

    fn run_guarded(&self, method: Method, path: &Path) -> Result<ExtractionResult, BackendError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.run(method, path)))
            .unwrap_or_else(|payload| Err(BackendError::Panicked(panic_message(&*payload))))
    }

    fn run(&self, method: Method, path: &Path) -> Result<ExtractionResult, BackendError> {
        match method {
            Method::Structured => self.structured.extract(path).map(ExtractionResult::Structured),
            Method::PlainA => self.plain_a.extract_text(path).map(ExtractionResult::PlainA),
            Method::PlainB => self.plain_b.extract_text(path).map(ExtractionResult::PlainB),
            Method::Ocr => self.ocr.extract(path).map(ExtractionResult::Ocr),
            Method::None => Ok(ExtractionResult::None),
        }
    }

    /// Engine names in strategy order, for diagnostics.
    pub fn engines(&self) -> [(Method, &str); 4] {
        [
            (Method::Structured, self.structured.backend_name()),
            (Method::PlainA, self.plain_a.name()),
            (Method::PlainB, self.plain_b.name()),
            (Method::Ocr, self.ocr.engine_name()),
        ]
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
