use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use processo_core::{BackendError, TextBackend};

use crate::command;

/// Whole-document text via `pdftotext` (plain text extractor B).
#[derive(Debug, Clone)]
pub struct PdftotextBackend {
    program: PathBuf,
}

impl Default for PdftotextBackend {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl PdftotextBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TextBackend for PdftotextBackend {
    fn name(&self) -> &str {
        "pdftotext"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let output = command::run(
            &self.program,
            [
                OsStr::new("-enc"),
                OsStr::new("UTF-8"),
                path.as_os_str(),
                OsStr::new("-"),
            ],
        )?;
        // pdftotext separates pages with form feeds.
        Ok(String::from_utf8_lossy(&output.stdout).replace('\x0c', "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_fails_the_strategy() {
        let backend = PdftotextBackend::new("/nonexistent/pdftotext");
        let err = backend.extract_text(Path::new("doc.pdf")).unwrap_err();
        assert!(matches!(err, BackendError::ToolNotFound { .. }));
    }
}
