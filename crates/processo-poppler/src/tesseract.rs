use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use processo_core::{BackendError, OcrEngine};

use crate::command;

/// OCR engine backed by the `tesseract` CLI. Text is read from stdout.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &Path, language: &str) -> Result<String, BackendError> {
        let output = command::run(
            &self.program,
            [
                image.as_os_str(),
                OsStr::new("stdout"),
                OsStr::new("-l"),
                OsStr::new(language),
            ],
        )?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_fails() {
        let engine = TesseractEngine::new("/nonexistent/tesseract");
        let err = engine
            .recognize(Path::new("page-1.png"), "por")
            .unwrap_err();
        assert!(matches!(err, BackendError::ToolNotFound { tool } if tool == "tesseract"));
    }
}
