use std::ffi::OsString;
use std::path::{Path, PathBuf};

use processo_core::{BackendError, ImageFormat, Rasterizer};

use crate::command;

/// Resolution used for OCR input.
pub const DEFAULT_DPI: u32 = 300;

const PREFIX: &str = "page";

/// Page rasterizer backed by `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PdftoppmRasterizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    fn format_flag(format: ImageFormat) -> &'static str {
        match format {
            ImageFormat::Png => "-png",
            ImageFormat::Jpeg => "-jpeg",
        }
    }
}

/// Page number encoded in a `pdftoppm` output name such as `page-07.png`.
fn page_number(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.strip_prefix(PREFIX)?.strip_prefix('-')?;
    digits.parse().ok()
}

/// Rendered images in `dir`, ordered by page number (pdftoppm zero-pads
/// names depending on page count, so lexical order is not enough).
fn rendered_pages(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, BackendError> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == extension))
        .filter_map(|p| page_number(&p).map(|n| (n, p)))
        .collect();
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, p)| p).collect())
}

impl Rasterizer for PdftoppmRasterizer {
    fn render_pages(&self, path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
        let prefix = out_dir.join(PREFIX);
        let args: Vec<OsString> = vec![
            Self::format_flag(ImageFormat::Png).into(),
            "-r".into(),
            self.dpi.to_string().into(),
            path.into(),
            prefix.into(),
        ];
        command::run(&self.program, &args)?;

        let pages = rendered_pages(out_dir, ImageFormat::Png.extension())?;
        tracing::debug!(pages = pages.len(), dpi = self.dpi, "pdftoppm rendered pages");
        Ok(pages)
    }

    fn render_page(
        &self,
        path: &Path,
        index: usize,
        out_dir: &Path,
        format: ImageFormat,
    ) -> Result<PathBuf, BackendError> {
        let number = (index + 1).to_string();
        let stem = out_dir.join(format!("{PREFIX}-{number}"));
        let args: Vec<OsString> = vec![
            Self::format_flag(format).into(),
            "-r".into(),
            self.dpi.to_string().into(),
            "-f".into(),
            number.clone().into(),
            "-l".into(),
            number.into(),
            "-singlefile".into(),
            path.into(),
            stem.clone().into(),
        ];
        command::run(&self.program, &args)?;

        let image = stem.with_extension(format.extension());
        if !image.exists() {
            return Err(BackendError::ExtractionError(format!(
                "pdftoppm produced no image for page {}",
                index + 1
            )));
        }
        Ok(image)
    }
}
