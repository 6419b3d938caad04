use std::path::PathBuf;
use std::time::Duration;

pub mod backend;
pub mod config_file;
pub mod layout;
pub mod model;
pub mod ocr;
pub mod pipeline;
pub mod report;
pub mod sections;
pub mod structured;
pub mod summary;
pub mod tables;

// Re-export for convenience
pub use backend::{
    BackendError, ImageFormat, LayoutBackend, LayoutDocument, OcrEngine, Rasterizer, TextBackend,
};
pub use config_file::{ConfigError, ConfigFile};
pub use layout::{BBox, PositionedLine, TableDetector};
pub use model::{
    ExtractionResult, Method, Parties, PartyRole, RawTable, StructuredContent, Subject,
};
pub use ocr::{OCR_LANGUAGE, OcrExtractor};
pub use pipeline::ExtractionPipeline;
pub use report::{CaseDocument, Preview};
pub use sections::{PartyMention, SectionSplitter, Sections, SubjectMention};
pub use structured::StructuredTableExtractor;
pub use summary::{
    CostBreakdown, CostEntry, OpenAiClient, SummarizationClient, Summary, SummaryConfig,
    SummaryError, SummaryOutcome, TokenUsage,
};

pub const DEFAULT_OCR_DPI: u32 = 300;
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_UPLOAD_MB: u32 = 50;

/// Runtime configuration shared by the binaries.
#[derive(Clone)]
pub struct Config {
    pub openai: SummaryConfig,
    pub ocr_dpi: u32,
    pub pdftotext_path: PathBuf,
    pub pdftoppm_path: PathBuf,
    pub tesseract_path: PathBuf,
    /// Address the HTTP service listens on.
    pub bind: String,
    pub max_upload_mb: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("openai", &self.openai)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("pdftotext_path", &self.pdftotext_path)
            .field("pdftoppm_path", &self.pdftoppm_path)
            .field("tesseract_path", &self.tesseract_path)
            .field("bind", &self.bind)
            .field("max_upload_mb", &self.max_upload_mb)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: SummaryConfig::default(),
            ocr_dpi: DEFAULT_OCR_DPI,
            pdftotext_path: PathBuf::from("pdftotext"),
            pdftoppm_path: PathBuf::from("pdftoppm"),
            tesseract_path: PathBuf::from("tesseract"),
            bind: DEFAULT_BIND.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl Config {
    /// Defaults overridden by whatever the file sets.
    pub fn from_file(file: &ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(openai) = &file.openai {
            if let Some(key) = &openai.api_key {
                config.openai.api_key = Some(key.clone());
            }
            if let Some(url) = &openai.base_url {
                config.openai.base_url = url.clone();
            }
            if let Some(model) = &openai.model {
                config.openai.model = model.clone();
            }
            if let Some(t) = openai.temperature {
                config.openai.temperature = t;
            }
            if let Some(n) = openai.max_tokens {
                config.openai.max_tokens = n;
            }
            if let Some(secs) = openai.timeout_secs {
                config.openai.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(extraction) = &file.extraction {
            if let Some(dpi) = extraction.ocr_dpi {
                config.ocr_dpi = dpi;
            }
            if let Some(p) = &extraction.pdftotext_path {
                config.pdftotext_path = PathBuf::from(p);
            }
            if let Some(p) = &extraction.pdftoppm_path {
                config.pdftoppm_path = PathBuf::from(p);
            }
            if let Some(p) = &extraction.tesseract_path {
                config.tesseract_path = PathBuf::from(p);
            }
        }

        if let Some(server) = &file.server {
            if let Some(bind) = &server.bind {
                config.bind = bind.clone();
            }
            if let Some(mb) = server.max_upload_mb {
                config.max_upload_mb = mb;
            }
        }

        config
    }

    /// Apply `OPENAI_API_KEY` and `PROCESSO_BIND` from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Environment overrides with an injectable lookup. Empty values are ignored.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|v| !v.is_empty()) {
            self.openai.api_key = Some(key);
        }
        if let Some(bind) = lookup("PROCESSO_BIND").filter(|v| !v.is_empty()) {
            self.bind = bind;
        }
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::{ExtractionSection, OpenAiSection};

    #[test]
    fn file_values_override_defaults() {
        let file = ConfigFile {
            openai: Some(OpenAiSection {
                model: Some("gpt-4o-mini".into()),
                timeout_secs: Some(30),
                ..Default::default()
            }),
            extraction: Some(ExtractionSection {
                ocr_dpi: Some(150),
                ..Default::default()
            }),
            server: None,
        };
        let config = Config::from_file(&file);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.timeout, Duration::from_secs(30));
        assert_eq!(config.openai.temperature, 0.3);
        assert_eq!(config.ocr_dpi, 150);
        assert_eq!(config.bind, DEFAULT_BIND);
    }

    #[test]
    fn ocr_language_key_is_ignored() {
        let file: ConfigFile =
            toml::from_str("[extraction]\nocr_language = \"eng\"\nocr_dpi = 200\n").unwrap();
        let config = Config::from_file(&file);
        assert_eq!(config.ocr_dpi, 200);
        assert_eq!(OCR_LANGUAGE, "por");
    }

    #[test]
    fn env_overrides_file() {
        let file = ConfigFile {
            openai: Some(OpenAiSection {
                api_key: Some("sk-file".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = Config::from_file(&file).apply_env_with(|name| match name {
            "OPENAI_API_KEY" => Some("sk-env".into()),
            "PROCESSO_BIND" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.bind, DEFAULT_BIND);
    }

    #[test]
    fn debug_never_prints_the_key() {
        let config = Config::default()
            .apply_env_with(|name| (name == "OPENAI_API_KEY").then(|| "sk-very-secret".into()));
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-very-secret"));
    }

    #[test]
    fn upload_limit_in_bytes() {
        assert_eq!(Config::default().max_upload_bytes(), 50 * 1024 * 1024);
    }
}
