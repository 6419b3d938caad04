use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub openai: Option<OpenAiSection>,
    pub extraction: Option<ExtractionSection>,
    pub server: Option<ServerSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSection {
    pub ocr_dpi: Option<u32>,
    pub pdftotext_path: Option<String>,
    pub pdftoppm_path: Option<String>,
    pub tesseract_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub max_upload_mb: Option<u32>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Platform config directory path: `<config_dir>/processo/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("processo").join("config.toml"))
}

/// Per-project override file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".processo.toml";

/// Load config by cascading CWD `.processo.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(LOCAL_CONFIG_FILE));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed (a parse failure is logged).
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match read_config(path) {
        Ok(config) => Some(config),
        Err(ConfigError::Read { .. }) => None,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring config file");
            None
        }
    }
}

/// Strict variant of [`load_from_path`] for explicitly requested files.
pub fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn pick<S, T>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        openai: Some(OpenAiSection {
            api_key: pick(&overlay.openai, &base.openai, |o| o.api_key.clone()),
            base_url: pick(&overlay.openai, &base.openai, |o| o.base_url.clone()),
            model: pick(&overlay.openai, &base.openai, |o| o.model.clone()),
            temperature: pick(&overlay.openai, &base.openai, |o| o.temperature),
            max_tokens: pick(&overlay.openai, &base.openai, |o| o.max_tokens),
            timeout_secs: pick(&overlay.openai, &base.openai, |o| o.timeout_secs),
        }),
        extraction: Some(ExtractionSection {
            ocr_dpi: pick(&overlay.extraction, &base.extraction, |e| e.ocr_dpi),
            pdftotext_path: pick(&overlay.extraction, &base.extraction, |e| {
                e.pdftotext_path.clone()
            }),
            pdftoppm_path: pick(&overlay.extraction, &base.extraction, |e| {
                e.pdftoppm_path.clone()
            }),
            tesseract_path: pick(&overlay.extraction, &base.extraction, |e| {
                e.tesseract_path.clone()
            }),
        }),
        server: Some(ServerSection {
            bind: pick(&overlay.server, &base.server, |s| s.bind.clone()),
            max_upload_mb: pick(&overlay.server, &base.server, |s| s.max_upload_mb),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_parses() {
        let toml_str = "[extraction]\nocr_dpi = 200\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.extraction.unwrap().ocr_dpi, Some(200));
        assert!(parsed.openai.is_none());
    }

    #[test]
    fn merge_overlay_wins_field_by_field() {
        let base = ConfigFile {
            openai: Some(OpenAiSection {
                api_key: Some("sk-base".into()),
                model: Some("gpt-4o".into()),
                ..Default::default()
            }),
            server: Some(ServerSection {
                bind: Some("0.0.0.0:8000".into()),
                max_upload_mb: Some(50),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            openai: Some(OpenAiSection {
                model: Some("gpt-4o-mini".into()),
                ..Default::default()
            }),
            server: Some(ServerSection {
                max_upload_mb: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let openai = merged.openai.unwrap();
        assert_eq!(openai.api_key.as_deref(), Some("sk-base"));
        assert_eq!(openai.model.as_deref(), Some("gpt-4o-mini"));
        let server = merged.server.unwrap();
        assert_eq!(server.bind.as_deref(), Some("0.0.0.0:8000"));
        assert_eq!(server.max_upload_mb, Some(10));
    }

    #[test]
    fn unreadable_file_reports_its_path() {
        let err = read_config(Path::new("/nonexistent/processo/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/processo/config.toml"));
    }

    #[test]
    fn missing_file_is_none_and_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[server\nbind = ").unwrap();
        assert!(load_from_path(&bad).is_none());
        assert!(matches!(read_config(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn round_trip_toml() {
        let config = ConfigFile {
            extraction: Some(ExtractionSection {
                tesseract_path: Some("/opt/tesseract/bin/tesseract".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.extraction.unwrap().tesseract_path.as_deref(),
            Some("/opt/tesseract/bin/tesseract")
        );
    }
}
