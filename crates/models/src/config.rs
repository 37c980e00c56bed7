use crate::DocumentError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, nested with `__` (e.g. `DOCSORT_OCR__DPI=300`).
pub const ENV_PREFIX: &str = "DOCSORT_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub ocr: OcrConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_request_body_size_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub upload_dir: String,
    pub db_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OcrConfig {
    pub tesseract_bin: String,
    pub pdftotext_bin: String,
    pub pdftoppm_bin: String,
    pub language: String,
    pub dpi: u32,
    pub timeout_ms: u64,
    pub max_concurrent_jobs: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 5000,
                max_request_body_size_mb: 16,
            },
            data: DataConfig {
                upload_dir: "uploads".to_string(),
                db_url: "sqlite://documents.db".to_string(),
            },
            ocr: OcrConfig {
                tesseract_bin: "tesseract".to_string(),
                pdftotext_bin: "pdftotext".to_string(),
                pdftoppm_bin: "pdftoppm".to_string(),
                language: "eng".to_string(),
                dpi: 200,
                timeout_ms: 120_000,
                max_concurrent_jobs: 2,
            },
            logging: LoggingConfig {
                format: LogFormat::Text,
                filter: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Layered sources: defaults, then the TOML file (if present), then
    /// `DOCSORT_*` variables, then a bare `PORT`.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
            .merge(Env::raw().only(&["port"]).map(|_| "server.port".into()))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, DocumentError> {
        Self::figment(path)
            .extract()
            .map_err(|e| DocumentError::ConfigError {
                reason: e.to_string(),
            })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    pub fn body_limit_bytes(&self) -> usize {
        (self.server.max_request_body_size_mb * 1024 * 1024) as usize
    }
}
