use docsort_models::{Document, DocumentError, LogFormat, LoggingConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub struct TracingService;

impl TracingService {
    /// Install the global subscriber. `RUST_LOG` takes precedence over the
    /// configured filter.
    pub fn init(config: &LoggingConfig) -> Result<(), DocumentError> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.filter))
            .map_err(|e| DocumentError::ConfigError {
                reason: format!("invalid log filter {:?}: {}", config.filter, e),
            })?;

        let result = match config.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
        };

        result.map_err(|e| DocumentError::ConfigError {
            reason: e.to_string(),
        })
    }

    pub fn log_document_processed(document: &Document, duration_ms: u64) {
        info!(
            document_id = document.id,
            filename = %document.filename,
            category = %document.category,
            extraction_method = %document.extraction_method,
            size_bytes = document.size_bytes,
            text_chars = document.extracted_text.chars().count(),
            duration_ms = duration_ms,
            "Document processed"
        );
    }

    pub fn log_extraction_failed(filename: &str, error: &DocumentError) {
        error!(
            filename = %filename,
            error_type = %error.error_type(),
            error_message = %error,
            "Text extraction failed"
        );
    }

    pub fn log_tools_probe(result: &Result<(), String>) {
        match result {
            Ok(()) => info!("OCR and PDF tools are available"),
            Err(reason) => warn!(
                reason = %reason,
                "OCR or PDF tools unavailable; scanned documents will be stored without text"
            ),
        }
    }
}
