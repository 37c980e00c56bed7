use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorShape {
    pub error_message: String,
    pub error_type: String,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("Invalid filename: {filename:?}")]
    InvalidFilename { filename: String },

    #[error("Document not found: {id}")]
    DocumentNotFound { id: i64 },

    #[error("Text extraction failed: {reason}")]
    ExtractionFailed { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Upload too large: {reason}")]
    PayloadTooLarge { reason: String },

    #[error("Storage error: {reason}")]
    StorageError { reason: String },

    #[error("Internal server error: {reason}")]
    InternalError { reason: String },

    #[error("Database error: {reason}")]
    DatabaseError { reason: String },

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },
}

impl DocumentError {
    pub fn to_error_shape(&self) -> ErrorShape {
        ErrorShape {
            error_message: self.to_string(),
            error_type: self.error_type().to_string(),
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            DocumentError::NoFileUploaded => "InvalidRequest",
            DocumentError::InvalidFilename { .. } => "InvalidRequest",
            DocumentError::DocumentNotFound { .. } => "NotFound",
            DocumentError::ExtractionFailed { .. } => "ExtractionFailed",
            DocumentError::InvalidRequest { .. } => "InvalidRequest",
            DocumentError::PayloadTooLarge { .. } => "PayloadTooLarge",
            DocumentError::StorageError { .. } => "InternalError",
            DocumentError::InternalError { .. } => "InternalError",
            DocumentError::DatabaseError { .. } => "InternalError",
            DocumentError::SqlxError(_) => "InternalError",
            DocumentError::ConfigError { .. } => "ConfigurationError",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            DocumentError::NoFileUploaded => 400,
            DocumentError::InvalidFilename { .. } => 400,
            DocumentError::DocumentNotFound { .. } => 404,
            DocumentError::ExtractionFailed { .. } => 422,
            DocumentError::InvalidRequest { .. } => 400,
            DocumentError::PayloadTooLarge { .. } => 413,
            DocumentError::StorageError { .. } => 500,
            DocumentError::InternalError { .. } => 500,
            DocumentError::DatabaseError { .. } => 500,
            DocumentError::SqlxError(_) => 500,
            DocumentError::ConfigError { .. } => 500,
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(e: std::io::Error) -> Self {
        DocumentError::StorageError {
            reason: e.to_string(),
        }
    }
}
