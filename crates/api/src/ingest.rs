use crate::AppState;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use docsort_extract::{categorize, preprocess_text};
use docsort_metrics::TracingService;
use docsort_models::{Document, DocumentError, NewDocument};
use std::time::Instant;
use tracing::instrument;

/// Multipart form field carrying the document.
pub const FILE_FIELD: &str = "file";

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Oversized bodies keep their 413; every other multipart failure is a bad request.
fn multipart_error(e: MultipartError) -> DocumentError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DocumentError::PayloadTooLarge {
            reason: e.body_text(),
        }
    } else {
        DocumentError::InvalidRequest {
            reason: e.body_text(),
        }
    }
}

/// Pull the `file` field out of a multipart body, ignoring any other fields.
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, DocumentError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedFile { filename, bytes });
    }
    Err(DocumentError::NoFileUploaded)
}

/// Stage, extract, categorize and record one upload. Extraction reads the
/// staged copy, so the stored text always comes from this request's bytes.
#[instrument(skip(state, bytes), fields(size = bytes.len()))]
pub async fn ingest(state: &AppState, filename: &str, bytes: &[u8]) -> Result<Document, DocumentError> {
    let staged = state.uploads.stage(filename, bytes).await?;

    let started = Instant::now();
    let extracted = match state.extractor.extract(&staged.filename, staged.path()).await {
        Ok(extracted) => extracted,
        Err(e) => {
            state.metrics.record_extraction_error(&staged.filename).await;
            TracingService::log_extraction_failed(&staged.filename, &e);
            return Err(e);
        }
    };
    let duration_ms = started.elapsed().as_millis() as u64;
    state.metrics.record_extraction_duration(duration_ms as f64).await;

    let stored = staged.persist()?;
    let clean_text = preprocess_text(&extracted.text);
    let category = categorize(&clean_text);

    let document = state
        .store
        .insert(NewDocument {
            filename: stored.filename,
            extracted_text: extracted.text,
            category,
            extraction_method: extracted.method,
            content_sha256: stored.sha256,
            size_bytes: stored.size_bytes,
        })
        .await?;

    state.metrics.record_document(category, extracted.method).await;
    TracingService::log_document_processed(&document, duration_ms);
    Ok(document)
}
