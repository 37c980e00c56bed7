use crate::ingest::{ingest, read_upload};
use crate::{embedded_file_response, pages, AppState};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use docsort_models::{
    Document, DocumentError, ErrorShape, ListDocumentsResponse, UploadResponse,
};
use tracing::{error, info, instrument, warn};

fn status_of(e: &DocumentError) -> StatusCode {
    StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn json_error(e: DocumentError) -> (StatusCode, Json<ErrorShape>) {
    (status_of(&e), Json(e.to_error_shape()))
}

// ---------------- Browser pages ----------------

pub async fn index() -> Response {
    embedded_file_response("index.html")
}

pub async fn static_asset(Path(path): Path<String>) -> Response {
    embedded_file_response(&path)
}

#[instrument(skip(state, multipart))]
pub async fn upload_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(DocumentError::NoFileUploaded) => {
            return (StatusCode::BAD_REQUEST, Html(pages::NO_FILE_UPLOADED)).into_response();
        }
        Err(e) => {
            warn!("Rejected upload form: {}", e);
            return (status_of(&e), Html(pages::processing_error(&e))).into_response();
        }
    };

    info!("Processing upload: {}", upload.filename);
    match ingest(&state, &upload.filename, &upload.bytes).await {
        Ok(document) => Html(pages::upload_result(&document)).into_response(),
        Err(e) => {
            error!("Failed to process {}: {}", upload.filename, e);
            (status_of(&e), Html(pages::processing_error(&e))).into_response()
        }
    }
}

#[instrument(skip(state))]
pub async fn dashboard(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(docs) => Html(pages::dashboard(&docs)).into_response(),
        Err(e) => {
            error!("Failed to list documents: {}", e);
            (status_of(&e), Html(pages::processing_error(&e))).into_response()
        }
    }
}

/// Ids that are not integers are simply unknown documents.
#[instrument(skip(state))]
pub async fn view_document(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return (StatusCode::NOT_FOUND, Html(pages::DOCUMENT_NOT_FOUND)).into_response();
    };
    match state.store.get(id).await {
        Ok(document) => Html(pages::document_view(&document)).into_response(),
        Err(DocumentError::DocumentNotFound { .. }) => {
            (StatusCode::NOT_FOUND, Html(pages::DOCUMENT_NOT_FOUND)).into_response()
        }
        Err(e) => {
            error!("Failed to load document {}: {}", id, e);
            (status_of(&e), Html(pages::processing_error(&e))).into_response()
        }
    }
}

// ---------------- JSON API ----------------

#[instrument(skip(state, multipart))]
pub async fn create_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), (StatusCode, Json<ErrorShape>)> {
    let upload = read_upload(multipart).await.map_err(json_error)?;
    info!("Creating document: {}", upload.filename);

    match ingest(&state, &upload.filename, &upload.bytes).await {
        Ok(document) => Ok((StatusCode::CREATED, Json(UploadResponse { document }))),
        Err(e) => {
            error!("Failed to create document {}: {}", upload.filename, e);
            Err(json_error(e))
        }
    }
}

#[instrument(skip(state))]
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<ListDocumentsResponse>, (StatusCode, Json<ErrorShape>)> {
    match state.store.list().await {
        Ok(documents) => Ok(Json(ListDocumentsResponse { documents })),
        Err(e) => {
            error!("Failed to list documents: {}", e);
            Err(json_error(e))
        }
    }
}

#[instrument(skip(state))]
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Document>, (StatusCode, Json<ErrorShape>)> {
    match state.store.get(id).await {
        Ok(document) => Ok(Json(document)),
        Err(e) => {
            error!("Failed to get document {}: {}", id, e);
            Err(json_error(e))
        }
    }
}

// ---------------- Health and metrics ----------------

pub async fn health_check(State(_state): State<AppState>) -> Result<&'static str, StatusCode> {
    Ok("OK")
}

pub async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    match state.metrics.get_prometheus_metrics().await {
        Ok(metrics) => Ok(metrics),
        Err(e) => {
            error!("Failed to get metrics: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
