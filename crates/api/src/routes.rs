use crate::{handlers::*, AppState};
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Browser flow
        .route("/", get(index))
        .route("/static/*path", get(static_asset))
        .route("/upload", post(upload_page))
        .route("/dashboard", get(dashboard))
        .route("/view/:id", get(view_document))
        // JSON API
        .route("/api/documents", post(create_document).get(list_documents))
        .route("/api/documents/:id", get(get_document))
        // Health and metrics
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics))
}

pub fn build_router(state: AppState) -> Router {
    create_router().with_state(state)
}
