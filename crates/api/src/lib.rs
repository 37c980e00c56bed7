pub mod handlers;
pub mod ingest;
pub mod pages;
pub mod routes;
pub mod state;

pub use handlers::*;
pub use ingest::*;
pub use routes::*;
pub use state::*;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use rust_embed::RustEmbed;
use std::future::Future;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(RustEmbed)]
#[folder = "web/"]
struct Assets;

pub(crate) fn embedded_file_response(path: &str) -> Response {
    let key = if path.is_empty() { "index.html" } else { path };

    match Assets::get(key) {
        Some(content) => {
            let body = axum::body::Body::from(content.data.into_owned());
            let mime = mime_guess::from_path(key).first_or_octet_stream();
            let mut headers = HeaderMap::new();
            headers.insert(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_str(mime.as_ref())
                    .unwrap_or(HeaderValue::from_static("text/html")),
            );
            (StatusCode::OK, headers, body).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Router with the tracing, CORS and body-limit layers applied.
pub fn build_app(state: AppState) -> Router {
    let body_size_limit = state.config.body_limit_bytes();

    build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(body_size_limit)),
    )
}

pub async fn start_server<F>(
    state: AppState,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind = state.config.bind_address();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("DocSort listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
