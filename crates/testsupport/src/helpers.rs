use docsort_store::DocumentStore;
use sqlx::sqlite::SqlitePoolOptions;

pub const BOUNDARY: &str = "docsort-test-boundary";

/// Store backed by a private in-memory database. The pool is pinned to one
/// connection because every SQLite `:memory:` connection is its own database.
pub async fn memory_store() -> DocumentStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    DocumentStore::new(pool).await.expect("migrations")
}

/// Build a `multipart/form-data` body with a single file part.
/// Returns the content type header value and the body bytes.
pub fn multipart_body(field: &str, filename: &str, contents: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// A multipart body holding only a plain text field, no file.
pub fn multipart_without_file() -> (String, Vec<u8>) {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    (
        format!("multipart/form-data; boundary={BOUNDARY}"),
        body.into_bytes(),
    )
}
