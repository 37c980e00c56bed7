use crate::migrations;
use chrono::Utc;
use docsort_models::{Document, DocumentError, DocumentSummary, NewDocument};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, instrument, warn};

pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Open (creating if needed) the database behind `db_url` and migrate it.
    pub async fn connect(db_url: &str) -> Result<Self, DocumentError> {
        if let Some(db_path) = db_file_path(db_url) {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!("Failed to create DB parent directory {:?}: {}", parent, e);
                }
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!("Database connected: {}", db_url);

        Self::new(pool).await
    }

    pub async fn new(pool: SqlitePool) -> Result<Self, DocumentError> {
        migrations::run_migrations(&pool)
            .await
            .map_err(|e| DocumentError::DatabaseError {
                reason: e.to_string(),
            })?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[instrument(skip(self, doc), fields(filename = %doc.filename, category = %doc.category))]
    pub async fn insert(&self, doc: NewDocument) -> Result<Document, DocumentError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO documents (filename, extracted_text, category, extraction_method, content_sha256, size_bytes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&doc.filename)
        .bind(&doc.extracted_text)
        .bind(doc.category.as_str())
        .bind(doc.extraction_method.as_str())
        .bind(&doc.content_sha256)
        .bind(doc.size_bytes)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(Document {
            id: result.last_insert_rowid(),
            filename: doc.filename,
            extracted_text: doc.extracted_text,
            category: doc.category,
            extraction_method: doc.extraction_method,
            content_sha256: doc.content_sha256,
            size_bytes: doc.size_bytes,
            created_at,
        })
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<DocumentSummary>, DocumentError> {
        let rows = sqlx::query("SELECT id, filename, category, created_at FROM documents ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            documents.push(DocumentSummary {
                id: row.try_get("id")?,
                filename: row.try_get("filename")?,
                category: parse_column(row, "category")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(documents)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Document, DocumentError> {
        let row = sqlx::query("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DocumentError::DocumentNotFound { id })?;

        Ok(Document {
            id: row.try_get("id")?,
            filename: row.try_get("filename")?,
            extracted_text: row.try_get("extracted_text")?,
            category: parse_column(&row, "category")?,
            extraction_method: parse_column(&row, "extraction_method")?,
            content_sha256: row.try_get("content_sha256")?,
            size_bytes: row.try_get("size_bytes")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub async fn count(&self) -> Result<i64, DocumentError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}

fn parse_column<T: FromStr<Err = String>>(row: &SqliteRow, column: &str) -> Result<T, DocumentError> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|reason| DocumentError::DatabaseError { reason })
}

/// Filesystem path of a file-backed SQLite URL; `None` for in-memory databases.
fn db_file_path(db_url: &str) -> Option<PathBuf> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" || db_url.contains("mode=memory") {
        return None;
    }
    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_file_path_handles_url_forms() {
        assert_eq!(
            db_file_path("sqlite://data/documents.db"),
            Some(PathBuf::from("data/documents.db"))
        );
        assert_eq!(
            db_file_path("sqlite:documents.db?mode=rwc"),
            Some(PathBuf::from("documents.db"))
        );
        assert_eq!(db_file_path("sqlite::memory:"), None);
        assert_eq!(db_file_path("sqlite://file.db?mode=memory"), None);
        assert_eq!(db_file_path("postgres://localhost/db"), None);
    }
}
