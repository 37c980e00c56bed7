use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Bill")]
    Bill,
    #[serde(rename = "ID Document")]
    IdDocument,
    #[serde(rename = "Notes")]
    Notes,
    #[serde(rename = "Certificate")]
    Certificate,
    #[serde(rename = "Uncategorized")]
    Uncategorized,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Bill,
        Category::IdDocument,
        Category::Notes,
        Category::Certificate,
        Category::Uncategorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bill => "Bill",
            Category::IdDocument => "ID Document",
            Category::Notes => "Notes",
            Category::Certificate => "Certificate",
            Category::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Invalid category: {s}"))
    }
}

/// How the stored text was obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Text layer embedded in the PDF.
    Embedded,
    /// Rasterized pages or an image run through OCR.
    Ocr,
    /// The PDF had no text layer and OCR could not run; text carries a warning.
    OcrUnavailable,
    /// The PDF could not be read; text carries the error message.
    Failed,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Embedded => "embedded",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::OcrUnavailable => "ocr_unavailable",
            ExtractionMethod::Failed => "failed",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "embedded" => Ok(ExtractionMethod::Embedded),
            "ocr" => Ok(ExtractionMethod::Ocr),
            "ocr_unavailable" => Ok(ExtractionMethod::OcrUnavailable),
            "failed" => Ok(ExtractionMethod::Failed),
            _ => Err(format!("Invalid extraction method: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub extracted_text: String,
    pub category: Category,
    pub extraction_method: ExtractionMethod,
    pub content_sha256: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DocumentSummary {
    pub id: i64,
    pub filename: String,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            category: doc.category,
            created_at: doc.created_at,
        }
    }
}

/// Row to be inserted; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub extracted_text: String,
    pub category: Category,
    pub extraction_method: ExtractionMethod,
    pub content_sha256: String,
    pub size_bytes: i64,
}

// Request/Response types for API

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadResponse {
    pub document: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListDocumentsResponse {
    pub documents: Vec<DocumentSummary>,
}
