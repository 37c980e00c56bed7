use crate::tools::TextTools;
use docsort_models::{DocumentError, ExtractionMethod};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

pub const PDF_ERROR_PREFIX: &str = "❌ Error extracting PDF: ";
pub const OCR_UNAVAILABLE_NOTICE: &str = "\n⚠️ OCR not available in hosted version.";

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
}

impl SourceKind {
    /// Anything that is not a `.pdf` is handed to OCR as an image.
    pub fn from_filename(filename: &str) -> Self {
        if filename.to_lowercase().ends_with(".pdf") {
            SourceKind::Pdf
        } else {
            SourceKind::Image
        }
    }
}

pub struct Extractor {
    tools: Arc<dyn TextTools>,
    permits: Arc<Semaphore>,
}

impl Extractor {
    pub fn new(tools: Arc<dyn TextTools>, max_concurrent_jobs: usize) -> Self {
        Self {
            tools,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    #[instrument(skip(self, path))]
    pub async fn extract(&self, filename: &str, path: &Path) -> Result<ExtractedText, DocumentError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| DocumentError::InternalError {
                reason: e.to_string(),
            })?;

        match SourceKind::from_filename(filename) {
            SourceKind::Pdf => Ok(self.extract_pdf(path).await),
            SourceKind::Image => self.extract_image(path).await,
        }
    }

    /// Never fails: unreadable PDFs and unavailable OCR are reported inside
    /// the returned text so the upload is still recorded.
    pub async fn extract_pdf(&self, path: &Path) -> ExtractedText {
        let raw = match self.tools.pdf_text(path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read PDF {:?}: {:#}", path, e);
                return ExtractedText {
                    text: format!("{PDF_ERROR_PREFIX}{e:#}"),
                    method: ExtractionMethod::Failed,
                };
            }
        };

        let mut text = String::new();
        for page in raw.split('\x0c').filter(|page| !page.is_empty()) {
            text.push_str(page);
            text.push('\n');
        }

        if !text.trim().is_empty() {
            return ExtractedText {
                text: text.trim().to_string(),
                method: ExtractionMethod::Embedded,
            };
        }

        info!("No embedded text in {:?}, falling back to OCR", path);
        let method = match self.ocr_pdf(path, &mut text).await {
            Ok(pages) => {
                info!("OCR completed for {:?} ({} pages)", path, pages);
                ExtractionMethod::Ocr
            }
            Err(e) => {
                warn!("OCR unavailable for {:?}: {:#}", path, e);
                text.push_str(OCR_UNAVAILABLE_NOTICE);
                ExtractionMethod::OcrUnavailable
            }
        };

        ExtractedText {
            text: text.trim().to_string(),
            method,
        }
    }

    pub async fn extract_image(&self, path: &Path) -> Result<ExtractedText, DocumentError> {
        let text = self
            .tools
            .ocr_image(path)
            .await
            .map_err(|e| DocumentError::ExtractionFailed {
                reason: format!("{e:#}"),
            })?;
        Ok(ExtractedText {
            text: text.trim().to_string(),
            method: ExtractionMethod::Ocr,
        })
    }

    /// Appends page text as it is recognised, so a mid-document failure keeps
    /// the pages read so far.
    async fn ocr_pdf(&self, path: &Path, text: &mut String) -> anyhow::Result<usize> {
        let scratch = tempfile::tempdir()?;
        let pages = self.tools.rasterize_pdf(path, scratch.path()).await?;
        for page in &pages {
            text.push_str(&self.tools.ocr_image(page).await?);
        }
        Ok(pages.len())
    }
}
