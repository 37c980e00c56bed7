use anyhow::{bail, Context};
use async_trait::async_trait;
use docsort_extract::TextTools;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Marks a PDF whose text layer is the rest of the file.
pub const TEXT_PDF: &str = "TEXT:";
/// Marks a PDF without a text layer; it rasterizes to one page per `\x0c`
/// separated chunk of the rest of the file.
pub const SCANNED_PDF: &str = "SCAN:";
/// Images starting with this fail OCR.
pub const UNREADABLE_IMAGE: &str = "UNREADABLE";

/// `TextTools` that reads uploaded files as scripts instead of running
/// Poppler and Tesseract. Any PDF without a known marker fails to parse.
#[derive(Clone)]
pub struct ScriptedTools {
    ocr_available: bool,
    ocr_delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedTools {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTools {
    pub fn new() -> Self {
        Self {
            ocr_available: true,
            ocr_delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Rasterizing always fails, as on a host without pdftoppm.
    pub fn without_ocr() -> Self {
        Self {
            ocr_available: false,
            ..Self::new()
        }
    }

    /// OCR waits before reading its input, like a slow Tesseract run.
    pub fn with_ocr_delay(delay: Duration) -> Self {
        Self {
            ocr_delay: Some(delay),
            ..Self::new()
        }
    }

    /// Tool invocations so far, e.g. `pdf_text:bill.pdf` or `ocr:page-1.png`.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, tool: &str, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().await.push(format!("{tool}:{name}"));
    }
}

async fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait]
impl TextTools for ScriptedTools {
    async fn pdf_text(&self, pdf: &Path) -> anyhow::Result<String> {
        self.record("pdf_text", pdf).await;
        let contents = read_text(pdf).await?;
        if let Some(text) = contents.strip_prefix(TEXT_PDF) {
            Ok(text.to_string())
        } else if contents.starts_with(SCANNED_PDF) {
            Ok("\x0c".to_string())
        } else {
            bail!("Syntax Error: Couldn't read xref table")
        }
    }

    async fn rasterize_pdf(&self, pdf: &Path, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        self.record("rasterize", pdf).await;
        if !self.ocr_available {
            bail!("pdftoppm: not found");
        }
        let contents = read_text(pdf).await?;
        let body = contents.strip_prefix(SCANNED_PDF).unwrap_or(&contents);
        let mut pages = Vec::new();
        for (index, page) in body.split('\x0c').enumerate() {
            let path = out_dir.join(format!("page-{}.png", index + 1));
            tokio::fs::write(&path, page).await?;
            pages.push(path);
        }
        Ok(pages)
    }

    async fn ocr_image(&self, image: &Path) -> anyhow::Result<String> {
        self.record("ocr", image).await;
        if let Some(delay) = self.ocr_delay {
            tokio::time::sleep(delay).await;
        }
        let contents = read_text(image).await?;
        if contents.starts_with(UNREADABLE_IMAGE) {
            bail!("Error in pixReadStream: Unknown format: no pix returned");
        }
        Ok(format!("{contents}\n"))
    }

    async fn probe(&self) -> anyhow::Result<()> {
        if !self.ocr_available {
            bail!("pdftoppm: not found");
        }
        Ok(())
    }
}
