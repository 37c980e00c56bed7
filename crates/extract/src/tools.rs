use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use docsort_models::OcrConfig;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// External text tooling. `CommandTools` shells out to Poppler and Tesseract;
/// tests substitute an in-memory implementation.
#[async_trait]
pub trait TextTools: Send + Sync + 'static {
    /// Embedded text of every page, pages separated by form feed.
    async fn pdf_text(&self, pdf: &Path) -> anyhow::Result<String>;
    /// Render each page to a PNG inside `out_dir`, returned in page order.
    async fn rasterize_pdf(&self, pdf: &Path, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>>;
    async fn ocr_image(&self, image: &Path) -> anyhow::Result<String>;
    /// Check that every backing tool can be started.
    async fn probe(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct CommandTools {
    config: OcrConfig,
}

impl CommandTools {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    async fn run(&self, program: &str, args: &[&OsStr]) -> anyhow::Result<Vec<u8>> {
        debug!("Running {} {:?}", program, args);
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout(), cmd.output())
            .await
            .map_err(|_| anyhow!("{program} timed out after {}ms", self.config.timeout_ms))?
            .with_context(|| format!("failed to start {program}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{program} exited with {}: {}", output.status, stderr.trim());
        }
        Ok(output.stdout)
    }

    async fn probe_one(&self, program: &str, flag: &str) -> anyhow::Result<()> {
        // Only spawnability matters; some builds exit non-zero on -v.
        Command::new(program)
            .arg(flag)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .with_context(|| format!("{program} is not available"))?;
        Ok(())
    }
}

#[async_trait]
impl TextTools for CommandTools {
    #[instrument(skip(self))]
    async fn pdf_text(&self, pdf: &Path) -> anyhow::Result<String> {
        let stdout = self
            .run(
                &self.config.pdftotext_bin,
                &[OsStr::new("-enc"), OsStr::new("UTF-8"), pdf.as_os_str(), OsStr::new("-")],
            )
            .await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    #[instrument(skip(self))]
    async fn rasterize_pdf(&self, pdf: &Path, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let dpi = self.config.dpi.to_string();
        let prefix = out_dir.join("page");
        self.run(
            &self.config.pdftoppm_bin,
            &[
                OsStr::new("-r"),
                OsStr::new(&dpi),
                OsStr::new("-png"),
                pdf.as_os_str(),
                prefix.as_os_str(),
            ],
        )
        .await?;
        collect_pages(out_dir).await
    }

    #[instrument(skip(self))]
    async fn ocr_image(&self, image: &Path) -> anyhow::Result<String> {
        let stdout = self
            .run(
                &self.config.tesseract_bin,
                &[
                    image.as_os_str(),
                    OsStr::new("stdout"),
                    OsStr::new("-l"),
                    OsStr::new(&self.config.language),
                ],
            )
            .await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    async fn probe(&self) -> anyhow::Result<()> {
        self.probe_one(&self.config.tesseract_bin, "--version").await?;
        self.probe_one(&self.config.pdftotext_bin, "-v").await?;
        self.probe_one(&self.config.pdftoppm_bin, "-v").await?;
        Ok(())
    }
}

/// pdftoppm names pages `page-1.png` or zero-padded `page-01.png` depending on
/// the page count; order by the parsed number.
async fn collect_pages(out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(out_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(number) = page_number(&path) {
            pages.push((number, path));
        }
    }
    if pages.is_empty() {
        bail!("no pages were rendered");
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OcrConfig {
        docsort_models::Config::default().ocr
    }

    #[test]
    fn page_numbers_parse_padded_and_plain_names() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-010.png")), Some(10));
        assert_eq!(page_number(Path::new("/tmp/x/page-1.ppm")), None);
        assert_eq!(page_number(Path::new("/tmp/x/cover.png")), None);
    }

    #[tokio::test]
    async fn collect_pages_sorts_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        let pages = collect_pages(dir.path()).await.unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["page-1.png", "page-2.png", "page-10.png"]);
    }

    #[tokio::test]
    async fn collect_pages_fails_when_nothing_rendered() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_pages(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let mut config = config();
        config.tesseract_bin = "/nonexistent/docsort-tesseract".to_string();
        let tools = CommandTools::new(config);
        let err = tools.ocr_image(Path::new("scan.png")).await.unwrap_err();
        assert!(err.to_string().contains("failed to start"));
        assert!(tools.probe().await.is_err());
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_tool_is_stopped_at_the_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.tesseract_bin = script(dir.path(), "tesseract", "sleep 5");
        config.timeout_ms = 200;
        let tools = CommandTools::new(config);

        let started = std::time::Instant::now();
        let err = tools.ocr_image(Path::new("scan.png")).await.unwrap_err();
        assert!(err.to_string().contains("timed out after 200ms"), "{err:#}");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_carries_trimmed_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.pdftotext_bin = script(dir.path(), "pdftotext", "echo '  bad xref  ' >&2\nexit 3");
        let tools = CommandTools::new(config);

        let err = tools.pdf_text(Path::new("broken.pdf")).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("exit status: 3"), "{message}");
        assert!(message.ends_with(": bad xref"), "{message}");
    }
}
