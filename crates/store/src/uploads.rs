use docsort_models::DocumentError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// A file written into the upload directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: i64,
    pub sha256: String,
}

/// An upload held in a private file inside the upload directory until
/// `persist` moves it to its base name. Dropping it removes the file.
#[derive(Debug)]
pub struct StagedFile {
    pub filename: String,
    pub size_bytes: i64,
    pub sha256: String,
    target: PathBuf,
    temp: NamedTempFile,
}

impl StagedFile {
    /// Private path holding exactly this upload's bytes.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Replace `<root>/<filename>` with the staged bytes.
    pub fn persist(self) -> Result<StoredFile, DocumentError> {
        let StagedFile {
            filename,
            size_bytes,
            sha256,
            target,
            temp,
        } = self;
        temp.persist(&target).map_err(|e| DocumentError::from(e.error))?;
        debug!("Saved upload to {:?}", target);

        Ok(StoredFile {
            filename,
            path: target,
            size_bytes,
            sha256,
        })
    }
}

/// Directory that receives raw uploads. Files are keyed by their base name,
/// so a re-upload with the same name replaces the earlier file once persisted.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reduce a client-supplied name to a bare file name. Browsers on some
    /// platforms send full paths with either separator.
    pub fn sanitize_filename(filename: &str) -> Result<String, DocumentError> {
        let base = filename
            .rsplit(&['/', '\\'][..])
            .next()
            .unwrap_or_default()
            .trim()
            .replace('\0', "");

        if base.is_empty() || base == "." || base == ".." {
            return Err(DocumentError::InvalidFilename {
                filename: filename.to_string(),
            });
        }
        Ok(base)
    }

    /// Write the upload under a unique name. Concurrent uploads sharing a
    /// base name never read each other's bytes.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn stage(&self, filename: &str, bytes: &[u8]) -> Result<StagedFile, DocumentError> {
        let filename = Self::sanitize_filename(filename)?;
        let suffix = Path::new(&filename)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let temp = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(&suffix)
            .tempfile_in(&self.root)?;
        tokio::fs::write(temp.path(), bytes).await?;
        debug!("Staged upload {} at {:?}", filename, temp.path());

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Ok(StagedFile {
            target: self.root.join(&filename),
            filename,
            size_bytes: bytes.len() as i64,
            sha256: format!("{:x}", hasher.finalize()),
            temp,
        })
    }
}
