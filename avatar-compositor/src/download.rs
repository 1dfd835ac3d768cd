//! Destinations for exported images.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

/// A completed save-as download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Name the file was saved under.
    pub file_name: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

/// Where exported images go, such as a browser download or a directory.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Save `bytes` under `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the bytes cannot be stored.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirDownloadSink {
    dir: PathBuf,
}

impl DirDownloadSink {
    /// Save files into `dir`, creating it on first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirDownloadSink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        // Only the final component is honored, as a browser does.
        let name = Path::new(file_name).file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid file name: {file_name:?}"),
            )
        })?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// Records downloads in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDownloadSink {
    downloads: Arc<Mutex<Vec<Download>>>,
}

impl MemoryDownloadSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every download so far, oldest first.
    #[must_use]
    pub fn downloads(&self) -> Vec<Download> {
        self.downloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent download.
    #[must_use]
    pub fn last(&self) -> Option<Download> {
        self.downloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl DownloadSink for MemoryDownloadSink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        self.downloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Download {
                file_name: file_name.to_string(),
                bytes: bytes.to_vec(),
            });
        Ok(())
    }
}
