//! Sources of overlay asset bytes.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The URL is not a same-origin relative path.
    #[error("Invalid asset URL: {0}")]
    InvalidUrl(String),

    /// No asset exists at the URL.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Reading the asset failed.
    #[error("Failed to read asset {url}: {source}")]
    Io {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Read-only provider of static asset bytes.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the raw bytes behind an asset URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the asset cannot be read.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError>;
}

/// Resolve a same-origin URL such as `/0g_glasses.png` to a relative path.
///
/// Query strings and fragments are ignored. Absolute URLs, empty paths and any
/// `..` segment are rejected.
///
/// # Errors
///
/// Returns [`AssetError::InvalidUrl`] for URLs that escape the asset root.
pub fn relative_asset_path(url: &str) -> Result<PathBuf, AssetError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    if path.contains("://") || path.starts_with("//") {
        return Err(AssetError::InvalidUrl(url.to_string()));
    }

    let relative = Path::new(path.trim_start_matches('/'));
    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(AssetError::InvalidUrl(url.to_string()));
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(AssetError::InvalidUrl(url.to_string()));
    }
    Ok(clean)
}

/// Serves assets from a directory, the way a static file server serves `public/`.
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    /// Serve assets from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory assets are served from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetSource for DirAssetSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.root.join(relative_asset_path(url)?);
        tracing::debug!("Reading asset {url} from {}", path.display());

        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(url.to_string())
            } else {
                AssetError::Io {
                    url: url.to_string(),
                    source,
                }
            }
        })
    }
}

/// In-memory asset source, keyed by normalized URL.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    assets: Arc<RwLock<HashMap<PathBuf, Arc<[u8]>>>>,
}

impl MemoryAssetSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under a URL.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::InvalidUrl`] if the URL cannot be normalized.
    pub fn insert(&self, url: &str, bytes: impl Into<Vec<u8>>) -> Result<(), AssetError> {
        let key = relative_asset_path(url)?;
        let mut assets = self
            .assets
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let bytes: Vec<u8> = bytes.into();
        assets.insert(key, bytes.into());
        Ok(())
    }

    /// Builder-style [`MemoryAssetSource::insert`].
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::InvalidUrl`] if the URL cannot be normalized.
    pub fn with_asset(self, url: &str, bytes: impl Into<Vec<u8>>) -> Result<Self, AssetError> {
        self.insert(url, bytes)?;
        Ok(self)
    }
}

#[async_trait]
impl AssetSource for MemoryAssetSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let key = relative_asset_path(url)?;
        let assets = self
            .assets
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        assets
            .get(&key)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound(url.to_string()))
    }
}
