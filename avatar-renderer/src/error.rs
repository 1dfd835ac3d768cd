//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while decoding, drawing or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Resource could not be interpreted (bad data URI, bad buffer).
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The drawing target rejected a frame or was already released.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Encoding the exported image failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Surface model error.
    #[error(transparent)]
    Model(#[from] avatar_core::AvatarError),
}
