//! Error types for surface operations.

use thiserror::Error;

use crate::ObjectId;

/// Result type for surface operations.
pub type AvatarResult<T> = Result<T, AvatarError>;

/// Errors that can occur in surface operations.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// Object not found on the surface.
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Surface dimensions must be non-zero.
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Raster buffer length does not match its dimensions.
    #[error("Invalid raster: expected {expected} bytes, got {actual}")]
    InvalidRaster {
        /// Expected byte length (`width * height * 4`).
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },

    /// Scale factor must be finite and positive.
    #[error("Invalid scale factor: {0}")]
    InvalidScale(f32),
}
