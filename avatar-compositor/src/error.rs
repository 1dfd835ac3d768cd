//! Compositor error types.

use avatar_core::{AvatarError, ObjectId};
use avatar_renderer::RenderError;
use thiserror::Error;

use crate::asset::AssetError;

/// Result type for compositor operations.
pub type CompositorResult<T> = Result<T, CompositorError>;

/// Errors reported by compositor operations.
///
/// Each of these has already been logged and, where the user should see it,
/// sent as a notification by the time a caller receives it.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// The operation needs a surface and none exists.
    #[error("Canvas not initialized")]
    NotInitialized,

    /// The uploaded file does not advertise an image type.
    #[error("Unsupported media type {mime} for {file_name}")]
    UnsupportedMedia {
        /// Name of the rejected file.
        file_name: String,
        /// Advertised MIME type.
        mime: String,
    },

    /// Image bytes could not be decoded.
    #[error("Failed to decode {name}: {source}")]
    Decode {
        /// File name or asset URL.
        name: String,
        /// Underlying decoder error.
        #[source]
        source: RenderError,
    },

    /// The asset source could not provide bytes.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The object is not on the surface.
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Drawing or encoding failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Surface model rejected the request.
    #[error(transparent)]
    Model(AvatarError),

    /// The download sink failed to save the export.
    #[error("Failed to save {file_name}: {source}")]
    Download {
        /// Target file name.
        file_name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compositor task has shut down.
    #[error("Compositor is closed")]
    Closed,
}

impl From<AvatarError> for CompositorError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::ObjectNotFound(id) => Self::ObjectNotFound(id),
            other => Self::Model(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_map_by_kind() {
        let id = ObjectId::new();
        assert!(matches!(
            CompositorError::from(AvatarError::ObjectNotFound(id)),
            CompositorError::ObjectNotFound(found) if found == id
        ));
        for err in [
            AvatarError::InvalidSize {
                width: 0,
                height: 10,
            },
            AvatarError::InvalidRaster {
                expected: 16,
                actual: 3,
            },
            AvatarError::InvalidScale(1000.0),
        ] {
            assert!(matches!(CompositorError::from(err), CompositorError::Model(_)));
        }
    }

    #[test]
    fn test_decode_error_keeps_source() {
        let err = CompositorError::Decode {
            name: "/0g_glasses.png".to_string(),
            source: RenderError::Decode("bad header".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode /0g_glasses.png: Failed to decode image: bad header"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
