//! Transient user-facing notifications.

use serde::{Deserialize, Serialize};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Something the user asked for happened.
    Success,
    /// Something the user asked for did not happen.
    Error,
}

/// A toast-style message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text to show.
    pub message: String,
}

impl Notification {
    /// A success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// An error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// An overlay was placed on the surface.
    #[must_use]
    pub fn asset_added(display_name: &str) -> Self {
        Self::success(format!("{display_name} added"))
    }

    /// An export was handed to the download sink.
    #[must_use]
    pub fn download_succeeded(file_name: &str) -> Self {
        Self::success(format!("Downloaded {file_name}"))
    }

    /// An operation needed a surface that does not exist.
    #[must_use]
    pub fn not_initialized() -> Self {
        Self::error("Canvas not initialized")
    }

    /// An image could not be decoded.
    #[must_use]
    pub fn decode_failed(name: &str) -> Self {
        Self::error(format!("Failed to load image {name}"))
    }

    /// Whether this is an error notification.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
