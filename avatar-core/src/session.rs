//! Editing session state.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No base image has been loaded yet; the upload prompt is shown.
    #[default]
    Empty,
    /// A base image is on the surface.
    ImagePresent,
}

/// In-memory state of one editing visit.
///
/// `Empty → ImagePresent` happens on the first decoded upload; the only way
/// back is [`Session::reset`], which the compositor calls on clear and release.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    phase: SessionPhase,
    pending_upload: Option<String>,
}

impl Session {
    /// Create a fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether a base image is present.
    #[must_use]
    pub fn has_base_image(&self) -> bool {
        self.phase == SessionPhase::ImagePresent
    }

    /// File whose decode is in flight.
    ///
    /// Only set between [`Session::begin_upload`] and
    /// [`Session::finish_upload`]; an owner that runs the decode inside one
    /// step never exposes it to readers.
    #[must_use]
    pub fn pending_upload(&self) -> Option<&str> {
        self.pending_upload.as_deref()
    }

    /// Record that an upload is being decoded.
    pub fn begin_upload(&mut self, file_name: impl Into<String>) {
        let file_name = file_name.into();
        tracing::debug!("Upload pending: {file_name}");
        self.pending_upload = Some(file_name);
    }

    /// Finish the in-flight upload; a success moves the session to `ImagePresent`.
    pub fn finish_upload(&mut self, decoded: bool) {
        self.pending_upload = None;
        if decoded && self.phase == SessionPhase::Empty {
            tracing::debug!("Session: empty -> image present");
            self.phase = SessionPhase::ImagePresent;
        }
    }

    /// Return to the empty phase.
    pub fn reset(&mut self) {
        if self.phase != SessionPhase::Empty {
            tracing::debug!("Session: image present -> empty");
        }
        self.phase = SessionPhase::Empty;
        self.pending_upload = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(!session.has_base_image());
        assert!(session.pending_upload().is_none());
    }

    #[test]
    fn test_successful_upload_transitions() {
        let mut session = Session::new();
        session.begin_upload("photo.png");
        assert_eq!(session.pending_upload(), Some("photo.png"));
        assert!(!session.has_base_image());

        session.finish_upload(true);
        assert!(session.pending_upload().is_none());
        assert!(session.has_base_image());
    }

    #[test]
    fn test_failed_upload_stays_empty() {
        let mut session = Session::new();
        session.begin_upload("broken.png");
        session.finish_upload(false);
        assert!(session.pending_upload().is_none());
        assert_eq!(session.phase(), SessionPhase::Empty);
    }

    #[test]
    fn test_failed_upload_keeps_existing_image() {
        let mut session = Session::new();
        session.begin_upload("photo.png");
        session.finish_upload(true);
        session.begin_upload("broken.png");
        session.finish_upload(false);
        assert!(session.has_base_image());
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new();
        session.begin_upload("photo.png");
        session.finish_upload(true);
        session.reset();
        assert_eq!(session.phase(), SessionPhase::Empty);
    }
}
