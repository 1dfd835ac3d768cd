//! Drawing targets that receive composed frames.

pub mod framebuffer;

use image::RgbaImage;

use crate::RenderResult;

/// Kind of drawing target behind a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// In-memory RGBA framebuffer (headless, tests, offscreen export).
    Framebuffer,
}

/// Trait for drawing targets.
///
/// A backend holds whatever graphics resources the target needs; they are
/// given back in [`RenderBackend::release`], which the owning
/// [`Renderer`](crate::Renderer) calls exactly once when it is dropped.
pub trait RenderBackend: Send {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Show a fully composed frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot accept the frame.
    fn present(&mut self, frame: &RgbaImage) -> RenderResult<()>;

    /// Resize the drawing target.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Free the target's resources.
    fn release(&mut self);
}
