//! In-memory framebuffer backend.
//!
//! Keeps the last presented frame behind a shared handle so the host (or a
//! test) can read back exactly what would be on screen.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::RgbaImage;

use crate::{BackendType, RenderError, RenderResult};

use super::RenderBackend;

#[derive(Debug, Default)]
struct FramebufferState {
    width: u32,
    height: u32,
    frame: Option<RgbaImage>,
    presented: u64,
    released: bool,
}

/// Read side of a [`FramebufferBackend`].
#[derive(Debug, Clone, Default)]
pub struct FramebufferHandle {
    state: Arc<Mutex<FramebufferState>>,
}

impl FramebufferHandle {
    fn lock(&self) -> MutexGuard<'_, FramebufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the last presented frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<RgbaImage> {
        self.lock().frame.clone()
    }

    /// Number of frames presented so far.
    #[must_use]
    pub fn presented(&self) -> u64 {
        self.lock().presented
    }

    /// Whether the backend has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    /// Current target size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        let state = self.lock();
        (state.width, state.height)
    }
}

/// Headless drawing target backed by an RGBA buffer.
#[derive(Debug)]
pub struct FramebufferBackend {
    handle: FramebufferHandle,
}

impl FramebufferBackend {
    /// Create a framebuffer of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let handle = FramebufferHandle::default();
        {
            let mut state = handle.lock();
            state.width = width;
            state.height = height;
        }
        Self { handle }
    }

    /// A handle that stays readable after the backend is moved into a renderer.
    #[must_use]
    pub fn handle(&self) -> FramebufferHandle {
        self.handle.clone()
    }
}

impl RenderBackend for FramebufferBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Framebuffer
    }

    fn present(&mut self, frame: &RgbaImage) -> RenderResult<()> {
        let mut state = self.handle.lock();
        if state.released {
            return Err(RenderError::Surface("framebuffer already released".to_string()));
        }
        if frame.dimensions() != (state.width, state.height) {
            return Err(RenderError::Surface(format!(
                "frame is {}x{}, target is {}x{}",
                frame.width(),
                frame.height(),
                state.width,
                state.height
            )));
        }
        state.frame = Some(frame.clone());
        state.presented += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        let mut state = self.handle.lock();
        state.width = width;
        state.height = height;
        state.frame = None;
        tracing::debug!("Framebuffer resized to {}x{}", width, height);
        Ok(())
    }

    fn release(&mut self) {
        let mut state = self.handle.lock();
        state.frame = None;
        state.released = true;
        tracing::debug!("Framebuffer released after {} frames", state.presented);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_present_stores_frame() {
        let mut backend = FramebufferBackend::new(2, 2);
        let handle = backend.handle();
        let frame = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
        backend.present(&frame).expect("present");
        assert_eq!(handle.presented(), 1);
        assert_eq!(handle.last_frame(), Some(frame));
    }

    #[test]
    fn test_present_rejects_wrong_size() {
        let mut backend = FramebufferBackend::new(2, 2);
        let frame = RgbaImage::new(3, 3);
        assert!(backend.present(&frame).is_err());
    }

    #[test]
    fn test_release_blocks_further_frames() {
        let mut backend = FramebufferBackend::new(1, 1);
        let handle = backend.handle();
        backend.release();
        assert!(handle.is_released());
        assert!(backend.present(&RgbaImage::new(1, 1)).is_err());
    }

    #[test]
    fn test_resize_updates_target() {
        let mut backend = FramebufferBackend::new(1, 1);
        backend.resize(500, 500).expect("resize");
        assert_eq!(backend.handle().size(), (500, 500));
        assert_eq!(backend.backend_type(), BackendType::Framebuffer);
    }
}
