//! # Avatar Renderer
//!
//! Decodes images, composes a [`Surface`] into RGBA frames and exports PNG.
//!
//! ## Pipeline
//!
//! ```text
//! bytes / data: URL ──decode──▶ Raster ──▶ PlacedObject on Surface
//!                                                │
//!                               ┌────────────────┴───────────────┐
//!                               ▼                                ▼
//!                      Renderer::render                 Renderer::export_png
//!                   (present to backend)               (lossless PNG bytes)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod export;
pub mod image;
pub mod raster_cache;

pub use backend::framebuffer::{FramebufferBackend, FramebufferHandle};
pub use backend::{BackendType, RenderBackend};
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, SurfaceExporter};
pub use raster_cache::{CacheStats, RasterCache, RasterCacheConfig};

use avatar_core::Surface;

/// Configuration for the renderer.
#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    /// Settings shared by on-screen frames and exports.
    pub export: ExportConfig,
}

/// Draws a surface onto one backend and owns that backend's lifetime.
///
/// Dropping the renderer releases the backend.
pub struct Renderer {
    config: RendererConfig,
    exporter: SurfaceExporter,
    backend: Box<dyn RenderBackend>,
    frame_count: u64,
}

impl Renderer {
    /// Bind a renderer to a backend sized for the given surface dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be resized.
    pub fn new(
        config: RendererConfig,
        mut backend: Box<dyn RenderBackend>,
        width: u32,
        height: u32,
    ) -> RenderResult<Self> {
        backend.resize(width, height)?;
        tracing::debug!(
            "Renderer bound to {:?} backend at {}x{}",
            backend.backend_type(),
            width,
            height
        );

        Ok(Self {
            exporter: SurfaceExporter::new(config.export.clone()),
            config,
            backend,
            frame_count: 0,
        })
    }

    /// Compose the surface and present it.
    ///
    /// # Errors
    ///
    /// Returns an error if composition or presentation fails.
    pub fn render(&mut self, surface: &Surface) -> RenderResult<()> {
        let frame = self.exporter.rasterize(surface)?;
        self.backend.present(&frame)?;
        self.frame_count += 1;
        tracing::trace!(
            "Frame {} presented: {} objects",
            self.frame_count,
            surface.len()
        );
        Ok(())
    }

    /// Encode the surface as PNG at native size.
    ///
    /// # Errors
    ///
    /// Returns an error if composition or encoding fails.
    pub fn export_png(&self, surface: &Surface) -> RenderResult<Vec<u8>> {
        self.exporter.render_to_png(surface)
    }

    /// Get the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the active backend type.
    #[must_use]
    pub fn active_backend(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        tracing::debug!("Releasing renderer after {} frames", self.frame_count);
        self.backend.release();
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("backend", &self.backend.backend_type())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_core::{ObjectSource, PlacedObject, Raster};

    #[test]
    fn test_render_presents_to_backend() {
        let backend = FramebufferBackend::new(1, 1);
        let handle = backend.handle();
        let mut renderer =
            Renderer::new(RendererConfig::default(), Box::new(backend), 8, 8).expect("renderer");
        assert_eq!(handle.size(), (8, 8));

        let mut surface = Surface::new(8, 8).expect("surface");
        surface.add(PlacedObject::new(
            ObjectSource::Upload {
                file_name: "dot.png".to_string(),
            },
            Raster::solid(1, 1, [255, 255, 255, 255]),
        ));
        renderer.render(&surface).expect("render");

        assert_eq!(renderer.frame_count(), 1);
        let frame = handle.last_frame().expect("frame");
        assert_eq!(frame.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(renderer.active_backend(), BackendType::Framebuffer);
    }

    #[test]
    fn test_drop_releases_backend() {
        let backend = FramebufferBackend::new(4, 4);
        let handle = backend.handle();
        let renderer =
            Renderer::new(RendererConfig::default(), Box::new(backend), 4, 4).expect("renderer");
        assert!(!handle.is_released());
        drop(renderer);
        assert!(handle.is_released());
    }
}
