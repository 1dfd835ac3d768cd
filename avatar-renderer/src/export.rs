//! Surface rasterization and PNG export.
//!
//! Objects are drawn back to front onto a background-filled RGBA buffer at
//! the surface's native pixel size, then encoded as lossless PNG.

use avatar_core::{PlacedObject, Surface};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageBuffer, ImageEncoder, Rgba, RgbaImage};

use crate::error::{RenderError, RenderResult};

/// Configuration for surface export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Background color as RGBA bytes. Transparent by default.
    pub background: [u8; 4],
    /// Resampling filter for scaled objects.
    pub filter: FilterType,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 0],
            filter: FilterType::Triangle,
        }
    }
}

/// Rasterizes a [`Surface`] and encodes it as PNG.
#[derive(Debug, Clone, Default)]
pub struct SurfaceExporter {
    config: ExportConfig,
}

impl SurfaceExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The exporter configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Draw every object, back to front, into a buffer the size of the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if an object's pixel buffer is inconsistent.
    pub fn rasterize(&self, surface: &Surface) -> RenderResult<RgbaImage> {
        let mut frame =
            RgbaImage::from_pixel(surface.width(), surface.height(), Rgba(self.config.background));

        for object in surface.objects() {
            self.draw_object(&mut frame, object)?;
        }

        Ok(frame)
    }

    /// Rasterize the surface and encode it as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    pub fn render_to_png(&self, surface: &Surface) -> RenderResult<Vec<u8>> {
        let frame = self.rasterize(surface)?;
        encode_png(&frame)
    }

    /// Draw one object, resampling only the part that lands inside the frame.
    ///
    /// Placement is computed in `f64` so extreme scales neither overflow nor
    /// allocate more than one frame's worth of pixels.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::float_cmp
    )]
    fn draw_object(&self, frame: &mut RgbaImage, object: &PlacedObject) -> RenderResult<()> {
        let raster = &object.raster;
        let source: ImageBuffer<Rgba<u8>, &[u8]> =
            ImageBuffer::from_raw(raster.width(), raster.height(), raster.pixels()).ok_or_else(
                || RenderError::Resource(format!("Object {} has a truncated raster", object.id)),
            )?;

        let (src_w, src_h) = (f64::from(raster.width()), f64::from(raster.height()));
        let t = &object.transform;
        let left = f64::from(t.x).round();
        let top = f64::from(t.y).round();
        let right = (f64::from(t.x) + src_w * f64::from(t.scale_x)).round();
        let bottom = (f64::from(t.y) + src_h * f64::from(t.scale_y)).round();
        let placed = [left, top, right, bottom].iter().all(|v| v.is_finite());
        if !placed || right <= left || bottom <= top {
            return Ok(());
        }

        let (frame_w, frame_h) = (f64::from(frame.width()), f64::from(frame.height()));
        let (clip_left, clip_right) = (left.max(0.0), right.min(frame_w));
        let (clip_top, clip_bottom) = (top.max(0.0), bottom.min(frame_h));
        if clip_left >= clip_right || clip_top >= clip_bottom {
            tracing::trace!("Object {} is outside the surface", object.id);
            return Ok(());
        }

        if right - left == src_w && bottom - top == src_h {
            imageops::overlay(frame, &source, left as i64, top as i64);
            return Ok(());
        }

        // Source pixels behind the visible window, widened to whole pixels.
        let (kx, ky) = (src_w / (right - left), src_h / (bottom - top));
        let src_left = ((clip_left - left) * kx).floor().clamp(0.0, src_w - 1.0);
        let src_top = ((clip_top - top) * ky).floor().clamp(0.0, src_h - 1.0);
        let src_right = ((clip_right - left) * kx).ceil().clamp(src_left + 1.0, src_w);
        let src_bottom = ((clip_bottom - top) * ky).ceil().clamp(src_top + 1.0, src_h);

        let window = imageops::crop_imm(
            &source,
            src_left as u32,
            src_top as u32,
            (src_right - src_left) as u32,
            (src_bottom - src_top) as u32,
        );
        let scaled = imageops::resize(
            &*window,
            (clip_right - clip_left) as u32,
            (clip_bottom - clip_top) as u32,
            self.config.filter,
        );
        imageops::overlay(frame, &scaled, clip_left as i64, clip_top as i64);

        Ok(())
    }
}

/// Encode an RGBA buffer as PNG.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn encode_png(frame: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}
