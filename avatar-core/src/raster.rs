//! Decoded pixel data shared between placed objects.

use std::sync::Arc;

use crate::{AvatarError, AvatarResult};

/// A decoded RGBA8 image.
///
/// Pixel storage is reference counted, so cloning a raster (for example when
/// the same asset is placed twice) does not copy pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Raster {
    /// Wrap an RGBA8 buffer.
    ///
    /// # Errors
    ///
    /// Returns [`AvatarError::InvalidRaster`] if `pixels` is not exactly
    /// `width * height * 4` bytes long.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> AvatarResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(AvatarError::InvalidRaster {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Create a raster filled with a single color.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let pixels: Vec<u8> = rgba.iter().copied().cycle().take(count * 4).collect();
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Size of the pixel buffer in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }

    /// Whether two rasters share the same pixel allocation.
    #[must_use]
    pub fn shares_pixels(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Raster::from_rgba(2, 2, vec![0; 16]).is_ok());
        let err = Raster::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            AvatarError::InvalidRaster {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_solid_fills_every_pixel() {
        let raster = Raster::solid(3, 2, [10, 20, 30, 255]);
        assert_eq!(raster.size_bytes(), 24);
        for px in raster.pixels().chunks_exact(4) {
            assert_eq!(px, &[10, 20, 30, 255]);
        }
    }

    #[test]
    fn test_clone_shares_pixels() {
        let a = Raster::solid(4, 4, [0, 0, 0, 255]);
        let b = a.clone();
        assert!(a.shares_pixels(&b));
        let c = Raster::solid(4, 4, [0, 0, 0, 255]);
        assert!(!a.shares_pixels(&c));
    }
}
