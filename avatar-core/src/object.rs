//! Placed objects - decoded images positioned on a surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AvatarError, AvatarResult, Raster};

/// Unique identifier for a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the pixels of a placed object came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectSource {
    /// A file the user uploaded.
    Upload {
        /// File name as reported by the file picker.
        file_name: String,
    },
    /// An overlay from the asset catalog.
    Asset {
        /// Same-origin URL of the asset.
        url: String,
        /// Human readable name.
        display_name: String,
    },
}

impl ObjectSource {
    /// Short label for logs and snapshots.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Upload { file_name } => file_name,
            Self::Asset { display_name, .. } => display_name,
        }
    }
}

/// Largest width or height, in pixels, an object may be scaled to.
pub const MAX_SCALED_SIDE: f32 = 16_384.0;

/// Position and scale of an object in surface pixels.
///
/// `x`/`y` is the top-left corner of the scaled image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// A decoded image placed on a surface.
#[derive(Debug, Clone)]
pub struct PlacedObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Provenance of the pixels.
    pub source: ObjectSource,
    /// Decoded pixels at natural size.
    pub raster: Raster,
    /// Position and scale.
    pub transform: Transform,
    /// Whether this object is the active (selected) one.
    pub selected: bool,
}

impl PlacedObject {
    /// Wrap a decoded raster at the origin with unit scale.
    #[must_use]
    pub fn new(source: ObjectSource, raster: Raster) -> Self {
        Self {
            id: ObjectId::new(),
            source,
            raster,
            transform: Transform::default(),
            selected: false,
        }
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Width on the surface after scaling.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scaled_width(&self) -> f32 {
        self.raster.width() as f32 * self.transform.scale_x
    }

    /// Height on the surface after scaling.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scaled_height(&self) -> f32 {
        self.raster.height() as f32 * self.transform.scale_y
    }

    /// Multiply both scale factors, keeping the object's center in place.
    ///
    /// # Errors
    ///
    /// Returns [`AvatarError::InvalidScale`] for non-finite or non-positive
    /// factors, and for factors that would make either side larger than
    /// [`MAX_SCALED_SIDE`].
    pub fn scale_by(&mut self, factor: f32) -> AvatarResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(AvatarError::InvalidScale(factor));
        }
        let largest = self.scaled_width().max(self.scaled_height()) * factor;
        if !largest.is_finite() || largest > MAX_SCALED_SIDE {
            return Err(AvatarError::InvalidScale(factor));
        }
        let cx = self.transform.x + self.scaled_width() / 2.0;
        let cy = self.transform.y + self.scaled_height() / 2.0;
        self.transform.scale_x *= factor;
        self.transform.scale_y *= factor;
        self.transform.x = cx - self.scaled_width() / 2.0;
        self.transform.y = cy - self.scaled_height() / 2.0;
        Ok(())
    }

    /// Check if a point (in surface coordinates) is within this object.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let t = &self.transform;
        x >= t.x && x <= t.x + self.scaled_width() && y >= t.y && y <= t.y + self.scaled_height()
    }
}
