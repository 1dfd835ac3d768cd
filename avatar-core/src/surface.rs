//! The drawing surface: an ordered stack of placed objects.

use serde::{Deserialize, Serialize};

use crate::{AvatarError, AvatarResult, ObjectId, ObjectSource, PlacedObject, Transform};

/// Default surface width in pixels.
pub const DEFAULT_WIDTH: u32 = 500;

/// Default surface height in pixels.
pub const DEFAULT_HEIGHT: u32 = 500;

/// A fixed-size surface holding placed objects in z-order.
///
/// Index 0 is the back of the stack; the last object is drawn on top.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    objects: Vec<PlacedObject>,
    active: Option<ObjectId>,
}

impl Surface {
    /// Create an empty surface.
    ///
    /// # Errors
    ///
    /// Returns [`AvatarError::InvalidSize`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> AvatarResult<Self> {
        if width == 0 || height == 0 {
            return Err(AvatarError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            objects: Vec::new(),
            active: None,
        })
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Append an object on top of the stack.
    pub fn add(&mut self, mut object: PlacedObject) -> ObjectId {
        let id = object.id;
        object.selected = false;
        self.objects.push(object);
        id
    }

    /// Remove every object and the selection.
    ///
    /// Returns the number of objects removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.objects.len();
        self.objects.clear();
        self.active = None;
        removed
    }

    /// Get an object by ID.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn get_mut(&mut self, id: ObjectId) -> AvatarResult<&mut PlacedObject> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(AvatarError::ObjectNotFound(id))
    }

    /// Objects from back to front.
    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter()
    }

    /// Position of an object in the stack (0 = back).
    #[must_use]
    pub fn z_index(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// The topmost object.
    #[must_use]
    pub fn front(&self) -> Option<&PlacedObject> {
        self.objects.last()
    }

    /// Move an object to the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not on this surface.
    pub fn bring_to_front(&mut self, id: ObjectId) -> AvatarResult<()> {
        let index = self.z_index(id).ok_or(AvatarError::ObjectNotFound(id))?;
        let object = self.objects.remove(index);
        self.objects.push(object);
        Ok(())
    }

    /// Center an object within the surface bounds, keeping its scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not on this surface.
    #[allow(clippy::cast_precision_loss)]
    pub fn center_object(&mut self, id: ObjectId) -> AvatarResult<()> {
        let (w, h) = (self.width as f32, self.height as f32);
        let object = self.get_mut(id)?;
        object.transform.x = (w - object.scaled_width()) / 2.0;
        object.transform.y = (h - object.scaled_height()) / 2.0;
        Ok(())
    }

    /// Move an object's top-left corner.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not on this surface.
    pub fn move_object(&mut self, id: ObjectId, x: f32, y: f32) -> AvatarResult<()> {
        let object = self.get_mut(id)?;
        object.transform.x = x;
        object.transform.y = y;
        Ok(())
    }

    /// Scale an object around its center.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not on this surface or the factor is invalid.
    pub fn scale_object(&mut self, id: ObjectId, factor: f32) -> AvatarResult<()> {
        self.get_mut(id)?.scale_by(factor)
    }

    /// Make an object the single active one.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not on this surface.
    pub fn set_active(&mut self, id: ObjectId) -> AvatarResult<()> {
        if self.get(id).is_none() {
            return Err(AvatarError::ObjectNotFound(id));
        }
        for object in &mut self.objects {
            object.selected = object.id == id;
        }
        self.active = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn discard_active(&mut self) {
        for object in &mut self.objects {
            object.selected = false;
        }
        self.active = None;
    }

    /// The active object, if any.
    #[must_use]
    pub fn active(&self) -> Option<&PlacedObject> {
        self.active.and_then(|id| self.get(id))
    }

    /// Find the topmost object at the given surface coordinates.
    #[must_use]
    pub fn object_at(&self, x: f32, y: f32) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.contains_point(x, y))
            .map(|o| o.id)
    }

    /// Number of objects on the surface.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the surface has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Describe the surface without pixel data.
    #[must_use]
    pub fn summary(&self) -> SurfaceSummary {
        SurfaceSummary {
            width: self.width,
            height: self.height,
            objects: self
                .objects
                .iter()
                .map(|o| ObjectSummary {
                    id: o.id,
                    source: o.source.clone(),
                    transform: o.transform,
                    natural_width: o.raster.width(),
                    natural_height: o.raster.height(),
                    selected: o.selected,
                })
                .collect(),
            active: self.active,
        }
    }
}

/// Serializable description of one placed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Object ID.
    pub id: ObjectId,
    /// Provenance.
    pub source: ObjectSource,
    /// Current transform.
    pub transform: Transform,
    /// Decoded width before scaling.
    pub natural_width: u32,
    /// Decoded height before scaling.
    pub natural_height: u32,
    /// Selection flag.
    pub selected: bool,
}

/// Serializable description of a surface, objects listed back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSummary {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Objects from back to front.
    pub objects: Vec<ObjectSummary>,
    /// Active object.
    pub active: Option<ObjectId>,
}
