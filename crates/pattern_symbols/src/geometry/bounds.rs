//! The region handed from a node to its child.
use glam::Vec2;

use crate::geometry::{Geometry, Rect};

/// Axis-aligned rectangle plus an optional attached shape.
///
/// The rectangle is authoritative. When a shape is attached (for example the
/// triangles of a noise grid), every position or size change is mirrored onto it so
/// that a `bounds` terminal emits the shape exactly where the rectangle is.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    rect: Rect,
    shape: Option<Geometry>,
    pub rotation: f32,
}

impl Bounds {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            shape: None,
            rotation: 0.0,
        }
    }

    /// Bounds capturing the bounding rectangle of `geometry`, which stays attached.
    pub fn from_geometry(geometry: Geometry) -> Self {
        Self {
            rect: geometry.bounding_rect(),
            shape: Some(geometry),
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn attached(&self) -> Option<&Geometry> {
        self.shape.as_ref()
    }

    /// Bounds over the same rectangle without the attached shape.
    pub fn detached(&self) -> Self {
        Self::new(self.rect).with_rotation(self.rotation)
    }

    /// Move the top-left corner to `position`.
    pub fn set_position(&mut self, position: Vec2) {
        let delta = position - self.rect.top_left();
        if let Some(shape) = self.shape.as_mut() {
            shape.translate(delta);
        }
        self.rect.x = position.x;
        self.rect.y = position.y;
    }

    pub fn set_x(&mut self, x: f32) {
        self.set_position(Vec2::new(x, self.rect.y));
    }

    pub fn set_y(&mut self, y: f32) {
        self.set_position(Vec2::new(self.rect.x, y));
    }

    pub fn set_center(&mut self, center: Vec2) {
        let offset = self.rect.top_left() - self.rect.center();
        self.set_position(center + offset);
    }

    /// Resize keeping the top-left corner fixed.
    pub fn set_size(&mut self, width: f32, height: f32) {
        let target = Rect::new(self.rect.x, self.rect.y, width, height);
        if let Some(shape) = self.shape.as_mut() {
            shape.fit(self.rect, target);
        }
        self.rect = target;
    }

    pub fn set_width(&mut self, width: f32) {
        self.set_size(width, self.rect.height);
    }

    pub fn set_height(&mut self, height: f32) {
        self.set_size(self.rect.width, height);
    }

    /// The attached shape, or the rectangle itself.
    pub fn to_geometry(&self) -> Geometry {
        self.shape
            .clone()
            .unwrap_or(Geometry::Rectangle(self.rect))
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Bounds::new(rect)
    }
}
