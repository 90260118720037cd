//! Axis-aligned rectangle and its named anchor points.
use glam::Vec2;

use crate::error::{Error, Result};

/// Axis-aligned rectangle given by its top-left corner and size (y grows downwards).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width * 0.5,
            center.y - height * 0.5,
            width,
            height,
        )
    }

    /// Smallest rectangle containing every point; zero-sized at the origin when empty.
    pub fn from_points(points: &[Vec2]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Same rectangle with negative extents flipped to positive ones.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    /// Cell `(column, row)` of an even `columns` x `rows` split.
    pub fn cell(&self, columns: u32, rows: u32, column: u32, row: u32) -> Self {
        let w = self.width / columns.max(1) as f32;
        let h = self.height / rows.max(1) as f32;
        Self::new(self.x + column as f32 * w, self.y + row as f32 * h, w, h)
    }

    pub fn anchor(&self, anchor: Anchor) -> Vec2 {
        let (fx, fy) = anchor.fractions();
        Vec2::new(self.x + self.width * fx, self.y + self.height * fy)
    }

    /// Point at normalized coordinates `(u, v)` inside the rectangle.
    pub fn lerp(&self, u: f32, v: f32) -> Vec2 {
        Vec2::new(self.x + self.width * u, self.y + self.height * v)
    }

    pub fn approx_eq(&self, other: &Rect, eps: f32) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.width - other.width).abs() <= eps
            && (self.height - other.height).abs() <= eps
    }
}

/// The nine named points of a box, in index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    RightCenter,
    BottomRight,
    BottomCenter,
    BottomLeft,
    LeftCenter,
    Center,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::RightCenter,
        Anchor::BottomRight,
        Anchor::BottomCenter,
        Anchor::BottomLeft,
        Anchor::LeftCenter,
        Anchor::Center,
    ];

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            Error::parameter(
                "polygon-on-box",
                format!("vertex index {index} out of range 0..9"),
            )
        })
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name() == name)
            .ok_or_else(|| Error::parameter("polygon-on-box", format!("unknown vertex '{name}'")))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "topLeft",
            Anchor::TopCenter => "topCenter",
            Anchor::TopRight => "topRight",
            Anchor::RightCenter => "rightCenter",
            Anchor::BottomRight => "bottomRight",
            Anchor::BottomCenter => "bottomCenter",
            Anchor::BottomLeft => "bottomLeft",
            Anchor::LeftCenter => "leftCenter",
            Anchor::Center => "center",
        }
    }

    fn fractions(&self) -> (f32, f32) {
        match self {
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::TopCenter => (0.5, 0.0),
            Anchor::TopRight => (1.0, 0.0),
            Anchor::RightCenter => (1.0, 0.5),
            Anchor::BottomRight => (1.0, 1.0),
            Anchor::BottomCenter => (0.5, 1.0),
            Anchor::BottomLeft => (0.0, 1.0),
            Anchor::LeftCenter => (0.0, 0.5),
            Anchor::Center => (0.5, 0.5),
        }
    }
}
