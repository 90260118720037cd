//! Geometry primitives: rectangles, bounds and emitted shapes.
pub mod bounds;
pub mod rect;
pub mod shape;

pub use bounds::Bounds;
pub use rect::{Anchor, Rect};
pub use shape::{Geometry, Shape, Style, CIRCLE_SEGMENTS};
