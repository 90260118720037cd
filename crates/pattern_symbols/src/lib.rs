#![forbid(unsafe_code)]
//! pattern_symbols: recursive symbol placement that turns a JSON tree into a stream of shapes.
//!
//! Modules:
//! - geometry: rectangles, bounds with attached shapes, emitted shapes and styles
//! - effects: appearance strategies (hue, palette, stripes, noise, transform, smooth, raster scale)
//! - symbol: the node arena, tag registry, terminals, weighted selection and the property inspector
//! - placer: bounds subdivision (linear, depth, grid, random-sized, irregular, noise grid, quadtree, recursive)
//! - pattern: root document, frame driver and generation events
//!
//! For examples and docs, see README and docs.rs.
pub mod color;
pub mod context;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod params;
pub mod pattern;
pub mod placer;
pub mod random;
pub mod symbol;

/// Convenient re-exports for common types. Import with `use pattern_symbols::prelude::*;`.
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::context::GenerationContext;
    pub use crate::effects::{effect_tags, ColorSampler, Effect, FnSampler, HueTarget};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Anchor, Bounds, Geometry, Rect, Shape, Style};
    pub use crate::params::{merge_defaults, TypedSpec};
    pub use crate::pattern::{
        EventSink, FnSink, Frame, Generation, MultiSink, Pattern, PatternConfig, PatternEvent,
        PatternEventKind, Size, VecSink,
    };
    pub use crate::symbol::{
        is_known_tag, symbol_tags, FieldKind, NodeId, Property, SymbolKind, SymbolTree,
    };
}
