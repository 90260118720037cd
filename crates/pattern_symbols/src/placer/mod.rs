//! Placers: composite nodes that split their bounds and delegate to a child.
//!
//! The linear family shares one state machine ([`Placer`]): on the first call of a
//! pass it derives a working copy of the caller's bounds, hands it to the child,
//! and each time the child finishes it advances the working bounds and counts one
//! created symbol. The pass ends once `n_to_create` symbols were created.
//!
//! [`NoiseGrid`] and [`Subdivision`] follow the same contract with their own
//! cursors.
pub mod grid;
pub mod linear;
pub mod noise_grid;
pub mod subdivision;

use rand::RngCore;
use serde_json::{json, Map, Value};

pub use noise_grid::NoiseGrid;
pub use subdivision::{DivisionRule, Subdivision};

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Rect};
use crate::params::tidy_floats;
use crate::random::{rand01, rand_count};
use crate::symbol::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn extent(self, rect: Rect) -> f32 {
        match self {
            Axis::X => rect.width,
            Axis::Y => rect.height,
        }
    }

    fn set_extent(self, bounds: &mut Bounds, extent: f32) {
        match self {
            Axis::X => bounds.set_width(extent),
            Axis::Y => bounds.set_height(extent),
        }
    }

    /// Move to the slot right after the current one.
    fn step(self, bounds: &mut Bounds) {
        let rect = bounds.rect();
        match self {
            Axis::X => bounds.set_x(rect.right()),
            Axis::Y => bounds.set_y(rect.bottom()),
        }
    }
}

/// How a placer derives and advances its working bounds.
#[derive(Clone, Debug, PartialEq)]
pub enum Layout {
    /// Same bounds for every symbol.
    Repeat,
    /// Even split along an axis.
    Line(Axis),
    /// Concentric shrink by `1 - scale` per step.
    Depth { scale: f32, margin: bool },
    /// Even split with a count drawn from `[min, max]` every pass.
    RandomLine { axis: Axis, min: u32, max: u32 },
    /// Uneven split: one drawn fraction per slot, summing to one.
    Irregular {
        axis: Axis,
        min: u32,
        max: u32,
        variation: f32,
        fractions: Vec<f32>,
    },
}

#[derive(Clone, Debug)]
pub struct Placer {
    layout: Layout,
    n_to_create: u32,
    n_created: u32,
    origin: Rect,
    working: Option<Bounds>,
    pub(crate) child: NodeId,
}

impl Placer {
    pub fn new(layout: Layout, n_to_create: u32, child: NodeId) -> Self {
        Self {
            layout,
            n_to_create,
            n_created: 0,
            origin: Rect::default(),
            working: None,
            child,
        }
    }

    /// A placer whose count (and slot fractions) are drawn right away.
    pub(crate) fn drawn(layout: Layout, child: NodeId, rng: &mut dyn RngCore) -> Self {
        let mut placer = Self::new(layout, 0, child);
        placer.redraw(rng);
        placer
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn n_to_create(&self) -> u32 {
        self.n_to_create
    }

    pub fn n_created(&self) -> u32 {
        self.n_created
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    /// Working bounds of the current step, once derived.
    pub fn working(&self) -> Option<&Bounds> {
        self.working.as_ref()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.n_created >= self.n_to_create
    }

    pub(crate) fn progress(&self) -> f32 {
        if self.n_to_create == 0 {
            return 1.0;
        }
        self.n_created as f32 / self.n_to_create as f32
    }

    pub(crate) fn ensure_initialized(&mut self, bounds: &Bounds) {
        if self.working.is_none() {
            self.initialize(bounds);
        }
    }

    fn initialize(&mut self, bounds: &Bounds) {
        let rect = bounds.rect();
        let mut working = bounds.clone();
        let count = self.n_to_create.max(1) as f32;
        match &self.layout {
            Layout::Repeat => {}
            Layout::Line(axis) | Layout::RandomLine { axis, .. } => {
                axis.set_extent(&mut working, axis.extent(rect) / count);
            }
            Layout::Irregular {
                axis, fractions, ..
            } => {
                let fraction = fractions.first().copied().unwrap_or(1.0 / count);
                axis.set_extent(&mut working, axis.extent(rect) * fraction);
            }
            Layout::Depth { scale, margin } => {
                if *margin {
                    shrink(&mut working, *scale);
                }
            }
        }
        self.origin = rect;
        self.working = Some(working);
    }

    /// Count the finished symbol and move the working bounds to the next slot.
    pub(crate) fn advance(&mut self) {
        self.n_created += 1;
        let Some(working) = self.working.as_mut() else {
            return;
        };
        match &self.layout {
            Layout::Repeat => {}
            Layout::Line(axis) | Layout::RandomLine { axis, .. } => axis.step(working),
            Layout::Irregular {
                axis, fractions, ..
            } => {
                axis.step(working);
                if let Some(fraction) = fractions.get(self.n_created as usize) {
                    axis.set_extent(working, axis.extent(self.origin) * fraction);
                }
            }
            Layout::Depth { scale, .. } => shrink(working, *scale),
        }
    }

    /// Start a new pass. Bounds are derived right away when given.
    pub(crate) fn restart(&mut self, bounds: Option<&Bounds>, rng: &mut dyn RngCore) {
        self.n_created = 0;
        self.redraw(rng);
        self.working = None;
        if let Some(bounds) = bounds {
            if !self.is_finished() {
                self.initialize(bounds);
            }
        }
    }

    fn redraw(&mut self, rng: &mut dyn RngCore) {
        match &mut self.layout {
            Layout::RandomLine { min, max, .. } => {
                self.n_to_create = rand_count(rng, *min, *max);
            }
            Layout::Irregular {
                min,
                max,
                variation,
                fractions,
                ..
            } => {
                let count = rand_count(rng, *min, *max);
                *fractions = slot_fractions(count, *variation, rng);
                self.n_to_create = count;
            }
            Layout::Repeat | Layout::Line(_) | Layout::Depth { .. } => {}
        }
    }

    /// Own parameters, without the child symbol.
    pub(crate) fn parameters(&self) -> Map<String, Value> {
        let value = match &self.layout {
            Layout::Repeat | Layout::Line(_) => json!({ "nSymbolsToCreate": self.n_to_create }),
            Layout::Depth { scale, margin } => json!({
                "nSymbolsToCreate": self.n_to_create,
                "scale": scale,
                "margin": margin,
            }),
            Layout::RandomLine { min, max, .. } => json!({ "min": min, "max": max }),
            Layout::Irregular {
                min,
                max,
                variation,
                ..
            } => json!({ "min": min, "max": max, "variation": variation }),
        };
        match tidy_floats(value) {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Shrink toward the center by `1 - scale`.
fn shrink(bounds: &mut Bounds, scale: f32) {
    let rect = bounds.rect();
    let center = rect.center();
    let factor = 1.0 - scale;
    bounds.set_size(rect.width * factor, rect.height * factor);
    bounds.set_center(center);
}

/// Largest `width` or `height` accepted by lattice-based placers.
///
/// Keeps cell and triangle counts well inside `u32` and the lattice allocation small.
pub const MAX_GRID_SIDE: u32 = 1024;

pub(crate) fn check_grid_side(tag: &str, width: u32, height: u32) -> Result<()> {
    if width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
        return Err(Error::parameter(
            tag,
            format!("width and height must not exceed {MAX_GRID_SIDE}, got {width}x{height}"),
        ));
    }
    Ok(())
}

/// `count` slot fractions `1 - variation + variation * u`, normalized to sum to one.
pub fn slot_fractions(count: u32, variation: f32, rng: &mut dyn RngCore) -> Vec<f32> {
    let variation = variation.clamp(0.0, 1.0);
    let weights: Vec<f32> = (0..count)
        .map(|_| 1.0 - variation + variation * rand01(rng))
        .collect();
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return vec![1.0 / count.max(1) as f32; count as usize];
    }
    weights.into_iter().map(|w| w / total).collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn bounds(width: f32, height: f32) -> Bounds {
        Bounds::new(Rect::new(0.0, 0.0, width, height))
    }

    fn slots(placer: &mut Placer, bounds: &Bounds) -> Vec<Rect> {
        let mut out = Vec::new();
        placer.ensure_initialized(bounds);
        while !placer.is_finished() {
            out.push(placer.working().unwrap().rect());
            placer.advance();
        }
        out
    }

    #[test]
    fn line_splits_evenly() {
        let mut placer = Placer::new(Layout::Line(Axis::X), 3, NodeId(0));
        let rects = slots(&mut placer, &bounds(300.0, 100.0));
        assert_eq!(
            rects,
            vec![
                Rect::new(0.0, 0.0, 100.0, 100.0),
                Rect::new(100.0, 0.0, 100.0, 100.0),
                Rect::new(200.0, 0.0, 100.0, 100.0),
            ]
        );
    }

    #[test]
    fn depth_shrinks_around_the_center() {
        let mut placer = Placer::new(
            Layout::Depth {
                scale: 0.5,
                margin: false,
            },
            3,
            NodeId(0),
        );
        let rects = slots(&mut placer, &bounds(200.0, 200.0));
        let widths: Vec<f32> = rects.iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![200.0, 100.0, 50.0]);
        assert!(rects.iter().all(|r| r.center() == glam::Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn margin_consumes_one_shrink_without_counting_it() {
        let mut placer = Placer::new(
            Layout::Depth {
                scale: 0.5,
                margin: true,
            },
            2,
            NodeId(0),
        );
        let rects = slots(&mut placer, &bounds(200.0, 200.0));
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].width, 100.0);
        assert_eq!(rects[1].width, 50.0);
    }

    #[test]
    fn zero_count_is_finished_from_the_start() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut placer = Placer::new(Layout::Line(Axis::Y), 0, NodeId(0));
        assert!(placer.is_finished());
        placer.restart(Some(&bounds(10.0, 10.0)), &mut rng);
        assert!(placer.is_finished());
        assert!(placer.working().is_none());
    }

    #[test]
    fn restart_redraws_random_counts() {
        let mut rng = StdRng::seed_from_u64(21);
        let layout = Layout::RandomLine {
            axis: Axis::X,
            min: 2,
            max: 6,
        };
        let mut placer = Placer::drawn(layout, NodeId(0), &mut rng);
        for _ in 0..50 {
            assert!((2..=6).contains(&placer.n_to_create()));
            placer.restart(Some(&bounds(120.0, 10.0)), &mut rng);
            let width = placer.working().unwrap().rect().width;
            assert!((width - 120.0 / placer.n_to_create() as f32).abs() < 1e-4);
        }
    }

    #[test]
    fn irregular_slots_tile_the_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let layout = Layout::Irregular {
            axis: Axis::Y,
            min: 4,
            max: 4,
            variation: 0.8,
            fractions: Vec::new(),
        };
        let mut placer = Placer::drawn(layout, NodeId(0), &mut rng);
        let rects = slots(&mut placer, &bounds(10.0, 100.0));
        assert_eq!(rects.len(), 4);
        for pair in rects.windows(2) {
            assert!((pair[0].bottom() - pair[1].y).abs() < 1e-4);
        }
        let total: f32 = rects.iter().map(|r| r.height).sum();
        assert!((total - 100.0).abs() < 1e-3);
    }

    #[test]
    fn fractions_sum_to_one_and_respect_variation() {
        let mut rng = StdRng::seed_from_u64(2);
        let even = slot_fractions(5, 0.0, &mut rng);
        assert!(even.iter().all(|f| (f - 0.2).abs() < 1e-6));
        let uneven = slot_fractions(5, 1.0, &mut rng);
        assert!((uneven.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(slot_fractions(0, 0.5, &mut rng).is_empty());
    }

    #[test]
    fn progress_counts_created_symbols() {
        let mut placer = Placer::new(Layout::Repeat, 4, NodeId(0));
        placer.ensure_initialized(&bounds(1.0, 1.0));
        assert_eq!(placer.progress(), 0.0);
        placer.advance();
        assert_eq!(placer.progress(), 0.25);
        assert_eq!(placer.working().unwrap().rect(), Rect::new(0.0, 0.0, 1.0, 1.0));
    }
}
