//! Per-call state threaded through a generation step.
use rand::RngCore;

use crate::effects::ColorSampler;
use crate::geometry::Bounds;

/// Everything a node may consult while producing a shape, besides its own bounds.
///
/// `container` is the root-level region, passed through unchanged so that effects
/// can work in container-relative coordinates.
pub struct GenerationContext<'a> {
    pub container: &'a Bounds,
    pub rng: &'a mut dyn RngCore,
    pub sampler: Option<&'a dyn ColorSampler>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(container: &'a Bounds, rng: &'a mut dyn RngCore) -> Self {
        Self {
            container,
            rng,
            sampler: None,
        }
    }

    pub fn with_sampler(mut self, sampler: &'a dyn ColorSampler) -> Self {
        self.sampler = Some(sampler);
        self
    }
}
