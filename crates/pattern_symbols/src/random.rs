//! Random number helpers shared by the probabilistic nodes and effects.
//!
//! Every consumer takes `&mut dyn RngCore` so that a single seeded generator owned
//! by the driver makes whole generation passes reproducible.
use rand::RngCore;

/// Generate a random float in the range [0, 1).
#[inline]
pub fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Generate a random float in `[min, max)`. Swapped bounds are accepted.
#[inline]
pub fn rand_between(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + rand01(rng) * (max - min)
}

/// Draw an integer count as `round(min + u * (max - min))`.
///
/// Negative results are clamped to zero.
pub fn rand_count(rng: &mut dyn RngCore, min: u32, max: u32) -> u32 {
    let (min, max) = (min as f32, max as f32);
    (min + rand01(rng) * (max - min)).round().max(0.0) as u32
}

/// Uniform jitter in `[-amplitude, amplitude)`.
#[inline]
pub fn rand_signed(rng: &mut dyn RngCore, amplitude: f32) -> f32 {
    (rand01(rng) * 2.0 - 1.0) * amplitude
}
