//! Scaling driven by an external raster image.
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Effect;
use crate::color::Color;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::geometry::Shape;
use crate::params::resolve;

/// Source of colors at arbitrary points, such as a loaded image.
///
/// Returns `None` outside the sampled area.
pub trait ColorSampler {
    fn sample(&self, point: mint::Point2<f32>) -> Option<Color>;
}

/// Adapter turning a closure into a [`ColorSampler`].
pub struct FnSampler<F>(pub F)
where
    F: Fn(mint::Point2<f32>) -> Option<Color>;

impl<F> ColorSampler for FnSampler<F>
where
    F: Fn(mint::Point2<f32>) -> Option<Color>,
{
    fn sample(&self, point: mint::Point2<f32>) -> Option<Color> {
        (self.0)(point)
    }
}

/// Scales a shape about its center by the brightness under it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RasterScale {
    pub invert: bool,
    pub amount: f32,
}

impl RasterScale {
    /// Scale factor for a sampled color; unsampled points count as fully bright.
    pub fn factor(&self, sampled: Option<Color>) -> f32 {
        let brightness = sampled.map_or(1.0, |c| c.brightness());
        let brightness = if self.invert {
            1.0 - brightness
        } else {
            brightness
        };
        brightness * self.amount
    }

    pub(crate) fn apply(&self, shape: &mut Shape, ctx: &mut GenerationContext<'_>) {
        let Some(sampler) = ctx.sampler else {
            return;
        };
        let center = shape.geometry.center();
        let factor = self.factor(sampler.sample(mint::Point2 {
            x: center.x,
            y: center.y,
        }));
        shape.geometry.scale_about(center, factor, factor);
    }
}

pub(crate) fn build(params: &Value, _rng: &mut dyn RngCore) -> Result<Effect> {
    let defaults = json!({ "invert": true, "amount": 1.0 });
    resolve("raster-scale", &defaults, params).map(Effect::RasterScale)
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::geometry::{Bounds, Geometry, Rect};

    #[test]
    fn without_sampler_nothing_changes() {
        let mut rng = StdRng::seed_from_u64(0);
        let container = Bounds::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut ctx = GenerationContext::new(&container, &mut rng);
        let original = Shape::new(Geometry::Rectangle(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let mut shape = original.clone();
        RasterScale {
            invert: true,
            amount: 1.0,
        }
        .apply(&mut shape, &mut ctx);
        assert_eq!(shape, original);
    }

    #[test]
    fn scales_by_sampled_brightness() {
        let mut rng = StdRng::seed_from_u64(0);
        let container = Bounds::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let gray = FnSampler(|_: mint::Point2<f32>| Some(Color::rgb(0.5, 0.5, 0.5)));
        let mut ctx = GenerationContext::new(&container, &mut rng).with_sampler(&gray);
        let mut shape = Shape::new(Geometry::Circle {
            center: Vec2::new(50.0, 50.0),
            radius: 10.0,
        });
        RasterScale {
            invert: false,
            amount: 2.0,
        }
        .apply(&mut shape, &mut ctx);
        assert_eq!(
            shape.geometry,
            Geometry::Circle {
                center: Vec2::new(50.0, 50.0),
                radius: 10.0
            }
        );
    }

    #[test]
    fn missing_samples_count_as_bright() {
        let effect = RasterScale {
            invert: true,
            amount: 1.0,
        };
        assert_eq!(effect.factor(None), 0.0);
        assert_eq!(effect.factor(Some(Color::BLACK)), 1.0);
    }
}
