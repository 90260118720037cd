//! Deterministic vertex displacement.
use glam::Vec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Effect;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::geometry::{Geometry, Rect, Shape};
use crate::params::resolve;

/// Moves each vertex by `amount` in a direction hashed from its position.
///
/// The hash works on the vertex position relative to the container, quantized to a
/// thousandth of its size, so identical layouts are displaced identically whatever
/// the seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Noise {
    pub amount: f32,
}

impl Noise {
    pub(crate) fn apply(&self, shape: &mut Shape, ctx: &mut GenerationContext<'_>) {
        let container = ctx.container.rect();
        let geometry = std::mem::replace(&mut shape.geometry, Geometry::polygon(Vec::new(), true));
        let Geometry::Polygon { mut points, closed } = geometry.into_polygon() else {
            return;
        };
        for point in &mut points {
            *point += displacement(*point, container, self.amount);
        }
        shape.geometry = Geometry::Polygon { points, closed };
    }
}

/// Direction in degrees for a point, in `(-10000, 10000)`.
pub fn direction(point: Vec2, container: Rect) -> i32 {
    let quantize = |offset: f32, extent: f32| {
        if extent == 0.0 {
            0
        } else {
            (1000.0 * offset / extent).floor() as i32
        }
    };
    let x = quantize(point.x - container.x, container.width);
    let y = quantize(point.y - container.y, container.height);
    (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)) % 10_000
}

fn displacement(point: Vec2, container: Rect, amount: f32) -> Vec2 {
    let angle = (direction(point, container) as f32).to_radians();
    Vec2::new(angle.cos(), angle.sin()) * amount
}

pub(crate) fn build(params: &Value, _rng: &mut dyn RngCore) -> Result<Effect> {
    resolve("noise", &json!({ "amount": 10.0 }), params).map(Effect::Noise)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::geometry::Bounds;

    #[test]
    fn direction_is_a_pure_function_of_position() {
        let container = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        assert_eq!(direction(Vec2::ZERO, container), 0);
        let a = direction(Vec2::new(12.0, 34.0), container);
        let b = direction(Vec2::new(12.0, 34.0), container);
        assert_eq!(a, b);
        assert_eq!(a, (12 * 73_856_093 ^ 34 * 19_349_663) % 10_000);
    }

    #[test]
    fn every_vertex_moves_by_amount() {
        let mut rng = StdRng::seed_from_u64(0);
        let container = Bounds::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut ctx = GenerationContext::new(&container, &mut rng);
        let original = Geometry::Rectangle(Rect::new(10.0, 10.0, 30.0, 20.0));
        let mut shape = Shape::new(original.clone());
        Noise { amount: 5.0 }.apply(&mut shape, &mut ctx);

        let moved = shape.geometry.vertices();
        for (before, after) in original.vertices().iter().zip(&moved) {
            assert!(((*after - *before).length() - 5.0).abs() < 1e-3);
        }
    }

    #[test]
    fn degenerate_container_does_not_divide_by_zero() {
        let container = Rect::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(direction(Vec2::new(5.0, 5.0), container), 0);
    }
}
