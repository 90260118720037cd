//! Random hue around a base value.
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Effect;
use crate::color::Color;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::geometry::Shape;
use crate::params::{resolve, to_object};
use crate::random::rand01;

/// Which part of the style a color effect paints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HueTarget {
    #[default]
    Fill,
    Stroke,
    FillStroke,
}

impl HueTarget {
    pub fn fills(self) -> bool {
        matches!(self, HueTarget::Fill | HueTarget::FillStroke)
    }

    pub fn strokes(self) -> bool {
        matches!(self, HueTarget::Stroke | HueTarget::FillStroke)
    }
}

/// Paints `hue ± hueRange / 2` with fixed saturation and brightness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomHue {
    pub target: HueTarget,
    pub stroke_width: f32,
    pub hue: f32,
    pub hue_range: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub alpha: f32,
}

impl RandomHue {
    /// Defaults with base hue, range and saturation drawn from `rng`.
    pub fn random(rng: &mut dyn RngCore) -> Self {
        Self {
            target: HueTarget::Fill,
            stroke_width: 1.0,
            hue: 360.0 * rand01(rng),
            hue_range: 100.0 * rand01(rng),
            saturation: 0.3 + 0.4 * rand01(rng),
            brightness: 1.0,
            alpha: 1.0,
        }
    }

    pub(crate) fn apply(&self, shape: &mut Shape, ctx: &mut GenerationContext<'_>) {
        let hue = self.hue + (rand01(ctx.rng) - 0.5) * self.hue_range;
        let color = Color::from_hsb(hue, self.saturation, self.brightness).with_alpha(self.alpha);
        if self.target.fills() {
            shape.style.fill = Some(color);
        }
        if self.target.strokes() {
            shape.style.stroke = Some(color);
            shape.style.stroke_width = self.stroke_width;
        }
    }
}

/// Template for `resolve`; the random draws come from [`RandomHue::random`].
fn defaults(rng: &mut dyn RngCore) -> Value {
    Value::Object(to_object(&RandomHue::random(rng)))
}

pub(crate) fn build(params: &Value, rng: &mut dyn RngCore) -> Result<Effect> {
    resolve("random-hue", &defaults(rng), params).map(Effect::RandomHue)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use serde_json::json;

    use super::*;
    use crate::geometry::{Bounds, Geometry, Rect};

    fn square() -> Shape {
        Shape::new(Geometry::Rectangle(Rect::new(0.0, 0.0, 10.0, 10.0)))
    }

    #[test]
    fn random_defaults_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let e = RandomHue::random(&mut rng);
            assert!((0.0..360.0).contains(&e.hue));
            assert!((0.0..100.0).contains(&e.hue_range));
            assert!((0.3..0.7).contains(&e.saturation));
        }
    }

    #[test]
    fn explicit_values_win_over_random_defaults() {
        let mut rng = StdRng::seed_from_u64(4);
        let Effect::RandomHue(e) = build(
            &json!({ "hue": 120, "hueRange": 0, "target": "fillStroke", "strokeWidth": 3 }),
            &mut rng,
        )
        .unwrap() else {
            panic!("expected random-hue");
        };
        assert_eq!(e.hue, 120.0);
        assert_eq!(e.hue_range, 0.0);
        assert_eq!(e.target, HueTarget::FillStroke);
        assert_eq!(e.stroke_width, 3.0);
    }

    #[test]
    fn paints_the_requested_targets() {
        let mut rng = StdRng::seed_from_u64(8);
        let container = Bounds::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut effect = RandomHue::random(&mut rng);
        effect.hue = 0.0;
        effect.hue_range = 0.0;
        effect.saturation = 1.0;
        effect.target = HueTarget::Stroke;
        effect.stroke_width = 2.5;

        let mut ctx = GenerationContext::new(&container, &mut rng);
        let mut shape = square();
        effect.apply(&mut shape, &mut ctx);
        assert_eq!(shape.style.fill, None);
        assert_eq!(shape.style.stroke.map(|c| c.to_hex()), Some("#ff0000".to_owned()));
        assert_eq!(shape.style.stroke_width, 2.5);
    }

    #[test]
    fn omitted_parameters_match_random_defaults() {
        let mut drawn = StdRng::seed_from_u64(21);
        let mut built = StdRng::seed_from_u64(21);
        let expected = RandomHue::random(&mut drawn);
        let Effect::RandomHue(e) = build(&json!({}), &mut built).unwrap() else {
            panic!("expected random-hue");
        };
        assert_eq!(e.target, expected.target);
        assert_eq!(e.stroke_width, expected.stroke_width);
        assert!((e.hue - expected.hue).abs() < 1e-3);
        assert!((e.hue_range - expected.hue_range).abs() < 1e-3);
        assert!((e.saturation - expected.saturation).abs() < 1e-4);
    }

    #[test]
    fn unknown_target_is_a_parameter_error() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(build(&json!({ "target": "outline" }), &mut rng).is_err());
    }
}
