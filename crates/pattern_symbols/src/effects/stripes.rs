//! Color derived from the positions vector.
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Effect;
use crate::color::Color;
use crate::error::Result;
use crate::geometry::Shape;
use crate::params::resolve;

/// Maps the first three progress fractions to hue, saturation and brightness.
///
/// A missing entry maps its channel to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreeStripes {}

impl ThreeStripes {
    pub fn color_for(positions: &[f32]) -> Color {
        let hue = positions.first().map_or(0.0, |p| p * 255.0);
        let saturation = positions.get(1).map_or(0.0, |p| 0.75 + p * 0.25);
        let brightness = positions.get(2).map_or(0.0, |p| 0.75 + p * 0.25);
        Color::from_hsb(hue, saturation, brightness)
    }

    pub(crate) fn apply(&self, shape: &mut Shape, positions: &[f32]) {
        shape.style.fill = Some(Self::color_for(positions));
    }
}

pub(crate) fn build(params: &Value, _rng: &mut dyn RngCore) -> Result<Effect> {
    resolve("three-stripes", &json!({}), params).map(Effect::ThreeStripes)
}
