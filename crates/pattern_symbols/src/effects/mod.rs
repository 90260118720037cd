//! Appearance effects applied to emitted shapes.
//!
//! An effect is a pure strategy over `(shape, positions, container)`: it paints or
//! deforms a freshly produced [`Shape`]. Effects are attached to symbol nodes as an
//! ordered list and applied in order, so a later effect overrides what an earlier
//! one painted. They are looked up by tag in a static registry.
pub mod hue;
pub mod noise;
pub mod palette;
pub mod raster;
pub mod stripes;
pub mod transform;

use rand::RngCore;
use serde_json::Value;

pub use hue::{HueTarget, RandomHue};
pub use noise::Noise;
pub use palette::RandomPalette;
pub use raster::{ColorSampler, FnSampler, RasterScale};
pub use stripes::ThreeStripes;
pub use transform::{Smooth, Transform};

use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::geometry::Shape;
use crate::params::{to_object, TypedSpec};

/// Tag of the effect materialized when no node in a chain carries one.
pub const FALLBACK_EFFECT: &str = "random-hue";

type BuildEffect = fn(&Value, &mut dyn RngCore) -> Result<Effect>;

struct EffectEntry {
    tag: &'static str,
    build: BuildEffect,
}

static EFFECT_REGISTRY: &[EffectEntry] = &[
    EffectEntry {
        tag: "random-hue",
        build: hue::build,
    },
    EffectEntry {
        tag: "random-palette",
        build: palette::build,
    },
    EffectEntry {
        tag: "three-stripes",
        build: stripes::build,
    },
    EffectEntry {
        tag: "noise",
        build: noise::build,
    },
    EffectEntry {
        tag: "transform",
        build: transform::build_transform,
    },
    EffectEntry {
        tag: "smooth",
        build: transform::build_smooth,
    },
    EffectEntry {
        tag: "raster-scale",
        build: raster::build,
    },
];

/// All registered effect tags, in registration order.
pub fn effect_tags() -> impl Iterator<Item = &'static str> {
    EFFECT_REGISTRY.iter().map(|entry| entry.tag)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    RandomHue(RandomHue),
    RandomPalette(RandomPalette),
    ThreeStripes(ThreeStripes),
    Noise(Noise),
    Transform(Transform),
    Smooth(Smooth),
    RasterScale(RasterScale),
}

impl Effect {
    /// Build an effect from its tag and (possibly partial) parameters.
    pub fn create(tag: &str, parameters: &Value, rng: &mut dyn RngCore) -> Result<Self> {
        let entry = EFFECT_REGISTRY
            .iter()
            .find(|entry| entry.tag == tag)
            .ok_or_else(|| Error::UnknownEffect {
                tag: tag.to_owned(),
            })?;
        (entry.build)(parameters, rng)
    }

    pub fn from_spec(spec: &TypedSpec, rng: &mut dyn RngCore) -> Result<Self> {
        Self::create(&spec.tag, &spec.parameters, rng)
    }

    pub fn from_value(value: &Value, rng: &mut dyn RngCore) -> Result<Self> {
        let spec: TypedSpec = serde_json::from_value(value.clone())?;
        Self::from_spec(&spec, rng)
    }

    /// The fallback effect with freshly drawn random defaults.
    pub fn fallback(rng: &mut dyn RngCore) -> Self {
        Effect::RandomHue(RandomHue::random(rng))
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Effect::RandomHue(_) => "random-hue",
            Effect::RandomPalette(_) => "random-palette",
            Effect::ThreeStripes(_) => "three-stripes",
            Effect::Noise(_) => "noise",
            Effect::Transform(_) => "transform",
            Effect::Smooth(_) => "smooth",
            Effect::RasterScale(_) => "raster-scale",
        }
    }

    /// Fully resolved parameters, defaults included.
    pub fn parameters(&self) -> Value {
        let map = match self {
            Effect::RandomHue(e) => to_object(e),
            Effect::RandomPalette(e) => to_object(e),
            Effect::ThreeStripes(e) => to_object(e),
            Effect::Noise(e) => to_object(e),
            Effect::Transform(e) => to_object(e),
            Effect::Smooth(e) => to_object(e),
            Effect::RasterScale(e) => to_object(e),
        };
        Value::Object(map)
    }

    pub fn to_spec(&self) -> TypedSpec {
        TypedSpec::new(self.tag(), self.parameters())
    }

    pub fn to_json(&self) -> Value {
        self.to_spec().to_value()
    }

    pub fn apply(&self, shape: &mut Shape, positions: &[f32], ctx: &mut GenerationContext<'_>) {
        match self {
            Effect::RandomHue(e) => e.apply(shape, ctx),
            Effect::RandomPalette(e) => e.apply(shape, ctx),
            Effect::ThreeStripes(e) => e.apply(shape, positions),
            Effect::Noise(e) => e.apply(shape, ctx),
            Effect::Transform(e) => e.apply(shape),
            Effect::Smooth(e) => e.apply(shape),
            Effect::RasterScale(e) => e.apply(shape, ctx),
        }
    }
}

/// Parse the effect list of a node.
///
/// Accepts an array of `{type, parameters}` records, or a single record as found in
/// older documents under the `colors` key.
pub fn parse_effects(value: &Value, rng: &mut dyn RngCore) -> Result<Vec<Effect>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| Effect::from_value(item, rng))
            .collect(),
        Value::Object(_) => Ok(vec![Effect::from_value(value, rng)?]),
        other => Err(Error::InvalidConfig(format!(
            "effects must be an array or an object, got {other}"
        ))),
    }
}

/// Apply `effects` in order.
pub fn apply_all(
    effects: &[Effect],
    shape: &mut Shape,
    positions: &[f32],
    ctx: &mut GenerationContext<'_>,
) {
    for effect in effects {
        effect.apply(shape, positions, ctx);
    }
}
