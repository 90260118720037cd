//! Uniform pick from a user palette.
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::Effect;
use crate::color::Color;
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::geometry::Shape;
use crate::params::resolve;
use crate::random::rand01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomPalette {
    pub alpha: f32,
    palette: Vec<String>,
    #[serde(skip)]
    colors: Vec<Color>,
}

impl RandomPalette {
    pub fn new(alpha: f32, palette: Vec<String>) -> Result<Self> {
        let colors = parse_palette(&palette)?;
        Ok(Self {
            alpha,
            palette,
            colors,
        })
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Append a random fully saturated, fully bright color, stored as `rgb(r,g,b)`.
    pub fn add_color(&mut self, rng: &mut dyn RngCore) -> Color {
        let color = Color::from_hsb(360.0 * rand01(rng), 1.0, 1.0);
        self.palette.push(color.to_css());
        self.colors.push(color);
        debug!("Palette grew to {} colors.", self.colors.len());
        color
    }

    pub fn remove_last_color(&mut self) -> Option<Color> {
        self.palette.pop();
        self.colors.pop()
    }

    pub(crate) fn apply(&self, shape: &mut Shape, ctx: &mut GenerationContext<'_>) {
        let color = if self.colors.is_empty() {
            Color::BLACK
        } else {
            let index = (rand01(ctx.rng) * self.colors.len() as f32) as usize;
            self.colors[index.min(self.colors.len() - 1)]
        };
        shape.style.fill = Some(color.with_alpha(self.alpha));
    }
}

fn parse_palette(palette: &[String]) -> Result<Vec<Color>> {
    palette
        .iter()
        .map(|entry| {
            Color::parse(entry).map_err(|err| {
                Error::parameter("random-palette", format!("unparseable color '{entry}': {err}"))
            })
        })
        .collect()
}

pub(crate) fn build(params: &Value, _rng: &mut dyn RngCore) -> Result<Effect> {
    let defaults = json!({ "alpha": 1.0, "palette": ["black"] });
    let RandomPalette { alpha, palette, .. } = resolve("random-palette", &defaults, params)?;
    RandomPalette::new(alpha, palette).map(Effect::RandomPalette)
}
