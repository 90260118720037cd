//! Root document of a pattern.
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::params::TypedSpec;
use crate::symbol::is_known_tag;

/// Whether a finished pass is followed by a new one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Generation {
    /// Restart `speed` milliseconds after a pass finished.
    #[default]
    Animation,
    /// Stop after one pass.
    Static,
}

/// Size of the container, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A pattern document: driver settings plus the root symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternConfig {
    pub generation: Generation,
    /// Delay between two passes in animation mode, in milliseconds.
    pub speed: u64,
    /// Upper bound of `next` calls per frame.
    pub n_symbols_per_frame: usize,
    pub size: Size,
    /// Hint for renderers: the canvas may be cached as an image between frames.
    pub optimize_with_raster: bool,
    /// Seed of the pattern's generator. A fresh seed is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub symbol: TypedSpec,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            generation: Generation::Animation,
            speed: 500,
            n_symbols_per_frame: 100,
            size: Size::new(1000.0, 1000.0),
            optimize_with_raster: false,
            seed: None,
            symbol: default_symbol(),
        }
    }
}

/// A 10 by 10 grid of nested circles and squares painted from a small palette.
fn default_symbol() -> TypedSpec {
    TypedSpec::new(
        "placer-xyz",
        json!({
            "width": 10,
            "height": 10,
            "nSymbolsToCreate": 1,
            "scale": 0.2,
            "margin": true,
            "symbol": {
                "type": "random-shape",
                "parameters": {
                    "shapeProbabilities": [
                        { "weight": 1, "type": "circle", "parameters": { "radius": 1 } },
                        { "weight": 1, "type": "rectangle", "parameters": { "width": 1, "height": 1 } }
                    ],
                    "effects": [{
                        "type": "random-palette",
                        "parameters": { "palette": ["red", "blue", "green", "black"] }
                    }]
                }
            }
        }),
    )
}

impl PatternConfig {
    /// Creates a configuration around `symbol` with default driver settings.
    pub fn new(symbol: TypedSpec) -> Self {
        Self {
            symbol,
            ..Default::default()
        }
    }

    /// Parses a pattern document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_speed(mut self, speed: u64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_symbols_per_frame(mut self, n_symbols_per_frame: usize) -> Self {
        self.n_symbols_per_frame = n_symbols_per_frame;
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn with_optimize_with_raster(mut self, optimize_with_raster: bool) -> Self {
        self.optimize_with_raster = optimize_with_raster;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_symbol(mut self, symbol: TypedSpec) -> Self {
        self.symbol = symbol;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    ///
    /// Only the root tag is checked here; the rest of the tree is validated when it
    /// is built.
    pub fn validate(&self) -> Result<()> {
        if self.n_symbols_per_frame == 0 {
            return Err(Error::InvalidConfig(
                "nSymbolsPerFrame must be at least 1".into(),
            ));
        }
        let Size { width, height } = self.size;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidConfig(
                "size must be > 0 in both components".into(),
            ));
        }
        if !is_known_tag(&self.symbol.tag) {
            return Err(Error::UnknownType {
                tag: self.symbol.tag.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_the_stock_document() {
        let config = PatternConfig::default();
        assert_eq!(config.generation, Generation::Animation);
        assert_eq!(config.speed, 500);
        assert_eq!(config.n_symbols_per_frame, 100);
        assert_eq!(config.size, Size::new(1000.0, 1000.0));
        assert_eq!(config.symbol.tag, "placer-xyz");
        config.validate().unwrap();
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = PatternConfig::from_json_str(
            r#"{ "generation": "static", "symbol": { "type": "quadtree" } }"#,
        )
        .unwrap();
        assert_eq!(config.generation, Generation::Static);
        assert_eq!(config.speed, 500);
        assert_eq!(config.symbol, TypedSpec::bare("quadtree"));
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(PatternConfig::default().with_seed(9)).unwrap();
        assert_eq!(value["nSymbolsPerFrame"], json!(100));
        assert_eq!(value["optimizeWithRaster"], json!(false));
        assert_eq!(value["generation"], json!("animation"));
        assert_eq!(value["seed"], json!(9));
        let without_seed = serde_json::to_value(PatternConfig::default()).unwrap();
        assert!(without_seed.get("seed").is_none());
    }

    #[test]
    fn validate_rejects_bad_settings() {
        assert!(PatternConfig::default()
            .with_symbols_per_frame(0)
            .validate()
            .is_err());
        assert!(PatternConfig::default()
            .with_size(0.0, 10.0)
            .validate()
            .is_err());
        assert!(matches!(
            PatternConfig::new(TypedSpec::bare("hexagon")).validate(),
            Err(Error::UnknownType { .. })
        ));
        assert!(PatternConfig::from_json_str("{ not json").is_err());
    }
}
