use glam::Vec2;
use pattern_symbols::prelude::*;
use pattern_symbols_examples::{init_tracing, render_shapes_to_png, RenderConfig};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Each triangle is painted once, then shrunk and smoothed for a second layer.
    let symbol = json!({
        "type": "noise-grid",
        "parameters": {
            "width": 12,
            "height": 12,
            "noise": 0.8,
            "symbol": {
                "type": "placer",
                "parameters": {
                    "nSymbolsToCreate": 1,
                    "symbol": {
                        "type": "bounds",
                        "parameters": {
                            "effects": [
                                { "type": "random-hue", "parameters": { "hue": 200, "hueRange": 60, "target": "fillStroke" } },
                                { "type": "transform", "parameters": { "scaleX": 0.8, "scaleY": 0.8 } },
                                { "type": "smooth", "parameters": { "iterations": 3 } }
                            ]
                        }
                    }
                }
            }
        }
    });
    let config = PatternConfig::new(serde_json::from_value(symbol)?)
        .with_generation(Generation::Static)
        .with_seed(3);
    let size = Vec2::new(config.size.width, config.size.height);
    let mut pattern = Pattern::new(config)?;

    let shapes = pattern.run_pass();
    render_shapes_to_png(
        &shapes,
        &RenderConfig::new((1000, 1000), size).with_background([250, 248, 240]),
        "patterns-noise-grid.png",
    )?;
    Ok(())
}
