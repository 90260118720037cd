use glam::Vec2;
use pattern_symbols::prelude::*;
use pattern_symbols_examples::{init_tracing, render_shapes_to_png, RenderConfig};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let symbol = json!({
        "type": "quadtree",
        "parameters": {
            "probabilityToDivide": 0.6,
            "maxDepth": 6,
            "effects": [{ "type": "three-stripes" }],
            "symbol": {
                "type": "scaler",
                "parameters": {
                    "nSymbolsToCreate": 3,
                    "scale": 0.3,
                    "symbol": { "type": "circle", "parameters": { "radius": 0.9 } }
                }
            }
        }
    });
    let config = PatternConfig::new(serde_json::from_value(symbol)?)
        .with_generation(Generation::Static)
        .with_size(800.0, 800.0)
        .with_seed(7);
    let size = Vec2::new(config.size.width, config.size.height);
    let mut pattern = Pattern::new(config)?;

    let shapes = pattern.run_pass();
    render_shapes_to_png(
        &shapes,
        &RenderConfig::new((800, 800), size).with_background([20, 20, 30]),
        "patterns-quadtree-stripes.png",
    )?;
    Ok(())
}
