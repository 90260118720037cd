use glam::Vec2;
use pattern_symbols::prelude::*;
use pattern_symbols_examples::{init_tracing, render_shapes_to_png, RenderConfig};
use serde_json::json;

/// Radial gradient standing in for a loaded photo: dark in the middle, bright at the rim.
fn radial_gradient(size: Vec2) -> impl Fn(mint::Point2<f32>) -> Option<Color> {
    move |point: mint::Point2<f32>| {
        let offset = Vec2::from(point) - size / 2.0;
        let t = (offset.length() / (size.min_element() / 2.0)).min(1.0);
        Some(Color::rgb(t, t, t))
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let symbol = json!({
        "type": "grid",
        "parameters": {
            "width": 40,
            "height": 40,
            "symbol": {
                "type": "circle",
                "parameters": {
                    "effects": [
                        { "type": "random-palette", "parameters": { "palette": ["#1b1b1b"] } },
                        { "type": "raster-scale", "parameters": { "invert": true, "amount": 1.0 } }
                    ]
                }
            }
        }
    });
    let config = PatternConfig::new(serde_json::from_value(symbol)?)
        .with_generation(Generation::Static)
        .with_seed(1);
    let size = Vec2::new(config.size.width, config.size.height);
    let mut pattern = Pattern::new(config)?;
    pattern.set_sampler(FnSampler(radial_gradient(size)));

    let shapes = pattern.run_pass();
    render_shapes_to_png(
        &shapes,
        &RenderConfig::new((1000, 1000), size),
        "patterns-raster-halftone.png",
    )?;
    Ok(())
}
