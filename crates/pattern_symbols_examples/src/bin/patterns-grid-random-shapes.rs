use glam::Vec2;
use pattern_symbols::prelude::*;
use pattern_symbols_examples::{init_tracing, render_shapes_to_png, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();
    // The stock document: a 10 by 10 grid of circles and squares from a palette.
    let config = PatternConfig::default()
        .with_generation(Generation::Static)
        .with_seed(42);
    let size = Vec2::new(config.size.width, config.size.height);
    let mut pattern = Pattern::new(config)?;

    let shapes = pattern.run_pass();
    render_shapes_to_png(
        &shapes,
        &RenderConfig::new((1000, 1000), size),
        "patterns-grid-random-shapes.png",
    )?;
    Ok(())
}
