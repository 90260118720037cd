use std::thread;

use glam::Vec2;
use pattern_symbols::prelude::*;
use pattern_symbols_examples::{init_tracing, render_shapes_to_png, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let symbol = json!({
        "type": "irregular-column",
        "parameters": {
            "min": 4,
            "max": 9,
            "variation": 0.9,
            "symbol": {
                "type": "random-line",
                "parameters": {
                    "min": 3,
                    "max": 8,
                    "symbol": {
                        "type": "random",
                        "parameters": {
                            "shapeProbabilities": [
                                { "weight": 3, "type": "rectangle", "parameters": { "width": 0.9, "height": 0.9 } },
                                { "weight": 2, "type": "polygon-on-box", "parameters": { "vertexNames": ["topLeft", "topRight", "bottomCenter"] } },
                                { "weight": 1, "type": "circle", "parameters": { "startAngle": 0, "endAngle": 180 } }
                            ]
                        }
                    }
                }
            }
        }
    });
    let config = PatternConfig::new(serde_json::from_value(symbol)?)
        .with_speed(200)
        .with_symbols_per_frame(8)
        .with_size(600.0, 600.0)
        .with_seed(99);
    let size = Vec2::new(config.size.width, config.size.height);
    let mut pattern = Pattern::new(config)?;

    // Widen the rows between passes through the property inspector.
    let root = pattern.tree().root();
    let mut frames = 0;
    for pass in 1..=3 {
        let mut shapes = Vec::new();
        let mut sink = FnSink::new(|event| {
            if let PatternEvent::PassFinished { pass, shapes } = event {
                info!("Animation pass {} produced {} shapes.", pass, shapes);
            }
        });
        loop {
            let frame = pattern.frame_with_events(&mut sink);
            frames += 1;
            shapes.extend(frame.shapes);
            if frame.finished {
                break;
            }
        }
        render_shapes_to_png(
            &shapes,
            &RenderConfig::new((600, 600), size),
            format!("patterns-animation-pass-{pass}.png"),
        )?;

        let Some(&line) = pattern.tree().children(root).first() else {
            anyhow::bail!("irregular column has no child line");
        };
        let mut rng = StdRng::seed_from_u64(pass);
        pattern
            .tree_mut()
            .set_property(line, "max", json!(8 + pass * 4), &mut rng)?;
        if let Some(delay) = pattern.restart_delay() {
            thread::sleep(delay);
        }
        pattern.restart();
    }
    info!("Rendered 3 passes in {} frames.", frames);
    Ok(())
}
