//! Frame driver: pulls a bounded number of shapes from the root symbol per frame.
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing::{info, warn};

use crate::context::GenerationContext;
use crate::effects::ColorSampler;
use crate::error::Result;
use crate::geometry::{Bounds, Rect, Shape};
use crate::pattern::config::{Generation, PatternConfig};
use crate::pattern::events::{EventSink, PatternEvent, PatternEventKind};
use crate::symbol::SymbolTree;

/// Upper bound of `next` calls spent on a single pass by [`Pattern::run_pass`].
pub const MAX_PASS_STEPS: usize = 1_000_000;

/// Shapes produced by one frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub shapes: Vec<Shape>,
    /// The pass finished during this frame or earlier.
    pub finished: bool,
}

/// A pattern document turned into a running generator.
///
/// The root symbol fills a container of `size`. Each [`Pattern::frame`] call asks
/// the root for up to `nSymbolsPerFrame` shapes and stops early once the root
/// reports it has finished. Scheduling the next pass is left to the caller, see
/// [`Pattern::restart_delay`].
pub struct Pattern {
    config: PatternConfig,
    tree: SymbolTree,
    container: Bounds,
    rng: StdRng,
    sampler: Option<Box<dyn ColorSampler>>,
    pass: u64,
    emitted: usize,
    started: bool,
    done: bool,
}

impl Pattern {
    /// Build the tree of `config` and prepare its first pass.
    pub fn new(config: PatternConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let tree = SymbolTree::from_spec(&config.symbol, &mut rng)?;
        let mut pattern = Self {
            container: container_for(&config),
            config,
            tree,
            rng,
            sampler: None,
            pass: 0,
            emitted: 0,
            started: false,
            done: false,
        };
        pattern.restart();
        Ok(pattern)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::new(PatternConfig::from_json_str(text)?)
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    pub fn tree(&self) -> &SymbolTree {
        &self.tree
    }

    /// Mutable access for structural edits; call [`Pattern::restart`] afterwards.
    pub fn tree_mut(&mut self) -> &mut SymbolTree {
        &mut self.tree
    }

    pub fn container(&self) -> &Bounds {
        &self.container
    }

    /// Number of the current pass, starting at 1.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// Install the image read by `raster-scale` effects.
    pub fn set_sampler(&mut self, sampler: impl ColorSampler + 'static) {
        self.sampler = Some(Box::new(sampler));
    }

    pub fn clear_sampler(&mut self) {
        self.sampler = None;
    }

    /// How long to wait before restarting a finished pass; `None` in static mode.
    pub fn restart_delay(&self) -> Option<Duration> {
        match self.config.generation {
            Generation::Animation => Some(Duration::from_millis(self.config.speed)),
            Generation::Static => None,
        }
    }

    /// Start a new pass over a container rebuilt from the configured size.
    pub fn restart(&mut self) {
        self.container = container_for(&self.config);
        let root = self.tree.root();
        self.tree.reset(root, Some(&self.container), &mut self.rng);
        self.pass += 1;
        self.emitted = 0;
        self.started = false;
        self.done = false;
    }

    pub fn frame(&mut self) -> Frame {
        self.frame_with_events(&mut ())
    }

    /// Like [`Pattern::frame`], reporting pass boundaries and shapes to `sink`.
    pub fn frame_with_events(&mut self, sink: &mut dyn EventSink) -> Frame {
        let mut frame = Frame::default();
        for _ in 0..self.config.n_symbols_per_frame {
            if self.done {
                break;
            }
            if let Some(shape) = self.step(sink) {
                frame.shapes.push(shape);
            }
        }
        frame.finished = self.done;
        frame
    }

    /// Restart and generate a complete pass.
    ///
    /// Gives up after [`MAX_PASS_STEPS`] calls for trees that never finish.
    pub fn run_pass(&mut self) -> Vec<Shape> {
        self.run_pass_with_events(&mut ())
    }

    pub fn run_pass_with_events(&mut self, sink: &mut dyn EventSink) -> Vec<Shape> {
        self.restart();
        let mut shapes = Vec::new();
        for _ in 0..MAX_PASS_STEPS {
            if self.done {
                return shapes;
            }
            if let Some(shape) = self.step(sink) {
                shapes.push(shape);
            }
        }
        warn!(
            "Pass {} did not finish within {} steps; stopping.",
            self.pass, MAX_PASS_STEPS
        );
        if sink.wants(PatternEventKind::Warning) {
            sink.send(PatternEvent::Warning {
                context: format!("pass:{}", self.pass),
                message: format!("Pass did not finish within {MAX_PASS_STEPS} steps"),
            });
        }
        shapes
    }

    fn step(&mut self, sink: &mut dyn EventSink) -> Option<Shape> {
        if !self.started {
            self.start_pass(sink);
        }
        let root = self.tree.root();
        let mut positions = Vec::new();
        let mut ctx = GenerationContext::new(&self.container, &mut self.rng);
        ctx.sampler = self.sampler.as_deref();
        let shape = self.tree.next(root, &self.container, &mut positions, &mut ctx);

        if let Some(shape) = &shape {
            if sink.wants(PatternEventKind::ShapeEmitted) {
                sink.send(PatternEvent::ShapeEmitted {
                    pass: self.pass,
                    index: self.emitted,
                    shape: shape.clone(),
                });
            }
            self.emitted += 1;
        }
        if self.tree.has_finished(root) {
            self.finish_pass(sink);
        }
        shape
    }

    fn start_pass(&mut self, sink: &mut dyn EventSink) {
        self.started = true;
        info!(
            "Pass {}: '{}' | container: {}x{}.",
            self.pass,
            self.tree.tag(self.tree.root()).unwrap_or_default(),
            self.config.size.width,
            self.config.size.height,
        );
        if self.sampler.is_none() && self.tree.uses_effect("raster-scale") {
            warn!("Pattern uses 'raster-scale' but no image is loaded; shapes keep their size.");
            if sink.wants(PatternEventKind::Warning) {
                sink.send(PatternEvent::Warning {
                    context: "raster-scale".into(),
                    message: "No image loaded; shapes keep their size".into(),
                });
            }
        }
        if sink.wants(PatternEventKind::PassStarted) {
            sink.send(PatternEvent::PassStarted {
                pass: self.pass,
                container: self.container.rect(),
            });
        }
    }

    fn finish_pass(&mut self, sink: &mut dyn EventSink) {
        self.done = true;
        info!("Pass {} finished | shapes: {}.", self.pass, self.emitted);
        if sink.wants(PatternEventKind::PassFinished) {
            sink.send(PatternEvent::PassFinished {
                pass: self.pass,
                shapes: self.emitted,
            });
        }
    }

    /// Replace the pattern by the document in `text`.
    ///
    /// The document is parsed and built before anything is swapped; on error the
    /// running pattern is kept untouched and the error is returned.
    pub fn apply_source(&mut self, text: &str) -> Result<()> {
        let built = PatternConfig::from_json_str(text).and_then(|config| {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => self.rng.clone(),
            };
            let tree = SymbolTree::from_spec(&config.symbol, &mut rng)?;
            Ok((config, tree, rng))
        });
        match built {
            Ok((config, tree, rng)) => {
                self.config = config;
                self.tree = tree;
                self.rng = rng;
                self.restart();
                Ok(())
            }
            Err(err) => {
                warn!("Ignoring edited document: {}.", err);
                Err(err)
            }
        }
    }

    /// The current document, with the root symbol serialized from the live tree.
    pub fn to_json(&self) -> Result<Value> {
        let mut value = serde_json::to_value(&self.config)?;
        if let Value::Object(map) = &mut value {
            map.insert("symbol".into(), self.tree.to_root_json());
        }
        Ok(value)
    }
}

fn container_for(config: &PatternConfig) -> Bounds {
    Bounds::new(Rect::new(0.0, 0.0, config.size.width, config.size.height))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::color::Color;
    use crate::effects::FnSampler;
    use crate::params::TypedSpec;
    use crate::pattern::events::VecSink;

    fn config(symbol: Value) -> PatternConfig {
        let spec: TypedSpec = serde_json::from_value(symbol).unwrap();
        PatternConfig::new(spec).with_seed(11)
    }

    #[test]
    fn frames_are_bounded_and_stop_at_the_end_of_a_pass() {
        let mut pattern = Pattern::new(
            config(json!({ "type": "grid", "parameters": { "width": 5, "height": 5 } }))
                .with_symbols_per_frame(10),
        )
        .unwrap();
        let sizes: Vec<usize> = (0..4).map(|_| pattern.frame().shapes.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5, 0]);
        assert!(pattern.is_finished());

        pattern.restart();
        assert_eq!(pattern.pass(), 2);
        assert_eq!(pattern.frame().shapes.len(), 10);
    }

    #[test]
    fn events_mark_pass_boundaries() {
        let mut pattern =
            Pattern::new(config(json!({ "type": "line", "parameters": { "nSymbolsToCreate": 4 } })))
                .unwrap();
        let mut sink = VecSink::new();
        let frame = pattern.frame_with_events(&mut sink);
        assert!(frame.finished);
        let kinds: Vec<PatternEventKind> = sink.as_slice().iter().map(PatternEvent::kind).collect();
        assert_eq!(kinds.first(), Some(&PatternEventKind::PassStarted));
        assert_eq!(kinds.last(), Some(&PatternEventKind::PassFinished));
        let emitted = kinds
            .iter()
            .filter(|kind| **kind == PatternEventKind::ShapeEmitted)
            .count();
        assert_eq!(emitted, 4);
    }

    #[test]
    fn same_seed_same_pattern() {
        let run = || {
            let mut pattern = Pattern::new(PatternConfig::default().with_seed(5)).unwrap();
            pattern.run_pass()
        };
        let first = run();
        assert_eq!(first.len(), 100);
        assert_eq!(first, run());
    }

    #[test]
    fn restart_delay_follows_generation_mode() {
        let animated = Pattern::new(PatternConfig::default().with_seed(1).with_speed(250)).unwrap();
        assert_eq!(animated.restart_delay(), Some(Duration::from_millis(250)));
        let still = Pattern::new(
            PatternConfig::default()
                .with_seed(1)
                .with_generation(Generation::Static),
        )
        .unwrap();
        assert_eq!(still.restart_delay(), None);
    }

    #[test]
    fn rejected_source_keeps_the_running_pattern() {
        let mut pattern = Pattern::new(config(json!({ "type": "quadtree" }))).unwrap();
        let before = pattern.to_json().unwrap();
        assert!(pattern.apply_source("{ \"symbol\": { \"type\": \"hexagon\" } }").is_err());
        assert!(pattern
            .apply_source(r#"{ "symbol": { "type": "line", "parameters": { "symbol": { "type": "nope" } } } }"#)
            .is_err());
        assert!(pattern.apply_source("{").is_err());
        assert_eq!(pattern.to_json().unwrap(), before);

        pattern
            .apply_source(r#"{ "seed": 3, "symbol": { "type": "column" } }"#)
            .unwrap();
        assert_eq!(pattern.tree().tag(pattern.tree().root()), Some("placer-y"));
        assert_eq!(pattern.run_pass().len(), 3);
    }

    #[test]
    fn oversized_grid_source_is_rejected() {
        let mut pattern = Pattern::new(config(json!({ "type": "grid" }))).unwrap();
        let before = pattern.to_json().unwrap();
        for tag in ["noise-grid", "recursive"] {
            let source = json!({
                "symbol": { "type": tag, "parameters": { "width": 70000, "height": 70000 } }
            });
            assert!(pattern.apply_source(&source.to_string()).is_err());
        }
        assert_eq!(pattern.to_json().unwrap(), before);
    }

    #[test]
    fn unseeded_patterns_draw_from_entropy() {
        let spec: TypedSpec = serde_json::from_value(json!({ "type": "grid" })).unwrap();
        let mut first = Pattern::new(PatternConfig::new(spec.clone())).unwrap();
        let mut second = Pattern::new(PatternConfig::new(spec)).unwrap();
        assert_eq!(first.run_pass().len(), second.run_pass().len());
        assert!(first.config().seed.is_none());
    }

    #[test]
    fn missing_sampler_is_reported_once_per_pass() {
        let mut pattern = Pattern::new(config(json!({
            "type": "rectangle",
            "parameters": { "effects": [{ "type": "raster-scale" }] }
        })))
        .unwrap();
        let mut sink = VecSink::only(&[PatternEventKind::Warning]);
        let shapes = pattern.run_pass_with_events(&mut sink);
        assert_eq!(shapes[0].bounding_rect().width, 1000.0);
        assert_eq!(sink.len(), 1);

        pattern.set_sampler(FnSampler(|_: mint::Point2<f32>| {
            Some(Color::rgb(0.75, 0.75, 0.75))
        }));
        let mut sink = VecSink::only(&[PatternEventKind::Warning]);
        let shapes = pattern.run_pass_with_events(&mut sink);
        assert!(sink.is_empty());
        assert!((shapes[0].bounding_rect().width - 250.0).abs() < 1e-2);
    }

    #[test]
    fn document_round_trips_through_json() {
        let pattern = Pattern::new(PatternConfig::default().with_seed(2)).unwrap();
        let json = pattern.to_json().unwrap();
        assert_eq!(json["symbol"]["type"], json!("placer-xyz"));
        assert_eq!(json["symbol"]["parameters"]["width"], json!(10));
        let reread = Pattern::from_json_str(&json.to_string()).unwrap();
        assert_eq!(reread.to_json().unwrap(), json);
    }
}
