//! Probabilistic recursive subdivision (quadtree and recursive placer).
//!
//! Both placers keep an explicit stack of suspended frames instead of recursing.
//! A frame is a divided rectangle plus the index of the cell currently being
//! visited. Descending pushes frames until a cell is not divided any more; that
//! cell becomes the leaf handed to the child. When the child finishes, frames are
//! popped until one still has unvisited cells, whose next cell is descended into.
//! The pass ends when the stack runs empty.
use rand::RngCore;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Rect};
use crate::params::{resolve, tidy_floats, TypedSpec};
use crate::placer::linear::default_symbol;
use crate::placer::{check_grid_side, MAX_GRID_SIDE};
use crate::random::rand01;
use crate::symbol::{NodeId, SymbolKind, SymbolTree};

/// Probability of dividing a cell at stack depth `d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DivisionRule {
    /// `probabilityToDivide` at every depth.
    Flat,
    /// The root always divides; below it `probabilityToDivide / d`.
    Decaying,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Frame {
    rect: Rect,
    cursor: u32,
}

#[derive(Clone, Debug)]
pub struct Subdivision {
    rule: DivisionRule,
    columns: u32,
    rows: u32,
    probability: f32,
    max_depth: u32,
    stack: Vec<Frame>,
    leaf: Option<Rect>,
    done: bool,
    pub(crate) child: NodeId,
}

impl Subdivision {
    /// Grid sides are clamped to `1..=`[`MAX_GRID_SIDE`].
    pub fn new(
        rule: DivisionRule,
        (columns, rows): (u32, u32),
        probability: f32,
        max_depth: u32,
        child: NodeId,
    ) -> Self {
        Self {
            rule,
            columns: columns.clamp(1, MAX_GRID_SIDE),
            rows: rows.clamp(1, MAX_GRID_SIDE),
            probability,
            max_depth,
            stack: Vec::new(),
            leaf: None,
            done: false,
            child,
        }
    }

    pub fn rule(&self) -> DivisionRule {
        self.rule
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    /// Number of currently suspended frames.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.done
    }

    fn cells(&self) -> u32 {
        self.columns * self.rows
    }

    fn cell(&self, rect: Rect, index: u32) -> Rect {
        rect.cell(
            self.columns,
            self.rows,
            index % self.columns,
            index / self.columns,
        )
    }

    fn should_divide(&self, rng: &mut dyn RngCore) -> bool {
        let depth = self.stack.len();
        if depth >= self.max_depth as usize {
            return false;
        }
        match self.rule {
            DivisionRule::Flat => rand01(rng) < self.probability,
            DivisionRule::Decaying => depth == 0 || rand01(rng) < self.probability / depth as f32,
        }
    }

    fn descend(&mut self, mut rect: Rect, rng: &mut dyn RngCore) {
        while self.should_divide(rng) {
            self.stack.push(Frame { rect, cursor: 0 });
            rect = self.cell(rect, 0);
        }
        self.leaf = Some(rect);
    }

    pub(crate) fn ensure_started(&mut self, bounds: &Bounds, rng: &mut dyn RngCore) {
        if self.leaf.is_none() && !self.done {
            self.stack.clear();
            self.descend(bounds.rect(), rng);
        }
    }

    /// Leaf the child currently works on.
    pub(crate) fn leaf_bounds(&self) -> Option<Bounds> {
        self.leaf.map(Bounds::new)
    }

    /// Depth and cursor of the innermost frame, as fractions.
    pub(crate) fn positions(&self) -> [f32; 2] {
        let depth = self.stack.len() as f32 / self.max_depth.max(1) as f32;
        let cursor = self
            .stack
            .last()
            .map_or(0.0, |frame| frame.cursor as f32 / self.cells() as f32);
        [depth, cursor]
    }

    /// Leave the finished leaf and descend into the next unvisited cell.
    pub(crate) fn advance(&mut self, rng: &mut dyn RngCore) {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.leaf = None;
                self.done = true;
                return;
            };
            frame.cursor += 1;
            let (rect, cursor) = (frame.rect, frame.cursor);
            if cursor < self.cells() {
                let next = self.cell(rect, cursor);
                self.descend(next, rng);
                return;
            }
            self.stack.pop();
        }
    }

    pub(crate) fn restart(&mut self, bounds: Option<&Bounds>, rng: &mut dyn RngCore) {
        self.stack.clear();
        self.leaf = None;
        self.done = false;
        if let Some(bounds) = bounds {
            self.ensure_started(bounds, rng);
        }
    }

    pub(crate) fn parameters(&self) -> Map<String, Value> {
        let value = match self.rule {
            DivisionRule::Flat => json!({
                "probabilityToDivide": self.probability,
                "maxDepth": self.max_depth,
            }),
            DivisionRule::Decaying => json!({
                "width": self.columns,
                "height": self.rows,
                "probabilityToDivide": self.probability,
                "maxDepth": self.max_depth,
            }),
        };
        match tidy_floats(value) {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuadtreeSpec {
    probability_to_divide: f32,
    max_depth: u32,
    symbol: TypedSpec,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecursiveSpec {
    width: u32,
    height: u32,
    probability_to_divide: f32,
    max_depth: u32,
    symbol: TypedSpec,
}

fn check_probability(tag: &str, probability: f32) -> Result<()> {
    if probability < 0.0 || !probability.is_finite() {
        return Err(Error::parameter(
            tag,
            "probabilityToDivide must be a non-negative number",
        ));
    }
    Ok(())
}

pub(crate) fn build_quadtree(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({
        "probabilityToDivide": 0.5,
        "maxDepth": 4,
        "symbol": default_symbol(),
    });
    let spec: QuadtreeSpec = resolve("quadtree", &defaults, params)?;
    check_probability("quadtree", spec.probability_to_divide)?;
    let child = tree.build_child(&spec.symbol, id, rng)?;
    Ok(SymbolKind::Subdivision(Subdivision::new(
        DivisionRule::Flat,
        (2, 2),
        spec.probability_to_divide,
        spec.max_depth,
        child,
    )))
}

pub(crate) fn build_recursive(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({
        "width": 2,
        "height": 2,
        "probabilityToDivide": 1.0,
        "maxDepth": 4,
        "symbol": default_symbol(),
    });
    let spec: RecursiveSpec = resolve("recursive", &defaults, params)?;
    check_probability("recursive", spec.probability_to_divide)?;
    if spec.width == 0 || spec.height == 0 {
        return Err(Error::parameter("recursive", "width and height must be at least 1"));
    }
    check_grid_side("recursive", spec.width, spec.height)?;
    let child = tree.build_child(&spec.symbol, id, rng)?;
    Ok(SymbolKind::Subdivision(Subdivision::new(
        DivisionRule::Decaying,
        (spec.width, spec.height),
        spec.probability_to_divide,
        spec.max_depth,
        child,
    )))
}
