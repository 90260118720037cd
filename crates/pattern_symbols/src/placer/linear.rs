//! Constructors of the linear placer family.
use rand::RngCore;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{Error, Result};
use crate::params::{resolve, TypedSpec};
use crate::placer::{Axis, Layout, Placer};
use crate::symbol::{NodeId, SymbolKind, SymbolTree};

pub(crate) fn default_symbol() -> Value {
    json!({ "type": "rectangle", "parameters": {} })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountParams {
    n_symbols_to_create: u32,
    symbol: TypedSpec,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepthParams {
    n_symbols_to_create: u32,
    scale: f32,
    margin: bool,
    symbol: TypedSpec,
}

#[derive(Deserialize)]
struct RangeParams {
    min: u32,
    max: u32,
    #[serde(default)]
    variation: f32,
    symbol: TypedSpec,
}

fn counted(
    tag: &str,
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
    layout: Layout,
) -> Result<SymbolKind> {
    let defaults = json!({ "nSymbolsToCreate": 3, "symbol": default_symbol() });
    let p: CountParams = resolve(tag, &defaults, params)?;
    if p.n_symbols_to_create == 0 {
        warn!("Placer '{}' creates no symbols; it finishes immediately.", tag);
    }
    let child = tree.build_child(&p.symbol, id, rng)?;
    Ok(SymbolKind::Placer(Placer::new(
        layout,
        p.n_symbols_to_create,
        child,
    )))
}

pub(crate) fn build_repeat(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    counted("placer", tree, id, params, rng, Layout::Repeat)
}

pub(crate) fn build_line(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    counted("placer-x", tree, id, params, rng, Layout::Line(Axis::X))
}

pub(crate) fn build_column(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    counted("placer-y", tree, id, params, rng, Layout::Line(Axis::Y))
}

pub(crate) fn build_depth(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({
        "nSymbolsToCreate": 3,
        "scale": 0.5,
        "margin": false,
        "symbol": default_symbol(),
    });
    let p: DepthParams = resolve("placer-z", &defaults, params)?;
    let child = tree.build_child(&p.symbol, id, rng)?;
    Ok(SymbolKind::Placer(depth_placer(
        p.n_symbols_to_create,
        p.scale,
        p.margin,
        child,
    )))
}

pub(crate) fn depth_placer(count: u32, scale: f32, margin: bool, child: NodeId) -> Placer {
    Placer::new(Layout::Depth { scale, margin }, count, child)
}

fn ranged(
    tag: &str,
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
    axis: Axis,
    irregular: bool,
) -> Result<SymbolKind> {
    let mut defaults = json!({ "min": 2, "max": 6, "symbol": default_symbol() });
    if irregular {
        defaults["variation"] = json!(0.5);
    }
    let p: RangeParams = resolve(tag, &defaults, params)?;
    if !(0.0..=1.0).contains(&p.variation) {
        return Err(Error::parameter(tag, "variation must lie in [0, 1]"));
    }
    let layout = if irregular {
        Layout::Irregular {
            axis,
            min: p.min,
            max: p.max,
            variation: p.variation,
            fractions: Vec::new(),
        }
    } else {
        Layout::RandomLine {
            axis,
            min: p.min,
            max: p.max,
        }
    };
    let child = tree.build_child(&p.symbol, id, rng)?;
    Ok(SymbolKind::Placer(Placer::drawn(layout, child, rng)))
}

pub(crate) fn build_random_line(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    ranged("random-line", tree, id, params, rng, Axis::X, false)
}

pub(crate) fn build_random_column(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    ranged("random-column", tree, id, params, rng, Axis::Y, false)
}

pub(crate) fn build_irregular_line(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    ranged("irregular-line", tree, id, params, rng, Axis::X, true)
}

pub(crate) fn build_irregular_column(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    ranged("irregular-column", tree, id, params, rng, Axis::Y, true)
}
