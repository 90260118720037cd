//! Grid composite: rows of columns of concentric copies.
//!
//! A grid is stored as three nested placers (Y, then X, then depth) above the user's
//! symbol, but it reads and writes a single flat parameter record.
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::params::{resolve, to_object, TypedSpec};
use crate::placer::linear::{default_symbol, depth_placer};
use crate::placer::{Axis, Layout, Placer};
use crate::symbol::{NodeId, SymbolKind, SymbolTree};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridParams {
    pub width: u32,
    pub height: u32,
    pub n_symbols_to_create: u32,
    pub margin: bool,
    pub scale: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridSpec {
    width: u32,
    height: u32,
    n_symbols_to_create: u32,
    margin: bool,
    scale: f32,
    symbol: TypedSpec,
}

pub(crate) fn build_grid(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({
        "width": 3,
        "height": 3,
        "nSymbolsToCreate": 1,
        "margin": false,
        "scale": 0.5,
        "symbol": default_symbol(),
    });
    let grid: GridSpec = resolve("placer-xyz", &defaults, params)?;

    let columns = tree.reserve();
    let depth = tree.reserve();
    let leaf = tree.build_child(&grid.symbol, depth, rng)?;
    tree.install(
        depth,
        "placer-z",
        Some(columns),
        SymbolKind::Placer(depth_placer(
            grid.n_symbols_to_create,
            grid.scale,
            grid.margin,
            leaf,
        )),
    );
    tree.install(
        columns,
        "placer-x",
        Some(id),
        SymbolKind::Placer(Placer::new(Layout::Line(Axis::X), grid.width, depth)),
    );
    Ok(SymbolKind::Grid(Placer::new(
        Layout::Line(Axis::Y),
        grid.height,
        columns,
    )))
}

/// Flat parameters of a grid and the id of its user symbol.
pub(crate) fn flat_parameters(tree: &SymbolTree, rows: &Placer) -> Option<(Map<String, Value>, NodeId)> {
    let columns = tree.placer(rows.child())?;
    let depth = tree.placer(columns.child())?;
    let Layout::Depth { scale, margin } = depth.layout() else {
        return None;
    };
    let params = GridParams {
        width: columns.n_to_create(),
        height: rows.n_to_create(),
        n_symbols_to_create: depth.n_to_create(),
        margin: *margin,
        scale: *scale,
    };
    Some((to_object(&params), depth.child()))
}
