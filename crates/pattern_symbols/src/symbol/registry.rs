//! Tag registry: maps symbol type strings to constructors and editable fields.
use rand::RngCore;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::placer::{grid, linear, noise_grid, subdivision};
use crate::symbol::inspector::{Field, FieldKind};
use crate::symbol::{selector, terminal, NodeId, SymbolKind, SymbolTree};

/// Builds the kind of node `id`, creating its children in `tree`.
pub(crate) type BuildSymbol =
    fn(&mut SymbolTree, NodeId, &Value, &mut dyn RngCore) -> Result<SymbolKind>;

pub(crate) struct SymbolEntry {
    pub(crate) tag: &'static str,
    pub(crate) aliases: &'static [&'static str],
    pub(crate) build: BuildSymbol,
    pub(crate) fields: &'static [Field],
}

const fn number(name: &'static str, label: &'static str, min: f32, max: f32, step: f32) -> Field {
    Field {
        name,
        label,
        kind: FieldKind::Number { min, max, step },
    }
}

const fn integer(name: &'static str, label: &'static str, min: i64, max: i64) -> Field {
    Field {
        name,
        label,
        kind: FieldKind::Integer { min, max },
    }
}

const fn flag(name: &'static str, label: &'static str) -> Field {
    Field {
        name,
        label,
        kind: FieldKind::Bool,
    }
}

const COUNT: Field = integer("nSymbolsToCreate", "Symbols", 0, 1000);
const MIN: Field = integer("min", "Min", 0, 1000);
const MAX: Field = integer("max", "Max", 0, 1000);
const VARIATION: Field = number("variation", "Variation", 0.0, 1.0, 0.01);
const RATIO_WIDTH: Field = number("width", "Width", 0.0, 1.0, 0.01);
const RATIO_HEIGHT: Field = number("height", "Height", 0.0, 1.0, 0.01);
const PIXEL_WIDTH: Field = number("width", "Width", 0.0, 10_000.0, 1.0);
const PIXEL_HEIGHT: Field = number("height", "Height", 0.0, 10_000.0, 1.0);
const START_ANGLE: Field = number("startAngle", "Start angle", 0.0, 360.0, 1.0);
const END_ANGLE: Field = number("endAngle", "End angle", 0.0, 360.0, 1.0);
const CLOSED: Field = flag("closed", "Closed");
const SCALE: Field = number("scale", "Scale", 0.0, 1.0, 0.01);
const MARGIN: Field = flag("margin", "Margin");
const PROBABILITY: Field = number("probabilityToDivide", "Probability to divide", 0.0, 1.0, 0.01);
const MAX_DEPTH: Field = integer("maxDepth", "Max depth", 0, 12);

const RANGED: &[Field] = &[MIN, MAX];
const IRREGULAR: &[Field] = &[MIN, MAX, VARIATION];

static SYMBOL_REGISTRY: &[SymbolEntry] = &[
    SymbolEntry {
        tag: "bounds",
        aliases: &[],
        build: terminal::build_bounds,
        fields: &[],
    },
    SymbolEntry {
        tag: "rectangle",
        aliases: &["shape-rectangle"],
        build: terminal::build_rectangle,
        fields: &[RATIO_WIDTH, RATIO_HEIGHT],
    },
    SymbolEntry {
        tag: "rectangle-absolute",
        aliases: &["shape-rectangle-absolute"],
        build: terminal::build_rectangle_absolute,
        fields: &[PIXEL_WIDTH, PIXEL_HEIGHT],
    },
    SymbolEntry {
        tag: "circle",
        aliases: &["shape-circle"],
        build: terminal::build_circle,
        fields: &[
            number("radius", "Radius", 0.0, 1.0, 0.01),
            START_ANGLE,
            END_ANGLE,
        ],
    },
    SymbolEntry {
        tag: "circle-absolute",
        aliases: &["shape-circle-absolute"],
        build: terminal::build_circle_absolute,
        fields: &[
            number("radius", "Radius", 0.0, 10_000.0, 1.0),
            START_ANGLE,
            END_ANGLE,
        ],
    },
    SymbolEntry {
        tag: "polygon-on-box",
        aliases: &["shape-polygon-on-box"],
        build: terminal::build_polygon_on_box,
        fields: &[CLOSED],
    },
    SymbolEntry {
        tag: "polygon",
        aliases: &["shape-polygon"],
        build: terminal::build_polygon,
        fields: &[CLOSED],
    },
    SymbolEntry {
        tag: "placer",
        aliases: &[],
        build: linear::build_repeat,
        fields: &[COUNT],
    },
    SymbolEntry {
        tag: "placer-x",
        aliases: &["line"],
        build: linear::build_line,
        fields: &[COUNT],
    },
    SymbolEntry {
        tag: "placer-y",
        aliases: &["column"],
        build: linear::build_column,
        fields: &[COUNT],
    },
    SymbolEntry {
        tag: "placer-z",
        aliases: &["scaler"],
        build: linear::build_depth,
        fields: &[COUNT, SCALE, MARGIN],
    },
    SymbolEntry {
        tag: "placer-xyz",
        aliases: &["grid"],
        build: grid::build_grid,
        fields: &[
            integer("width", "Columns", 0, 1000),
            integer("height", "Rows", 0, 1000),
            COUNT,
            MARGIN,
            SCALE,
        ],
    },
    SymbolEntry {
        tag: "random-line",
        aliases: &["placer-min-max"],
        build: linear::build_random_line,
        fields: RANGED,
    },
    SymbolEntry {
        tag: "random-column",
        aliases: &[],
        build: linear::build_random_column,
        fields: RANGED,
    },
    SymbolEntry {
        tag: "irregular-line",
        aliases: &[],
        build: linear::build_irregular_line,
        fields: IRREGULAR,
    },
    SymbolEntry {
        tag: "irregular-column",
        aliases: &[],
        build: linear::build_irregular_column,
        fields: IRREGULAR,
    },
    SymbolEntry {
        tag: "noise-grid",
        aliases: &[],
        build: noise_grid::build_noise_grid,
        fields: &[
            integer("width", "Columns", 0, 1000),
            integer("height", "Rows", 0, 1000),
            number("noise", "Noise", 0.0, 1.0, 0.01),
        ],
    },
    SymbolEntry {
        tag: "quadtree",
        aliases: &[],
        build: subdivision::build_quadtree,
        fields: &[PROBABILITY, MAX_DEPTH],
    },
    SymbolEntry {
        tag: "recursive",
        aliases: &[],
        build: subdivision::build_recursive,
        fields: &[
            integer("width", "Columns", 1, 100),
            integer("height", "Rows", 1, 100),
            PROBABILITY,
            MAX_DEPTH,
        ],
    },
    SymbolEntry {
        tag: "random-shape",
        aliases: &["random"],
        build: selector::build_selector,
        fields: &[],
    },
];

/// Entry for a canonical tag or one of its aliases.
pub(crate) fn lookup(tag: &str) -> Result<&'static SymbolEntry> {
    SYMBOL_REGISTRY
        .iter()
        .find(|entry| entry.tag == tag || entry.aliases.contains(&tag))
        .ok_or_else(|| Error::UnknownType {
            tag: tag.to_owned(),
        })
}

/// Canonical symbol tags, in registration order.
pub fn symbol_tags() -> impl Iterator<Item = &'static str> {
    SYMBOL_REGISTRY.iter().map(|entry| entry.tag)
}

/// Whether `tag` names a symbol type, aliases included.
pub fn is_known_tag(tag: &str) -> bool {
    lookup(tag).is_ok()
}
