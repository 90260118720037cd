//! Leaf nodes that materialize one concrete shape from the bounds they receive.
use glam::Vec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::geometry::{Anchor, Bounds, Geometry, Rect};
use crate::params::{resolve, to_object};
use crate::symbol::{NodeId, SymbolKind, SymbolTree};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectangleParams {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleParams {
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl CircleParams {
    fn is_full_turn(&self) -> bool {
        self.start_angle == 0.0 && self.end_angle == 360.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonOnBoxParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_indices: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_names: Option<Vec<String>>,
    pub closed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonParams {
    /// `[u, v]` fractions of the bounds, measured from the top-left corner.
    pub vertices: Vec<[f32; 2]>,
    pub closed: bool,
}

/// What a terminal draws.
#[derive(Clone, Debug, PartialEq)]
pub enum TerminalShape {
    /// The bounds themselves, or the shape attached to them.
    Bounds,
    /// Ratio of the bounds when `absolute` is false, pixels otherwise.
    Rectangle {
        params: RectangleParams,
        absolute: bool,
    },
    Circle {
        params: CircleParams,
        absolute: bool,
    },
    PolygonOnBox {
        params: PolygonOnBoxParams,
        anchors: Vec<Anchor>,
    },
    Polygon(PolygonParams),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Terminal {
    pub shape: TerminalShape,
    emitted: bool,
}

impl Terminal {
    pub fn new(shape: TerminalShape) -> Self {
        Self {
            shape,
            emitted: false,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.emitted
    }

    pub(crate) fn mark_emitted(&mut self) {
        self.emitted = true;
    }

    pub(crate) fn restart(&mut self) {
        self.emitted = false;
    }

    /// Geometry for `bounds`; effects are applied by the caller.
    pub fn geometry(&self, bounds: &Bounds) -> Geometry {
        let rect = bounds.rect();
        match &self.shape {
            TerminalShape::Bounds => bounds.to_geometry(),
            TerminalShape::Rectangle { params, absolute } => {
                let (width, height) = if *absolute {
                    (params.width, params.height)
                } else {
                    (params.width * rect.width, params.height * rect.height)
                };
                Geometry::Rectangle(Rect::from_center(rect.center(), width, height))
            }
            TerminalShape::Circle { params, absolute } => {
                let radius = if *absolute {
                    params.radius
                } else {
                    params.radius * rect.width.min(rect.height) / 2.0
                };
                if params.is_full_turn() {
                    Geometry::Circle {
                        center: rect.center(),
                        radius,
                    }
                } else {
                    Geometry::Arc {
                        center: rect.center(),
                        radius,
                        start_angle: params.start_angle,
                        end_angle: params.end_angle,
                    }
                }
            }
            TerminalShape::PolygonOnBox { params, anchors } => Geometry::polygon(
                anchors.iter().map(|anchor| rect.anchor(*anchor)).collect(),
                params.closed,
            ),
            TerminalShape::Polygon(params) => Geometry::polygon(
                params
                    .vertices
                    .iter()
                    .map(|[u, v]| rect.lerp(*u, *v))
                    .collect(),
                params.closed,
            ),
        }
    }

    pub(crate) fn parameters(&self) -> Map<String, Value> {
        match &self.shape {
            TerminalShape::Bounds => Map::new(),
            TerminalShape::Rectangle { params, .. } => to_object(params),
            TerminalShape::Circle { params, .. } => to_object(params),
            TerminalShape::PolygonOnBox { params, .. } => to_object(params),
            TerminalShape::Polygon(params) => to_object(params),
        }
    }
}

/// Anchors selected by index, then by name, then the default triangle.
fn resolve_anchors(params: &PolygonOnBoxParams) -> Result<Vec<Anchor>> {
    if let Some(indices) = &params.vertex_indices {
        indices.iter().map(|&index| Anchor::from_index(index)).collect()
    } else if let Some(names) = &params.vertex_names {
        names.iter().map(|name| Anchor::from_name(name)).collect()
    } else {
        Ok(vec![
            Anchor::TopCenter,
            Anchor::BottomLeft,
            Anchor::BottomRight,
        ])
    }
}

fn terminal(shape: TerminalShape) -> SymbolKind {
    SymbolKind::Terminal(Terminal::new(shape))
}

pub(crate) fn build_bounds(
    _tree: &mut SymbolTree,
    _id: NodeId,
    _params: &Value,
    _rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    Ok(terminal(TerminalShape::Bounds))
}

pub(crate) fn build_rectangle(
    _tree: &mut SymbolTree,
    _id: NodeId,
    params: &Value,
    _rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let params = resolve("rectangle", &json!({ "width": 1.0, "height": 1.0 }), params)?;
    Ok(terminal(TerminalShape::Rectangle {
        params,
        absolute: false,
    }))
}

pub(crate) fn build_rectangle_absolute(
    _tree: &mut SymbolTree,
    _id: NodeId,
    params: &Value,
    _rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({ "width": 100.0, "height": 100.0 });
    let params = resolve("rectangle-absolute", &defaults, params)?;
    Ok(terminal(TerminalShape::Rectangle {
        params,
        absolute: true,
    }))
}

pub(crate) fn build_circle(
    _tree: &mut SymbolTree,
    _id: NodeId,
    params: &Value,
    _rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({ "radius": 1.0, "startAngle": 0.0, "endAngle": 360.0 });
    let params = resolve("circle", &defaults, params)?;
    Ok(terminal(TerminalShape::Circle {
        params,
        absolute: false,
    }))
}

pub(crate) fn build_circle_absolute(
    _tree: &mut SymbolTree,
    _id: NodeId,
    params: &Value,
    _rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({ "radius": 100.0, "startAngle": 0.0, "endAngle": 360.0 });
    let params = resolve("circle-absolute", &defaults, params)?;
    Ok(terminal(TerminalShape::Circle {
        params,
        absolute: true,
    }))
}

pub(crate) fn build_polygon_on_box(
    _tree: &mut SymbolTree,
    _id: NodeId,
    params: &Value,
    _rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let params: PolygonOnBoxParams = resolve("polygon-on-box", &json!({ "closed": true }), params)?;
    let anchors = resolve_anchors(&params)?;
    Ok(terminal(TerminalShape::PolygonOnBox { params, anchors }))
}

pub(crate) fn build_polygon(
    _tree: &mut SymbolTree,
    _id: NodeId,
    params: &Value,
    _rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({ "vertices": [[0.0, 0.0], [1.0, 0.0], [0.5, 0.5]], "closed": true });
    let params = resolve("polygon", &defaults, params)?;
    Ok(terminal(TerminalShape::Polygon(params)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::new(Rect::new(0.0, 0.0, 200.0, 100.0))
    }

    fn rectangle(width: f32, height: f32, absolute: bool) -> Terminal {
        Terminal::new(TerminalShape::Rectangle {
            params: RectangleParams { width, height },
            absolute,
        })
    }

    #[test]
    fn ratio_rectangle_is_centered() {
        let geometry = rectangle(0.5, 0.5, false).geometry(&bounds());
        assert_eq!(geometry, Geometry::Rectangle(Rect::new(50.0, 25.0, 100.0, 50.0)));
    }

    #[test]
    fn absolute_rectangle_ignores_bounds_size() {
        let geometry = rectangle(10.0, 20.0, true).geometry(&bounds());
        assert_eq!(geometry, Geometry::Rectangle(Rect::new(95.0, 40.0, 10.0, 20.0)));
    }

    #[test]
    fn ratio_circle_uses_the_smaller_side() {
        let circle = Terminal::new(TerminalShape::Circle {
            params: CircleParams {
                radius: 1.0,
                start_angle: 0.0,
                end_angle: 360.0,
            },
            absolute: false,
        });
        assert_eq!(
            circle.geometry(&bounds()),
            Geometry::Circle {
                center: Vec2::new(100.0, 50.0),
                radius: 50.0
            }
        );
    }

    #[test]
    fn partial_sweep_makes_an_arc() {
        let arc = Terminal::new(TerminalShape::Circle {
            params: CircleParams {
                radius: 10.0,
                start_angle: 90.0,
                end_angle: 180.0,
            },
            absolute: true,
        });
        assert!(matches!(
            arc.geometry(&bounds()),
            Geometry::Arc { radius, start_angle, .. } if radius == 10.0 && start_angle == 90.0
        ));
    }

    #[test]
    fn polygon_on_box_defaults_to_triangle() {
        let params = PolygonOnBoxParams {
            vertex_indices: None,
            vertex_names: None,
            closed: true,
        };
        let anchors = resolve_anchors(&params).unwrap();
        let terminal = Terminal::new(TerminalShape::PolygonOnBox { params, anchors });
        assert_eq!(
            terminal.geometry(&bounds()).vertices(),
            vec![
                Vec2::new(100.0, 0.0),
                Vec2::new(0.0, 100.0),
                Vec2::new(200.0, 100.0)
            ]
        );
    }

    #[test]
    fn indices_take_priority_over_names() {
        let params = PolygonOnBoxParams {
            vertex_indices: Some(vec![0, 8]),
            vertex_names: Some(vec!["bottomRight".into()]),
            closed: false,
        };
        assert_eq!(
            resolve_anchors(&params).unwrap(),
            vec![Anchor::TopLeft, Anchor::Center]
        );
    }

    #[test]
    fn bad_vertex_references_are_rejected() {
        let by_index = PolygonOnBoxParams {
            vertex_indices: Some(vec![9]),
            vertex_names: None,
            closed: true,
        };
        assert!(resolve_anchors(&by_index).is_err());
        let by_name = PolygonOnBoxParams {
            vertex_indices: None,
            vertex_names: Some(vec!["middle".into()]),
            closed: true,
        };
        assert!(resolve_anchors(&by_name).is_err());
    }

    #[test]
    fn polygon_vertices_are_relative() {
        let terminal = Terminal::new(TerminalShape::Polygon(PolygonParams {
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [0.5, 0.5]],
            closed: true,
        }));
        assert_eq!(
            terminal.geometry(&bounds()).vertices(),
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(200.0, 0.0),
                Vec2::new(100.0, 50.0)
            ]
        );
    }

    #[test]
    fn bounds_terminal_emits_attached_shape() {
        let triangle = Geometry::polygon(
            vec![Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)],
            true,
        );
        let terminal = Terminal::new(TerminalShape::Bounds);
        let attached = Bounds::from_geometry(triangle.clone());
        assert_eq!(terminal.geometry(&attached), triangle);
        assert_eq!(
            terminal.geometry(&bounds()),
            Geometry::Rectangle(bounds().rect())
        );
    }
}
