//! Triangulated grid with jittered interior vertices.
use glam::Vec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::geometry::{Bounds, Geometry, Rect};
use crate::params::{resolve, to_object, TypedSpec};
use crate::placer::{check_grid_side, MAX_GRID_SIDE};
use crate::random::rand_signed;
use crate::symbol::{NodeId, SymbolKind, SymbolTree};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseGridParams {
    pub width: u32,
    pub height: u32,
    /// Jitter amplitude as a fraction of half a cell.
    pub noise: f32,
}

/// Walks the two triangles of every cell, row by row.
///
/// Cell `(i, j)` with corners `a = p[i][j]`, `b = p[i+1][j]`, `c = p[i+1][j+1]` and
/// `d = p[i][j+1]` yields the upper triangle `(a, b, d)` then the lower `(b, c, d)`.
#[derive(Clone, Debug)]
pub struct NoiseGrid {
    pub params: NoiseGridParams,
    lattice: Vec<Vec2>,
    cursor: u32,
    pub(crate) child: NodeId,
}

impl NoiseGrid {
    /// Sides above [`MAX_GRID_SIDE`] are clamped.
    pub fn new(mut params: NoiseGridParams, child: NodeId) -> Self {
        params.width = params.width.min(MAX_GRID_SIDE);
        params.height = params.height.min(MAX_GRID_SIDE);
        Self {
            params,
            lattice: Vec::new(),
            cursor: 0,
            child,
        }
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    fn triangle_count(&self) -> u32 {
        self.params.width * self.params.height * 2
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.cursor >= self.triangle_count()
    }

    pub(crate) fn ensure_lattice(&mut self, bounds: &Bounds, rng: &mut dyn RngCore) {
        if self.lattice.is_empty() {
            self.lattice = lattice(&self.params, bounds.rect(), rng);
        }
    }

    fn point(&self, column: u32, row: u32) -> Option<Vec2> {
        let index = row * (self.params.width + 1) + column;
        self.lattice.get(index as usize).copied()
    }

    /// `(row, column, triangle)` of the current step.
    fn coordinates(&self) -> (u32, u32, u32) {
        let cell = self.cursor / 2;
        let width = self.params.width.max(1);
        (cell / width, cell % width, self.cursor % 2)
    }

    /// Bounds carrying the current triangle, once the lattice exists.
    pub(crate) fn current_bounds(&self) -> Option<Bounds> {
        if self.is_finished() {
            return None;
        }
        let (row, column, triangle) = self.coordinates();
        let a = self.point(column, row)?;
        let b = self.point(column + 1, row)?;
        let c = self.point(column + 1, row + 1)?;
        let d = self.point(column, row + 1)?;
        let points = if triangle == 0 {
            vec![a, b, d]
        } else {
            vec![b, c, d]
        };
        Some(Bounds::from_geometry(Geometry::polygon(points, true)))
    }

    /// Row, column and triangle index as fractions.
    pub(crate) fn positions(&self) -> [f32; 3] {
        let (row, column, triangle) = self.coordinates();
        [
            row as f32 / self.params.height.max(1) as f32,
            column as f32 / self.params.width.max(1) as f32,
            triangle as f32,
        ]
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }

    pub(crate) fn restart(&mut self, bounds: Option<&Bounds>, rng: &mut dyn RngCore) {
        self.cursor = 0;
        self.lattice.clear();
        if let Some(bounds) = bounds {
            self.ensure_lattice(bounds, rng);
        }
    }

    pub(crate) fn parameters(&self) -> Map<String, Value> {
        to_object(&self.params)
    }
}

/// `(width + 1) x (height + 1)` points, row-major; border points stay on the border.
fn lattice(params: &NoiseGridParams, rect: Rect, rng: &mut dyn RngCore) -> Vec<Vec2> {
    let (width, height) = (params.width.max(1), params.height.max(1));
    let cell = Vec2::new(rect.width / width as f32, rect.height / height as f32);
    let jitter = cell * 0.5 * params.noise;
    let mut points = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
    for row in 0..=height {
        for column in 0..=width {
            let mut point = rect.top_left() + Vec2::new(column as f32, row as f32) * cell;
            let interior = column > 0 && column < width && row > 0 && row < height;
            if interior {
                point.x += rand_signed(rng, jitter.x);
                point.y += rand_signed(rng, jitter.y);
            }
            points.push(point);
        }
    }
    points
}

#[derive(Deserialize)]
struct NoiseGridSpec {
    width: u32,
    height: u32,
    noise: f32,
    symbol: TypedSpec,
}

pub(crate) fn build_noise_grid(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({
        "width": 4,
        "height": 4,
        "noise": 0.5,
        "symbol": { "type": "bounds", "parameters": {} },
    });
    let spec: NoiseGridSpec = resolve("noise-grid", &defaults, params)?;
    check_grid_side("noise-grid", spec.width, spec.height)?;
    let child = tree.build_child(&spec.symbol, id, rng)?;
    let params = NoiseGridParams {
        width: spec.width,
        height: spec.height,
        noise: spec.noise,
    };
    Ok(SymbolKind::NoiseGrid(NoiseGrid::new(params, child)))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn grid(width: u32, height: u32, noise: f32) -> NoiseGrid {
        NoiseGrid::new(
            NoiseGridParams {
                width,
                height,
                noise,
            },
            NodeId(0),
        )
    }

    #[test]
    fn border_points_stay_on_the_border() {
        let mut rng = StdRng::seed_from_u64(3);
        let rect = Rect::new(0.0, 0.0, 30.0, 30.0);
        let params = NoiseGridParams {
            width: 3,
            height: 3,
            noise: 1.0,
        };
        let points = lattice(&params, rect, &mut rng);
        assert_eq!(points.len(), 16);
        assert_eq!(points[0], Vec2::ZERO);
        assert_eq!(points[3], Vec2::new(30.0, 0.0));
        assert_eq!(points[15], Vec2::new(30.0, 30.0));
        let inner = points[5];
        assert!((inner - Vec2::new(10.0, 10.0)).abs().max_element() <= 5.0);
    }

    #[test]
    fn emits_two_triangles_per_cell_row_major() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = grid(2, 1, 0.0);
        let bounds = Bounds::new(Rect::new(0.0, 0.0, 20.0, 10.0));
        grid.ensure_lattice(&bounds, &mut rng);

        let mut triangles = Vec::new();
        while let Some(b) = grid.current_bounds() {
            triangles.push((grid.positions(), b.to_geometry().vertices()));
            grid.advance();
        }
        assert_eq!(triangles.len(), 4);
        assert_eq!(
            triangles[0].1,
            vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)]
        );
        assert_eq!(
            triangles[1].1,
            vec![
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(0.0, 10.0)
            ]
        );
        assert_eq!(triangles[1].0, [0.0, 0.0, 1.0]);
        assert_eq!(triangles[2].0, [0.0, 0.5, 0.0]);
        assert!(grid.is_finished());
    }

    #[test]
    fn triangle_bounds_cover_the_triangle() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = grid(1, 1, 0.0);
        grid.restart(Some(&Bounds::new(Rect::new(5.0, 5.0, 10.0, 10.0))), &mut rng);
        let bounds = grid.current_bounds().unwrap();
        assert_eq!(bounds.rect(), Rect::new(5.0, 5.0, 10.0, 10.0));
        assert!(bounds.attached().is_some());
    }

    #[test]
    fn oversized_grids_are_rejected_at_construction() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = SymbolTree::from_json(
            &json!({ "type": "noise-grid", "parameters": { "width": 70000, "height": 70000 } }),
            &mut rng,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not exceed"));

        let widest = SymbolTree::from_json(
            &json!({ "type": "noise-grid", "parameters": { "width": MAX_GRID_SIDE, "height": 1 } }),
            &mut rng,
        )
        .unwrap();
        assert!(!widest.has_finished(widest.root()));
    }

    #[test]
    fn constructor_clamps_huge_sides() {
        let grid = grid(u32::MAX, u32::MAX, 0.0);
        assert_eq!(grid.params.width, MAX_GRID_SIDE);
        assert!(!grid.is_finished());
    }

    #[test]
    fn empty_grid_is_finished() {
        let grid = grid(0, 5, 0.5);
        assert!(grid.is_finished());
        assert!(grid.current_bounds().is_none());
    }
}
