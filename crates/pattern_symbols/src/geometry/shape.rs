//! Concrete shapes produced by terminal symbols.
//!
//! A [`Shape`] is what the generator hands to a renderer: a [`Geometry`] plus a
//! [`Style`]. Geometry operations never allocate for primitives that stay
//! primitives; rotations and non-uniform scales flatten circles and rectangles
//! into polygons.
use glam::Vec2;

use crate::color::Color;
use crate::geometry::Rect;

/// Vertex count used when a circle has to be flattened.
pub const CIRCLE_SEGMENTS: usize = 32;

/// Geometric primitive of an emitted shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Rectangle(Rect),
    Circle {
        center: Vec2,
        radius: f32,
    },
    /// Closed pie slice between two angles, in degrees, clockwise on screen.
    Arc {
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
    },
    Polygon {
        points: Vec<Vec2>,
        closed: bool,
    },
}

impl Geometry {
    pub fn polygon(points: Vec<Vec2>, closed: bool) -> Self {
        Geometry::Polygon { points, closed }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Geometry::Polygon { closed, .. } => *closed,
            _ => true,
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        match self {
            Geometry::Rectangle(rect) => rect.normalized(),
            Geometry::Circle { center, radius } => {
                Rect::from_center(*center, radius.abs() * 2.0, radius.abs() * 2.0)
            }
            Geometry::Arc { .. } => Rect::from_points(&self.vertices()),
            Geometry::Polygon { points, .. } => Rect::from_points(points),
        }
    }

    /// Center of the bounding rectangle.
    pub fn center(&self) -> Vec2 {
        match self {
            Geometry::Circle { center, .. } => *center,
            _ => self.bounding_rect().center(),
        }
    }

    /// Vertex list; primitives are flattened.
    pub fn vertices(&self) -> Vec<Vec2> {
        match self {
            Geometry::Rectangle(rect) => vec![
                rect.top_left(),
                Vec2::new(rect.right(), rect.y),
                Vec2::new(rect.right(), rect.bottom()),
                Vec2::new(rect.x, rect.bottom()),
            ],
            Geometry::Circle { center, radius } => (0..CIRCLE_SEGMENTS)
                .map(|i| {
                    let t = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
                    *center + Vec2::new(t.cos(), t.sin()) * *radius
                })
                .collect(),
            Geometry::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let sweep = end_angle - start_angle;
                let steps = ((sweep.abs() / 360.0 * CIRCLE_SEGMENTS as f32).ceil() as usize).max(1);
                let mut points = Vec::with_capacity(steps + 2);
                for i in 0..=steps {
                    let angle = (start_angle + sweep * i as f32 / steps as f32).to_radians();
                    points.push(*center + Vec2::new(angle.cos(), angle.sin()) * *radius);
                }
                points.push(*center);
                points
            }
            Geometry::Polygon { points, .. } => points.clone(),
        }
    }

    /// Flatten into a polygon, keeping the closed flag.
    pub fn into_polygon(self) -> Geometry {
        match self {
            Geometry::Polygon { .. } => self,
            other => Geometry::Polygon {
                points: other.vertices(),
                closed: true,
            },
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Geometry::Rectangle(rect) => *rect = rect.translated(delta),
            Geometry::Circle { center, .. } | Geometry::Arc { center, .. } => *center += delta,
            Geometry::Polygon { points, .. } => points.iter_mut().for_each(|p| *p += delta),
        }
    }

    /// Scale by `(sx, sy)` around `origin`.
    pub fn scale_about(&mut self, origin: Vec2, sx: f32, sy: f32) {
        let scale = Vec2::new(sx, sy);
        let map = |p: Vec2| origin + (p - origin) * scale;
        match self {
            Geometry::Rectangle(rect) => {
                let tl = map(rect.top_left());
                *rect = Rect::new(tl.x, tl.y, rect.width * sx, rect.height * sy).normalized();
            }
            Geometry::Circle { center, radius } | Geometry::Arc { center, radius, .. }
                if sx.abs() == sy.abs() =>
            {
                *center = map(*center);
                *radius *= sx.abs();
            }
            Geometry::Circle { .. } | Geometry::Arc { .. } => {
                *self = std::mem::replace(self, Geometry::polygon(Vec::new(), true)).into_polygon();
                self.scale_about(origin, sx, sy);
            }
            Geometry::Polygon { points, .. } => points.iter_mut().for_each(|p| *p = map(*p)),
        }
    }

    /// Rotate by `degrees` (clockwise on screen) around `origin`.
    pub fn rotate_about(&mut self, origin: Vec2, degrees: f32) {
        if degrees.rem_euclid(360.0) == 0.0 {
            return;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let rotate = |p: Vec2| {
            let d = p - origin;
            origin + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
        };
        match self {
            Geometry::Circle { center, .. } => *center = rotate(*center),
            Geometry::Arc {
                center,
                start_angle,
                end_angle,
                ..
            } => {
                *center = rotate(*center);
                *start_angle += degrees;
                *end_angle += degrees;
            }
            Geometry::Rectangle(_) => {
                *self = std::mem::replace(self, Geometry::polygon(Vec::new(), true)).into_polygon();
                self.rotate_about(origin, degrees);
            }
            Geometry::Polygon { points, .. } => points.iter_mut().for_each(|p| *p = rotate(*p)),
        }
    }

    /// Map the geometry so that `from` lands on `to`.
    pub fn fit(&mut self, from: Rect, to: Rect) {
        let sx = if from.width != 0.0 {
            to.width / from.width
        } else {
            1.0
        };
        let sy = if from.height != 0.0 {
            to.height / from.height
        } else {
            1.0
        };
        self.scale_about(from.top_left(), sx, sy);
        self.translate(to.top_left() - from.top_left());
    }
}

/// Paint applied to a shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 1.0,
        }
    }
}

/// A materialized shape with its appearance.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub geometry: Geometry,
    pub style: Style,
}

impl Shape {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            style: Style::default(),
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        self.geometry.bounding_rect()
    }
}
