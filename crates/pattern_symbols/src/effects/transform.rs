//! Geometric effects: affine transform and corner smoothing.
use glam::Vec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Effect;
use crate::error::Result;
use crate::geometry::{Geometry, Shape};
use crate::params::resolve;

/// Translation, then scale and rotation about the shape center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub translation_x: f32,
    pub translation_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Degrees.
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation_x: 0.0,
            translation_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub(crate) fn apply(&self, shape: &mut Shape) {
        let geometry = &mut shape.geometry;
        geometry.translate(Vec2::new(self.translation_x, self.translation_y));
        let center = geometry.center();
        if self.scale_x != 1.0 || self.scale_y != 1.0 {
            geometry.scale_about(center, self.scale_x, self.scale_y);
        }
        geometry.rotate_about(center, self.rotation);
    }
}

/// Chaikin corner cutting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Smooth {
    pub iterations: u32,
}

impl Smooth {
    pub(crate) fn apply(&self, shape: &mut Shape) {
        if self.iterations == 0 {
            return;
        }
        let closed = shape.geometry.is_closed();
        let mut points = shape.geometry.vertices();
        for _ in 0..self.iterations {
            points = chaikin(&points, closed);
        }
        shape.geometry = Geometry::polygon(points, closed);
    }
}

/// One round of corner cutting. Open polylines keep their end points.
pub fn chaikin(points: &[Vec2], closed: bool) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * 2 + 2);
    let segments = if closed {
        points.len()
    } else {
        points.len() - 1
    };
    if !closed {
        out.push(points[0]);
    }
    for i in 0..segments {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        out.push(a.lerp(b, 0.25));
        out.push(a.lerp(b, 0.75));
    }
    if !closed {
        out.push(points[points.len() - 1]);
    }
    out
}

pub(crate) fn build_transform(params: &Value, _rng: &mut dyn RngCore) -> Result<Effect> {
    let defaults = json!({
        "translationX": 0.0,
        "translationY": 0.0,
        "scaleX": 1.0,
        "scaleY": 1.0,
        "rotation": 0.0,
    });
    resolve("transform", &defaults, params).map(Effect::Transform)
}

pub(crate) fn build_smooth(params: &Value, _rng: &mut dyn RngCore) -> Result<Effect> {
    resolve("smooth", &json!({ "iterations": 2 }), params).map(Effect::Smooth)
}
