use std::path::Path;

use glam::Vec2;
use image::{Rgba, RgbaImage};
use pattern_symbols::prelude::{Color, Shape};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Image size and the container area it shows.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    pub container: Vec2,
    pub background: [u8; 3],
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), container: Vec2) -> Self {
        Self {
            image_size,
            container,
            background: [255, 255, 255],
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    fn scale(&self) -> Vec2 {
        Vec2::new(
            self.image_size.0 as f32 / self.container.x.max(f32::EPSILON),
            self.image_size.1 as f32 / self.container.y.max(f32::EPSILON),
        )
    }
}

/// Rasterize `shapes` in order and write them as a PNG.
pub fn render_shapes_to_png(
    shapes: &[Shape],
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (width, height) = config.image_size;
    let [r, g, b] = config.background;
    let mut image = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
    let scale = config.scale();

    for shape in shapes {
        let points: Vec<Vec2> = shape
            .geometry
            .vertices()
            .into_iter()
            .map(|p| p * scale)
            .collect();
        let closed = shape.geometry.is_closed();
        if let (Some(fill), true) = (shape.style.fill, closed) {
            fill_polygon(&mut image, &points, fill);
        }
        if let Some(stroke) = shape.style.stroke {
            let radius = (shape.style.stroke_width * scale.min_element() / 2.0).max(0.5);
            stroke_polyline(&mut image, &points, closed, radius, stroke);
        }
    }

    let path = path.as_ref();
    image.save(path)?;
    info!("Wrote {} shapes to {}.", shapes.len(), path.display());
    Ok(())
}

fn blend(image: &mut RgbaImage, x: i64, y: i64, color: Color) {
    if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
        return;
    }
    let [r, g, b, a] = color.to_u8();
    let alpha = f32::from(a) / 255.0;
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    for (channel, source) in pixel.0.iter_mut().zip([r, g, b]) {
        let mixed = f32::from(source) * alpha + f32::from(*channel) * (1.0 - alpha);
        *channel = mixed.round() as u8;
    }
}

/// Even-odd scanline fill, sampling pixel centers.
fn fill_polygon(image: &mut RgbaImage, points: &[Vec2], color: Color) {
    if points.len() < 3 {
        return;
    }
    let (min_y, max_y) = points
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let first_row = min_y.floor().max(0.0) as i64;
    let last_row = max_y.ceil().min(image.height() as f32) as i64;

    let mut crossings = Vec::new();
    for row in first_row..last_row {
        let y = row as f32 + 0.5;
        crossings.clear();
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            if (a.y <= y) != (b.y <= y) {
                crossings.push(a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x));
            }
        }
        crossings.sort_by(f32::total_cmp);
        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil() as i64;
            let end = (span[1] - 0.5).floor() as i64;
            for column in start..=end {
                blend(image, column, row, color);
            }
        }
    }
}

/// Stamp discs of `radius` pixels along every edge.
fn stroke_polyline(image: &mut RgbaImage, points: &[Vec2], closed: bool, radius: f32, color: Color) {
    let segments = if closed {
        points.len()
    } else {
        points.len().saturating_sub(1)
    };
    let reach = radius.ceil() as i64;
    let mut painted = std::collections::HashSet::new();
    for i in 0..segments {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let steps = (a.distance(b) * 2.0).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let p = a.lerp(b, step as f32 / steps as f32);
            let (cx, cy) = (p.x.floor() as i64, p.y.floor() as i64);
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let pixel = Vec2::new((cx + dx) as f32 + 0.5, (cy + dy) as f32 + 0.5);
                    if pixel.distance(p) <= radius && painted.insert((cx + dx, cy + dy)) {
                        blend(image, cx + dx, cy + dy, color);
                    }
                }
            }
        }
    }
}
