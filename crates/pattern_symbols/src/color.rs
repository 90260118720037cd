//! RGBA color value used by shape styles and color effects.
//!
//! Parsing and color-space conversion go through the `color` crate, so palette
//! entries accept any CSS color: names, hex, `rgb()`, `rgba()`, `hsl()` and `hwb()`.
use color::{AlphaColor, Hwb, OpaqueColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Straight (non-premultiplied) RGBA color with components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }

    /// Build a color from hue (degrees, wrapped), saturation and brightness in [0, 1].
    ///
    /// HSB maps onto HWB with whiteness `(1 - s) * v` and blackness `1 - v`.
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let v = brightness.clamp(0.0, 1.0);
        let hwb = OpaqueColor::<Hwb>::new([
            hue.rem_euclid(360.0),
            (1.0 - s) * v * 100.0,
            (1.0 - v) * 100.0,
        ]);
        let [r, g, b] = hwb.convert::<Srgb>().components;
        Self::rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    /// Perceived brightness as the HSB value channel.
    pub fn brightness(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    /// Parse a CSS color string.
    pub fn parse(text: &str) -> Result<Self> {
        let parsed = color::parse_color(&text.trim().to_ascii_lowercase())
            .map_err(|err| Error::parameter("color", format!("'{text}': {err}")))?;
        Ok(Self::from(parsed.to_alpha_color::<Srgb>()))
    }

    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn to_u8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// `#rrggbb` form; alpha is not encoded.
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// `rgb(r,g,b)`, or `rgba(r,g,b,a)` when translucent.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_u8();
        if self.a < 1.0 {
            format!("rgba({r},{g},{b},{})", self.a.clamp(0.0, 1.0))
        } else {
            format!("rgb({r},{g},{b})")
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<AlphaColor<Srgb>> for Color {
    fn from(color: AlphaColor<Srgb>) -> Self {
        let [r, g, b, a] = color.components;
        Self::rgba(r, g, b, a)
    }
}

impl From<Color> for AlphaColor<Srgb> {
    fn from(color: Color) -> Self {
        AlphaColor::new([color.r, color.g, color.b, color.a])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-4 && (a.g - b.g).abs() < 1e-4 && (a.b - b.b).abs() < 1e-4
    }

    #[test]
    fn hsb_primary_hues() {
        assert!(close(Color::from_hsb(0.0, 1.0, 1.0), Color::rgb(1.0, 0.0, 0.0)));
        assert!(close(Color::from_hsb(120.0, 1.0, 1.0), Color::rgb(0.0, 1.0, 0.0)));
        assert!(close(Color::from_hsb(240.0, 1.0, 1.0), Color::rgb(0.0, 0.0, 1.0)));
        assert!(close(Color::from_hsb(-120.0, 1.0, 1.0), Color::rgb(0.0, 0.0, 1.0)));
        assert!(close(Color::from_hsb(720.0, 0.0, 0.5), Color::rgb(0.5, 0.5, 0.5)));
        assert!(close(Color::from_hsb(60.0, 0.5, 0.8), Color::rgb(0.8, 0.8, 0.4)));
    }

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(Color::parse("red").unwrap().to_hex(), "#ff0000");
        assert_eq!(Color::parse("Green").unwrap().to_hex(), "#008000");
        assert_eq!(Color::parse("crimson").unwrap().to_hex(), "#dc143c");
        assert_eq!(Color::parse("gold").unwrap().to_hex(), "#ffd700");
        assert_eq!(Color::parse("#0f0").unwrap().to_hex(), "#00ff00");
        assert_eq!(Color::parse("#123456").unwrap().to_hex(), "#123456");
        let translucent = Color::parse("#00000080").unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn parses_functional_notation() {
        assert_eq!(Color::parse("rgb(255,0,0)").unwrap().to_hex(), "#ff0000");
        assert_eq!(Color::parse(" rgb(12, 34, 56) ").unwrap().to_hex(), "#0c2238");
        let half = Color::parse("rgba(255, 0, 0, 0.5)").unwrap();
        assert_eq!(half.to_hex(), "#ff0000");
        assert!((half.a - 0.5).abs() < 1e-6);
        assert_eq!(Color::parse("hsl(0, 100%, 50%)").unwrap().to_hex(), "#ff0000");
    }

    #[test]
    fn css_form_parses_back() {
        let color = Color::from_u8(12, 200, 99, 255);
        assert_eq!(color.to_css(), "rgb(12,200,99)");
        assert_eq!(Color::parse(&color.to_css()).unwrap().to_u8(), color.to_u8());
        let translucent = color.with_alpha(0.25);
        assert_eq!(translucent.to_css(), "rgba(12,200,99,0.25)");
        assert!((Color::parse(&translucent.to_css()).unwrap().a - 0.25).abs() < 1e-6);
    }

    #[test]
    fn rejects_unknown_colors() {
        assert!(Color::parse("not-a-color").is_err());
        assert!(Color::parse("#12").is_err());
        assert!(Color::parse("#zzzzzz").is_err());
    }

    #[test]
    fn brightness_is_max_channel() {
        assert_eq!(Color::rgb(0.2, 0.7, 0.1).brightness(), 0.7);
    }
}
