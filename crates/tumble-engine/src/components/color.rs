use serde::{Deserialize, Serialize};

/// RGBA color with every channel in 0.0 - 1.0.
///
/// Content tables write colors the canvas way: `[r, g, b]` or `[r, g, b, a]`
/// with 0-255 color channels and a 0-1 alpha. Deserialization accepts that
/// form and fills a missing alpha with 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from 0-255 channels, fully opaque.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 1.0)
    }

    /// Color from 0-255 channels and a 0-1 alpha.
    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Color with each channel replaced by its complement. Alpha is kept.
    pub fn inverted(self) -> Self {
        Self {
            r: 1.0 - self.r,
            g: 1.0 - self.g,
            b: 1.0 - self.b,
            a: self.a,
        }
    }

    /// Linear blend between `from` (t = 0) and `to` (t = 1); t is clamped.
    pub fn lerp(from: Self, to: Self, t: f32) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        Self {
            r: from.r + (to.r - from.r) * t,
            g: from.g + (to.g - from.g) * t,
            b: from.b + (to.b - from.b) * t,
            a: from.a + (to.a - from.a) * t,
        }
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl TryFrom<Vec<f32>> for Rgba {
    type Error = String;

    fn try_from(channels: Vec<f32>) -> Result<Self, Self::Error> {
        let alpha = match channels.len() {
            3 => 1.0,
            4 => channels[3],
            n => return Err(format!("color needs 3 or 4 channels, got {n}")),
        };
        Ok(Self {
            r: channels[0] / 255.0,
            g: channels[1] / 255.0,
            b: channels[2] / 255.0,
            a: alpha,
        })
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r * 255.0, c.g * 255.0, c.b * 255.0, c.a]
    }
}
