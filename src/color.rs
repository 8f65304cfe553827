use crate::runtime::Lerp;
use std::fmt;

/// An RGBA color with components on the 0-255 scale.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::rgba(r, g, b, 255)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let channel = |c: f64| c.round().clamp(0.0, 255.0) as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }
}

impl Lerp for Color {
    fn lerp(&self, other: &Self, factor: f64) -> Self {
        Color {
            r: self.r.lerp(&other.r, factor),
            g: self.g.lerp(&other.g, factor),
            b: self.b.lerp(&other.b, factor),
            a: self.a.lerp(&other.a, factor),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}
