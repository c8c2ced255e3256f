use serde::{Deserialize, Serialize};

pub use kurbo::{Point, Rect, Vec2};

/// Alpha at or above which a color is treated as fully opaque.
pub const OPAQUE_ALPHA: f64 = 0.999;

/// Alpha at or below which a color is treated as fully transparent.
pub const TRANSPARENT_ALPHA: f64 = 0.001;

/// sRGB color with integer channels and a fractional alpha.
///
/// `a` is a blend fraction in `[0, 1]`, never a byte.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha as a fraction in `[0, 1]`.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    /// Build an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a color with alpha; non-finite alpha is treated as opaque, and the value is clamped.
    pub fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: clamp_alpha(a),
        }
    }

    /// Build a color from unit-range float channels (`0.0..=1.0`).
    pub fn from_unit(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::rgba(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b), a)
    }

    /// Same channels with a different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Multiply alpha by `factor` (node or paint opacity).
    pub fn scale_alpha(self, factor: f64) -> Self {
        self.with_alpha(self.a * clamp_alpha(factor))
    }

    /// Same channels, fully opaque.
    pub fn opaque(self) -> Self {
        self.with_alpha(1.0)
    }

    /// Return `true` when alpha is at least [`OPAQUE_ALPHA`].
    pub fn is_opaque(self) -> bool {
        self.a >= OPAQUE_ALPHA
    }

    /// Return `true` when alpha is at most [`TRANSPARENT_ALPHA`].
    pub fn is_transparent(self) -> bool {
        self.a <= TRANSPARENT_ALPHA
    }

    /// Render as `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let a = (self.a * 255.0).round().clamp(0.0, 255.0) as u8;
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, a)
        }
    }

    /// Channels as an `[r, g, b]` array.
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;
        crate::color::parse::color_from_value(&v)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized color value: {v}")))
    }
}

fn clamp_alpha(a: f64) -> f64 {
    if a.is_finite() { a.clamp(0.0, 1.0) } else { 1.0 }
}

fn unit_to_u8(x: f64) -> u8 {
    if !x.is_finite() {
        return 0;
    }
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Axis-aligned rectangle in a node's local or absolute coordinate space.
///
/// Which space is active is tracked by the owning target, not per node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width (non-negative for well-formed input).
    pub width: f64,
    /// Height (non-negative for well-formed input).
    pub height: f64,
}

impl Bounds {
    /// Build bounds from origin and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Return `true` when every component is finite and the size is non-negative.
    pub fn is_well_formed(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Convert to a `kurbo::Rect`.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Translate by `offset`.
    pub fn translate(self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..self
        }
    }

    /// Return `true` when `self` contains `inner` within `tolerance` on every edge.
    pub fn covers(self, inner: Bounds, tolerance: f64) -> bool {
        let outer = self.to_rect().inflate(tolerance, tolerance);
        let inner = inner.to_rect();
        outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
    }
}

impl From<Rect> for Bounds {
    fn from(r: Rect) -> Self {
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

/// Arena index of a node inside a [`crate::Target`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    /// Index as `usize` for slice access.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
