use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{PulseError, PulseResult};

/// Opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB`, `#RRGGBB` (leading `#` optional) or one of the named colors
    /// `white`/`black`.
    pub fn parse(s: &str) -> PulseResult<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }
        let hex = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> PulseResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| PulseError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        match hex.len() {
            3 if hex.is_ascii() => {
                let mut out = [0u8; 3];
                for (slot, i) in out.iter_mut().zip(0..3) {
                    let nibble = hex_byte(&hex[i..i + 1])?;
                    *slot = nibble * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 if hex.is_ascii() => Ok(Self::rgb(
                hex_byte(&hex[0..2])?,
                hex_byte(&hex[2..4])?,
                hex_byte(&hex[4..6])?,
            )),
            _ => Err(PulseError::validation(format!(
                "color \"{s}\" must be #RGB, #RRGGBB, white or black"
            ))),
        }
    }

    /// Linear blend from `self` toward `other`.
    pub fn mix(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Self::rgb(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Glow descriptor attached to pulsing cells.
///
/// Displays as a CSS-style `box-shadow` value (`0 0 8px #ffffff`) for hosts that paint with
/// style strings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shadow {
    /// Blur radius in pixels.
    pub blur_px: f32,
    /// Glow color.
    pub color: Color,
}

impl Shadow {
    pub fn glow(color: Color, blur_px: f32) -> Self {
        Self { blur_px, color }
    }
}

impl fmt::Display for Shadow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0 0 {}px {}", self.blur_px, self.color)
    }
}

/// Integer cell coordinate, `x` to the right and `y` downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The coarse cell containing this fine cell.
    pub const fn coarse(self) -> Self {
        Self::new(self.x / 2, self.y / 2)
    }

    /// Orthogonal neighbors inside a `width` x `height` space.
    pub fn neighbors4(self, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
        let CellCoord { x, y } = self;
        [
            (x.checked_sub(1), Some(y)),
            (x.checked_add(1).filter(|&v| v < width), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), y.checked_add(1).filter(|&v| v < height)),
        ]
        .into_iter()
        .filter_map(|(x, y)| Some(CellCoord::new(x?, y?)))
    }
}

/// Viewport size in host pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Copy with both sides clamped to at least one pixel.
    pub fn clamped(self) -> Self {
        fn side(v: f64) -> f64 {
            if v.is_finite() { v.max(1.0) } else { 1.0 }
        }
        Self::new(side(self.width), side(self.height))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
