use rand::Rng;

use crate::foundation::core::{Color, Shadow};

/// Glow radius used for pulse shadows.
pub const PULSE_GLOW_PX: f32 = 8.0;

/// How pulse colors are chosen on each sub-beat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    /// Always white.
    #[default]
    White,
    /// A random pick from [`RANDOM_PALETTE`], never the same color twice in a row.
    Random,
}

impl PaletteMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Random => "random",
        }
    }
}

pub const RANDOM_PALETTE: [Color; 8] = [
    Color::rgb(0xff, 0x3b, 0x6b),
    Color::rgb(0xff, 0x9f, 0x1c),
    Color::rgb(0xff, 0xe6, 0x4a),
    Color::rgb(0x5c, 0xff, 0x7a),
    Color::rgb(0x2e, 0xe6, 0xd6),
    Color::rgb(0x3d, 0x8b, 0xff),
    Color::rgb(0xa0, 0x5c, 0xff),
    Color::rgb(0xff, 0x5c, 0xe1),
];

/// Color plus glow published for the current sub-beat.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PulseStyle {
    pub color: Color,
    pub shadow: Shadow,
}

impl PulseStyle {
    pub fn of(color: Color) -> Self {
        Self {
            color,
            shadow: Shadow::glow(color, PULSE_GLOW_PX),
        }
    }
}

impl Default for PulseStyle {
    fn default() -> Self {
        Self::of(Color::WHITE)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Palette {
    mode: PaletteMode,
    last: Option<usize>,
}

impl Palette {
    pub fn new(mode: PaletteMode) -> Self {
        Self { mode, last: None }
    }

    pub fn mode(&self) -> PaletteMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PaletteMode) {
        if self.mode != mode {
            self.mode = mode;
            self.last = None;
        }
    }

    /// Pick the pulse style for a new sub-beat.
    pub fn next_pulse<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PulseStyle {
        match self.mode {
            PaletteMode::White => PulseStyle::of(Color::WHITE),
            PaletteMode::Random => {
                let n = RANDOM_PALETTE.len();
                let idx = match self.last {
                    // Skip the previous slot by drawing from the remaining n-1.
                    Some(prev) => (prev + 1 + rng.random_range(0..n - 1)) % n,
                    None => rng.random_range(0..n),
                };
                self.last = Some(idx);
                PulseStyle::of(RANDOM_PALETTE[idx])
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/palette.rs"]
mod tests;
