use std::fmt;

use crate::foundation::core::Color;
use crate::foundation::error::{PulseError, PulseResult};

/// Reserved prefix that routes the remainder of the action string to the pixel writer.
pub const PIXEL_WRITE_PREFIX: &str = "pixel-write:";

/// Which cell layer an action addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellScope {
    /// One coarse grid unit.
    Coarse,
    /// The 2x2 sub-cells used for glyphs and pulses.
    Fine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelVariant {
    Pulse,
    Flash,
}

impl PixelVariant {
    fn parse(s: &str) -> PulseResult<Self> {
        match s {
            "pulse" => Ok(Self::Pulse),
            "flash" => Ok(Self::Flash),
            other => Err(PulseError::action(format!(
                "variant must be pulse or flash, got \"{other}\""
            ))),
        }
    }
}

/// Typed sheet action, parsed once when a sheet is loaded.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Render text through the glyph renderers; empty text clears the writer.
    PixelWrite { text: String },
    /// Split coarse cells into `count` index-ordered zones colored from `colors`.
    Zones { count: u32, colors: Vec<Color> },
    /// Pulse every coarse cell and the fine cells around marked ones.
    MatrixPulse,
    /// Flash every coarse cell and the fine cells around marked ones.
    MatrixFlash,
    FinePulse,
    FineFlash,
    /// Freeze the current pulse style on `scope` cells.
    Hold { scope: CellScope, bars: u32 },
    RandomPixel { count: u32, variant: PixelVariant },
    /// Outline the fine grid `inset` cells from the edge.
    Ring { inset: u32 },
    RingClear,
    /// Drop animations, holds and zones from every cell.
    ClearAll,
    /// Base not understood by this engine; dispatching it does nothing.
    Unknown { base: String },
}

impl Action {
    /// Parse `base[@key=value(,key=value)*]` or `pixel-write:<text>`.
    pub fn parse(src: &str) -> PulseResult<Self> {
        let src = src.trim();
        if src.is_empty() {
            return Err(PulseError::action("action must be non-empty"));
        }
        if let Some(text) = src.strip_prefix(PIXEL_WRITE_PREFIX) {
            return Ok(Self::PixelWrite {
                text: text.to_owned(),
            });
        }

        let (base, params) = match src.split_once('@') {
            Some((base, rest)) => (base.trim(), Params::parse(rest)?),
            None => (src, Params::default()),
        };

        let action = match base {
            "pixel-clear" => Self::PixelWrite {
                text: String::new(),
            },
            "m-s-zones" => {
                let colors = match params.get("colors") {
                    Some(list) => list
                        .split('|')
                        .filter(|c| !c.trim().is_empty())
                        .map(Color::parse)
                        .collect::<PulseResult<Vec<_>>>()
                        .map_err(|e| PulseError::action(format!("{base}: {e}")))?,
                    None => Vec::new(),
                };
                let default_count = u32::try_from(colors.len()).unwrap_or(u32::MAX).max(1);
                let count = params.u32_or(base, "count", default_count)?;
                if count == 0 {
                    return Err(PulseError::action(format!("{base}: count must be > 0")));
                }
                Self::Zones { count, colors }
            }
            "m-s-beatpulse" => Self::MatrixPulse,
            "m-s-beatflash" => Self::MatrixFlash,
            "i-s-beatpulse" | "s-i-beatpulse" => Self::FinePulse,
            "i-s-beatflash" | "s-i-beatflash" => Self::FineFlash,
            "i-s-beathold" | "m-s-beathold" => {
                let bars = params.u32_or(base, "bars", 1)?;
                if bars == 0 {
                    return Err(PulseError::action(format!("{base}: bars must be > 0")));
                }
                let scope = if base.starts_with('m') {
                    CellScope::Coarse
                } else {
                    CellScope::Fine
                };
                Self::Hold { scope, bars }
            }
            "random-pixel" | "random-pixel-pulse" | "random-pixel-flash" => {
                let implied = if base.ends_with("-flash") {
                    PixelVariant::Flash
                } else {
                    PixelVariant::Pulse
                };
                let variant = match params.get("variant") {
                    Some(v) => PixelVariant::parse(v)?,
                    None => implied,
                };
                let count = params.u32_or(base, "count", 1)?;
                Self::RandomPixel { count, variant }
            }
            "pixel-ring" => Self::Ring {
                inset: params.u32_or(base, "inset", 0)?,
            },
            "pixel-ring-clear" => Self::RingClear,
            "clear-all" => Self::ClearAll,
            other => Self::Unknown {
                base: other.to_owned(),
            },
        };
        Ok(action)
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PixelWrite { .. } => "pixel-write",
            Self::Zones { .. } => "zones",
            Self::MatrixPulse => "matrix-pulse",
            Self::MatrixFlash => "matrix-flash",
            Self::FinePulse => "fine-pulse",
            Self::FineFlash => "fine-flash",
            Self::Hold { .. } => "hold",
            Self::RandomPixel { .. } => "random-pixel",
            Self::Ring { .. } => "ring",
            Self::RingClear => "ring-clear",
            Self::ClearAll => "clear-all",
            Self::Unknown { .. } => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PixelWrite { text } => write!(f, "{PIXEL_WRITE_PREFIX}{text}"),
            Self::Zones { count, colors } => {
                write!(f, "m-s-zones@count={count}")?;
                if !colors.is_empty() {
                    let list = colors
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("|");
                    write!(f, ",colors={list}")?;
                }
                Ok(())
            }
            Self::MatrixPulse => f.write_str("m-s-beatpulse"),
            Self::MatrixFlash => f.write_str("m-s-beatflash"),
            Self::FinePulse => f.write_str("i-s-beatpulse"),
            Self::FineFlash => f.write_str("i-s-beatflash"),
            Self::Hold { scope, bars } => {
                let base = match scope {
                    CellScope::Coarse => "m-s-beathold",
                    CellScope::Fine => "i-s-beathold",
                };
                write!(f, "{base}@bars={bars}")
            }
            Self::RandomPixel { count, variant } => {
                let variant = match variant {
                    PixelVariant::Pulse => "pulse",
                    PixelVariant::Flash => "flash",
                };
                write!(f, "random-pixel@count={count},variant={variant}")
            }
            Self::Ring { inset } => write!(f, "pixel-ring@inset={inset}"),
            Self::RingClear => f.write_str("pixel-ring-clear"),
            Self::ClearAll => f.write_str("clear-all"),
            Self::Unknown { base } => f.write_str(base),
        }
    }
}

/// `key=value` pairs after the `@`. Later duplicates win.
#[derive(Clone, Debug, Default)]
struct Params(Vec<(String, String)>);

impl Params {
    fn parse(src: &str) -> PulseResult<Self> {
        let mut out = Vec::new();
        for pair in src.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((k, v)) = pair.split_once('=') else {
                return Err(PulseError::action(format!(
                    "parameter \"{pair}\" must be key=value"
                )));
            };
            let k = k.trim();
            if k.is_empty() {
                return Err(PulseError::action(format!(
                    "parameter \"{pair}\" has an empty key"
                )));
            }
            out.push((k.to_owned(), v.trim().to_owned()));
        }
        Ok(Self(out))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn u32_or(&self, base: &str, key: &str, default: u32) -> PulseResult<u32> {
        match self.get(key) {
            Some(v) => v.parse::<u32>().map_err(|_| {
                PulseError::action(format!(
                    "{base}: {key} must be a non-negative integer, got \"{v}\""
                ))
            }),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/action/grammar.rs"]
mod tests;
