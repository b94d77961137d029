use std::collections::BTreeSet;

use crate::foundation::core::CellCoord;

/// One stroke of the 14-segment display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Segment {
    Top,
    TopRight,
    BottomRight,
    Bottom,
    BottomLeft,
    TopLeft,
    MidLeft,
    MidRight,
    DiagUpLeft,
    UpCenter,
    DiagUpRight,
    DiagDownLeft,
    DownCenter,
    DiagDownRight,
}

impl Segment {
    pub const ALL: [Segment; 14] = [
        Self::Top,
        Self::TopRight,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::TopLeft,
        Self::MidLeft,
        Self::MidRight,
        Self::DiagUpLeft,
        Self::UpCenter,
        Self::DiagUpRight,
        Self::DiagDownLeft,
        Self::DownCenter,
        Self::DiagDownRight,
    ];

    const fn bit(self) -> u16 {
        1 << self as u8
    }

    /// Stroke endpoints in unit-square coordinates, `y` downward.
    fn endpoints(self) -> ((f64, f64), (f64, f64)) {
        const TL: (f64, f64) = (0.0, 0.0);
        const TC: (f64, f64) = (0.5, 0.0);
        const TR: (f64, f64) = (1.0, 0.0);
        const ML: (f64, f64) = (0.0, 0.5);
        const C: (f64, f64) = (0.5, 0.5);
        const MR: (f64, f64) = (1.0, 0.5);
        const BL: (f64, f64) = (0.0, 1.0);
        const BC: (f64, f64) = (0.5, 1.0);
        const BR: (f64, f64) = (1.0, 1.0);
        match self {
            Self::Top => (TL, TR),
            Self::TopRight => (TR, MR),
            Self::BottomRight => (MR, BR),
            Self::Bottom => (BL, BR),
            Self::BottomLeft => (ML, BL),
            Self::TopLeft => (TL, ML),
            Self::MidLeft => (ML, C),
            Self::MidRight => (C, MR),
            Self::DiagUpLeft => (TL, C),
            Self::UpCenter => (TC, C),
            Self::DiagUpRight => (TR, C),
            Self::DiagDownLeft => (BL, C),
            Self::DownCenter => (C, BC),
            Self::DiagDownRight => (C, BR),
        }
    }
}

const A: u16 = Segment::Top.bit();
const B: u16 = Segment::TopRight.bit();
const C: u16 = Segment::BottomRight.bit();
const D: u16 = Segment::Bottom.bit();
const E: u16 = Segment::BottomLeft.bit();
const F: u16 = Segment::TopLeft.bit();
const G1: u16 = Segment::MidLeft.bit();
const G2: u16 = Segment::MidRight.bit();
const H: u16 = Segment::DiagUpLeft.bit();
const I: u16 = Segment::UpCenter.bit();
const J: u16 = Segment::DiagUpRight.bit();
const K: u16 = Segment::DiagDownLeft.bit();
const L: u16 = Segment::DownCenter.bit();
const M: u16 = Segment::DiagDownRight.bit();

/// Drawn for characters the font does not know.
const PLACEHOLDER: u16 = A | B | C | D | E | F | H | J | K | M;

/// Segment mask for `c`, or `None` when the font has no glyph for it.
pub fn segment_mask(c: char) -> Option<u16> {
    let c = c.to_uppercase().next().unwrap_or(c);
    let mask = match c {
        '0' => A | B | C | D | E | F | J | K,
        '1' => B | C | J,
        '2' => A | B | G1 | G2 | E | D,
        '3' => A | B | G2 | C | D,
        '4' => F | G1 | G2 | B | C,
        '5' => A | F | G1 | G2 | C | D,
        '6' => A | F | G1 | G2 | E | C | D,
        '7' => A | B | C,
        '8' => A | B | C | D | E | F | G1 | G2,
        '9' => A | B | C | D | F | G1 | G2,
        'A' => A | B | C | E | F | G1 | G2,
        'B' => A | B | C | D | I | L | G2,
        'C' => A | D | E | F,
        'D' => A | B | C | D | I | L,
        'E' => A | D | E | F | G1,
        'F' => A | E | F | G1,
        'G' => A | C | D | E | F | G2,
        'H' => B | C | E | F | G1 | G2,
        'I' => A | D | I | L,
        'J' => B | C | D | E,
        'K' => E | F | G1 | J | M,
        'L' => D | E | F,
        'M' => B | C | E | F | H | J,
        'N' => B | C | E | F | H | M,
        'O' => A | B | C | D | E | F,
        'P' => A | B | E | F | G1 | G2,
        'Q' => A | B | C | D | E | F | M,
        'R' => A | B | E | F | G1 | G2 | M,
        'S' => A | F | G1 | G2 | C | D,
        'T' => A | I | L,
        'U' => B | C | D | E | F,
        'V' => E | F | K | J,
        'W' => B | C | E | F | K | M,
        'X' => H | J | K | M,
        'Y' => H | J | L,
        'Z' => A | D | J | K,
        'Å' => A | B | C | E | F | G1 | G2 | I,
        'Ä' => B | C | E | F | G1 | G2 | H | J,
        'Ö' => B | C | D | E | F | H | J,
        'Æ' => A | D | E | F | G1 | G2 | I | L,
        'Ø' => A | B | C | D | E | F | J | K,
        ' ' => 0,
        '-' => G1 | G2,
        '_' => D,
        '+' => G1 | G2 | I | L,
        '*' => G1 | G2 | H | I | J | K | L | M,
        '/' => J | K,
        '\\' => H | M,
        '=' => G1 | G2 | D,
        '?' => A | B | G2 | L,
        '!' => I | D,
        '\'' => J,
        '"' => F | I,
        '(' | '<' => J | M,
        ')' | '>' => H | K,
        ',' => K,
        '.' => L,
        _ => return None,
    };
    Some(mask)
}

pub fn supports(c: char) -> bool {
    segment_mask(c).is_some()
}

/// Segments lit for `c`, placeholder box included.
pub fn segments_for(c: char) -> Vec<Segment> {
    let mask = segment_mask(c).unwrap_or(PLACEHOLDER);
    Segment::ALL
        .into_iter()
        .filter(|s| mask & s.bit() != 0)
        .collect()
}

/// Rasterize `c` into a centered square inside a `cols` x `rows` fine grid.
///
/// The square keeps a margin of one eighth of the short side (at least one cell) when there is
/// room for it. Output is sorted and free of duplicates.
pub fn render_segment_char(c: char, cols: u32, rows: u32) -> Vec<CellCoord> {
    let short = cols.min(rows);
    if short == 0 {
        return Vec::new();
    }
    let margin = (short / 8).max(1);
    let side = if short > margin * 2 + 2 {
        short - margin * 2
    } else {
        short
    };
    let ox = i64::from((cols - side) / 2);
    let oy = i64::from((rows - side) / 2);
    let span = f64::from(side - 1);
    let to_cell = |(u, v): (f64, f64)| {
        (
            ox + (u * span).round() as i64,
            oy + (v * span).round() as i64,
        )
    };

    let mut out = BTreeSet::new();
    for seg in segments_for(c) {
        let (a, b) = seg.endpoints();
        for (x, y) in line(to_cell(a), to_cell(b)) {
            if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y))
                && x < cols
                && y < rows
            {
                out.insert(CellCoord::new(x, y));
            }
        }
    }
    out.into_iter().collect()
}

/// Bresenham line, both endpoints included.
fn line((x0, y0): (i64, i64), (x1, y1): (i64, i64)) -> Vec<(i64, i64)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut out = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        out.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/glyph/segment.rs"]
mod tests;
