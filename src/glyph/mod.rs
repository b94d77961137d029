//! Text to fine-cell coordinate sets.
//!
//! Two independent fonts: a 14-segment font that fills the grid with one large character, and a
//! 5x5 bitmap font for wrapped, aligned strings.

pub mod bitmap;
pub mod segment;

use crate::foundation::core::CellCoord;

/// Cells for `text` on a `cols` x `rows` fine grid.
///
/// A single character the segment font knows is drawn large with it; anything else goes through
/// the bitmap font, alignment suffixes included.
pub fn render_text(text: &str, cols: u32, rows: u32) -> Vec<CellCoord> {
    let (body, _) = bitmap::split_alignment(text);
    let mut chars = body.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != ' ' && segment::supports(c) => {
            segment::render_segment_char(c, cols, rows)
        }
        _ => bitmap::render_bitmap_text(text, cols, rows),
    }
}
