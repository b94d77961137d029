use std::collections::BTreeSet;

use crate::foundation::core::CellCoord;
use crate::program::clear_owned;
use crate::program::frame_loop::FrameLoop;
use crate::surface::{DirtyReasons, Layer, ProgramTag, RenderSurface};

/// Rectangular outline `inset` fine cells in from the grid edge.
#[derive(Clone, Debug, Default)]
pub struct RingProgram {
    inset: Option<u32>,
    frame: FrameLoop,
}

impl RingProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inset(&self) -> Option<u32> {
        self.inset
    }

    /// Draw the ring now. Cells owned by the pixel writer are left alone.
    pub fn show(&mut self, inset: u32, surface: &mut dyn RenderSurface) -> usize {
        self.inset = Some(inset);
        self.frame.cancel();
        self.draw(surface)
    }

    pub fn clear(&mut self, surface: &mut dyn RenderSurface) -> usize {
        self.frame.cancel();
        self.inset = None;
        clear_owned(surface, ProgramTag::Ring)
    }

    pub fn invalidate(&mut self, reasons: DirtyReasons) -> bool {
        if self.inset.is_none() {
            return false;
        }
        self.frame.invalidate(reasons)
    }

    pub fn render_pending(&mut self, surface: &mut dyn RenderSurface) -> Option<usize> {
        self.frame.begin()?;
        let marked = self.draw(surface);
        self.frame.finish();
        Some(marked)
    }

    fn draw(&mut self, surface: &mut dyn RenderSurface) -> usize {
        clear_owned(surface, ProgramTag::Ring);
        let (Some(inset), Some(grid)) = (self.inset, surface.grid()) else {
            return 0;
        };
        let mut marked = 0;
        for at in ring_cells(grid.fine_cols(), grid.fine_rows(), inset) {
            if let Some(paint) = surface.cell_mut(Layer::Fine, at)
                && paint.owner != Some(ProgramTag::PixelWriter)
            {
                paint.mark(ProgramTag::Ring);
                marked += 1;
            }
        }
        marked
    }
}

/// Outline cells of the rectangle `inset` cells in from each edge of a `cols` x `rows` grid.
pub fn ring_cells(cols: u32, rows: u32, inset: u32) -> Vec<CellCoord> {
    let Some(inner_w) = cols.checked_sub(inset.saturating_mul(2)).filter(|&w| w > 0) else {
        return Vec::new();
    };
    let Some(inner_h) = rows.checked_sub(inset.saturating_mul(2)).filter(|&h| h > 0) else {
        return Vec::new();
    };
    let (x0, y0) = (inset, inset);
    let (x1, y1) = (x0 + inner_w - 1, y0 + inner_h - 1);

    let mut out = BTreeSet::new();
    for x in x0..=x1 {
        out.insert(CellCoord::new(x, y0));
        out.insert(CellCoord::new(x, y1));
    }
    for y in y0..=y1 {
        out.insert(CellCoord::new(x0, y));
        out.insert(CellCoord::new(x1, y));
    }
    out.into_iter().collect()
}

#[cfg(test)]
#[path = "../../tests/unit/program/ring.rs"]
mod tests;
