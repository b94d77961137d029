use crate::glyph;
use crate::program::clear_owned;
use crate::program::frame_loop::{FrameLoop, FrameState};
use crate::surface::{DirtyReasons, Layer, ProgramTag, RenderSurface};

/// Glyph overlay program behind `pixel-write:<text>`.
///
/// Each draw clears the cells the writer owns and marks the new glyph cells, so applying the
/// same text twice leaves the surface unchanged.
#[derive(Clone, Debug, Default)]
pub struct PixelWriter {
    text: Option<String>,
    frame: FrameLoop,
    marked: usize,
}

impl PixelWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Cells marked by the last draw.
    pub fn marked(&self) -> usize {
        self.marked
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame.state()
    }

    /// Show `text` now. Empty text clears the writer's cells and marks none.
    pub fn apply_pixel_writer_text(&mut self, text: &str, surface: &mut dyn RenderSurface) -> usize {
        self.text = (!text.is_empty()).then(|| text.to_owned());
        self.frame.cancel();
        self.draw(surface)
    }

    /// Queue a redraw of the current text. No-op while the writer shows nothing.
    pub fn invalidate(&mut self, reasons: DirtyReasons) -> bool {
        if self.text.is_none() {
            return false;
        }
        self.frame.invalidate(reasons)
    }

    /// Run a queued redraw, if any.
    pub fn render_pending(&mut self, surface: &mut dyn RenderSurface) -> Option<usize> {
        let reasons = self.frame.begin()?;
        tracing::trace!(?reasons, "pixel writer redraw");
        let marked = self.draw(surface);
        self.frame.finish();
        Some(marked)
    }

    /// Cancel queued work and clear owned cells.
    pub fn stop(&mut self, surface: &mut dyn RenderSurface) {
        self.frame.cancel();
        self.text = None;
        clear_owned(surface, ProgramTag::PixelWriter);
        self.marked = 0;
    }

    fn draw(&mut self, surface: &mut dyn RenderSurface) -> usize {
        clear_owned(surface, ProgramTag::PixelWriter);
        let (Some(text), Some(grid)) = (self.text.as_deref(), surface.grid()) else {
            self.marked = 0;
            return 0;
        };
        let cells = glyph::render_text(text, grid.fine_cols(), grid.fine_rows());
        let mut marked = 0;
        for at in cells {
            if let Some(paint) = surface.cell_mut(Layer::Fine, at) {
                paint.mark(ProgramTag::PixelWriter);
                marked += 1;
            }
        }
        self.marked = marked;
        marked
    }
}

#[cfg(test)]
#[path = "../../tests/unit/program/writer.rs"]
mod tests;
