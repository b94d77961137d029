//! What the engine needs from its host: cells by coordinate, published globals and change
//! tracking.

pub mod cell;
pub mod grid_surface;
pub mod raster;

use crate::clock::meter::MusicalPosition;
use crate::clock::palette::{PaletteMode, PulseStyle};
use crate::clock::scheduler::ClockId;
use crate::foundation::core::{CellCoord, Color};
use crate::foundation::error::PulseResult;
use crate::layout::grid::GridLayout;

pub use cell::{AnimKind, CellAnim, CellArena, CellPaint, HoldState, ProgramTag};
pub use grid_surface::GridSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// `cols` x `rows` grid cells.
    Coarse,
    /// `cols*2` x `rows*2` sub-cells.
    Fine,
}

/// Zone partition published by `m-s-zones`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ZoneStyle {
    pub count: u32,
    pub colors: Vec<Color>,
}

/// Global style variables the engine publishes for the host.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct GlobalStyle {
    pub bar: u64,
    pub beat: u32,
    pub sub_beat: u32,
    pub eighth: u32,
    pub palette: PaletteMode,
    pub pulse: Option<PulseStyle>,
    pub zones: Option<ZoneStyle>,
}

impl GlobalStyle {
    pub fn set_position(&mut self, pos: MusicalPosition, eighth: u32) {
        self.bar = pos.bar;
        self.beat = pos.beat;
        self.sub_beat = pos.sub_beat;
        self.eighth = eighth;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Out-of-band notification for host consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Notice {
    ZoneCount(u32),
}

/// Why cells need to be redrawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyReasons {
    /// Cells were created or destroyed.
    pub structure: bool,
    pub resize: bool,
    pub text: bool,
}

impl DirtyReasons {
    pub const STRUCTURE: Self = Self {
        structure: true,
        resize: false,
        text: false,
    };
    pub const RESIZE: Self = Self {
        structure: false,
        resize: true,
        text: false,
    };
    pub const TEXT: Self = Self {
        structure: false,
        resize: false,
        text: true,
    };

    pub fn any(&self) -> bool {
        self.structure || self.resize || self.text
    }

    pub fn merge(&mut self, other: DirtyReasons) {
        self.structure |= other.structure;
        self.resize |= other.resize;
        self.text |= other.text;
    }
}

/// Host-side render surface.
///
/// All methods are called from the frame callback; implementations need no locking. Every
/// engine operation degrades to a no-op while [`RenderSurface::grid`] is `None`.
pub trait RenderSurface {
    /// Active grid, `None` before mount.
    fn grid(&self) -> Option<GridLayout>;

    fn cell(&self, layer: Layer, at: CellCoord) -> Option<&CellPaint>;

    fn cell_mut(&mut self, layer: Layer, at: CellCoord) -> Option<&mut CellPaint>;

    fn globals(&self) -> &GlobalStyle;

    fn globals_mut(&mut self) -> &mut GlobalStyle;

    /// Queue a notice for the host. Hosts drain the queue; implementations may bound it.
    fn notify(&mut self, notice: Notice);

    /// Structural and size changes since the last call.
    fn take_dirty(&mut self) -> DirtyReasons;

    /// Admit `clock` as the single active clock. Fails while another clock holds the surface.
    fn claim(&mut self, clock: ClockId) -> PulseResult<()>;

    fn release(&mut self, clock: ClockId);

    /// Schedule a callback before the next repaint. Returns `false` when one is already pending.
    fn request_frame(&mut self) -> bool;

    fn cancel_frame(&mut self);

    /// Coordinates of `layer` in row-major order.
    fn layer_coords(&self, layer: Layer) -> Vec<CellCoord> {
        let Some(grid) = self.grid() else {
            return Vec::new();
        };
        let (w, h) = match layer {
            Layer::Coarse => (grid.cols, grid.rows),
            Layer::Fine => (grid.fine_cols(), grid.fine_rows()),
        };
        cell::coords(w, h).collect()
    }

    /// Fine cells owned by any program.
    fn marked_cells(&self) -> Vec<CellCoord> {
        self.layer_coords(Layer::Fine)
            .into_iter()
            .filter(|&c| self.cell(Layer::Fine, c).is_some_and(CellPaint::is_marked))
            .collect()
    }

    /// Fine cells free for per-cell effects.
    fn eligible_cells(&self) -> Vec<CellCoord> {
        self.layer_coords(Layer::Fine)
            .into_iter()
            .filter(|&c| self.cell(Layer::Fine, c).is_some_and(|p| !p.is_marked()))
            .collect()
    }

    /// Reset the paint of every cell on both layers.
    fn clear_paint(&mut self) {
        for layer in [Layer::Coarse, Layer::Fine] {
            for at in self.layer_coords(layer) {
                if let Some(paint) = self.cell_mut(layer, at) {
                    *paint = CellPaint::default();
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/mod.rs"]
mod tests;
