use std::collections::VecDeque;

use crate::clock::scheduler::ClockId;
use crate::foundation::core::{CellCoord, Viewport};
use crate::foundation::error::{PulseError, PulseResult};
use crate::layout::grid::{DEFAULT_TARGET_CELLS, GridLayout, compute_grid_layout};
use crate::surface::{
    CellArena, CellPaint, DirtyReasons, GlobalStyle, Layer, Notice, RenderSurface,
};

/// Notices kept before the oldest is dropped.
pub const NOTICE_CAPACITY: usize = 64;

/// In-memory render surface backed by two cell arenas.
///
/// Used by the CLI and tests, and as the reference for host adapters.
#[derive(Debug)]
pub struct GridSurface {
    target_cells: u32,
    viewport: Option<Viewport>,
    grid: Option<GridLayout>,
    coarse: CellArena,
    fine: CellArena,
    globals: GlobalStyle,
    notices: VecDeque<Notice>,
    dirty: DirtyReasons,
    owner: Option<ClockId>,
    frame_requested: bool,
}

impl Default for GridSurface {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_CELLS)
    }
}

impl GridSurface {
    /// Unmounted surface that fits grids of about `target_cells` coarse cells.
    pub fn new(target_cells: u32) -> Self {
        Self {
            target_cells: target_cells.max(1),
            viewport: None,
            grid: None,
            coarse: CellArena::default(),
            fine: CellArena::default(),
            globals: GlobalStyle::default(),
            notices: VecDeque::new(),
            dirty: DirtyReasons::default(),
            owner: None,
            frame_requested: false,
        }
    }

    pub fn target_cells(&self) -> u32 {
        self.target_cells
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn is_mounted(&self) -> bool {
        self.grid.is_some()
    }

    /// Attach to `viewport`, building the cell arenas.
    pub fn mount(&mut self, viewport: Viewport) -> GridLayout {
        self.resize(viewport)
    }

    /// Refit the grid. Arenas (and their paint) are rebuilt only when the column/row structure
    /// changes; a resize is always recorded.
    pub fn resize(&mut self, viewport: Viewport) -> GridLayout {
        let viewport = viewport.clamped();
        let layout = compute_grid_layout(viewport, self.target_cells);
        let rebuild = self.grid.is_none_or(|g| !g.same_shape(&layout));
        if rebuild {
            self.coarse = CellArena::new(layout.cols, layout.rows);
            self.fine = CellArena::new(layout.fine_cols(), layout.fine_rows());
            self.mark_structure_changed();
            tracing::debug!(cols = layout.cols, rows = layout.rows, "grid rebuilt");
        }
        self.dirty.merge(DirtyReasons::RESIZE);
        self.viewport = Some(viewport);
        self.grid = Some(layout);
        layout
    }

    /// Detach; every cell is destroyed.
    pub fn unmount(&mut self) {
        if self.grid.take().is_some() {
            self.coarse = CellArena::default();
            self.fine = CellArena::default();
            self.viewport = None;
            self.mark_structure_changed();
        }
    }

    /// Record a structural change. Hosts call this when cells were replaced behind the engine's
    /// back; programs redraw on the next frame.
    pub fn mark_structure_changed(&mut self) {
        self.dirty.merge(DirtyReasons::STRUCTURE);
    }

    pub fn coarse(&self) -> &CellArena {
        &self.coarse
    }

    pub fn fine(&self) -> &CellArena {
        &self.fine
    }

    /// Take queued notices, oldest first. Only the latest [`NOTICE_CAPACITY`] are kept, so a
    /// host that never drains loses old notices rather than growing the queue.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn owner(&self) -> Option<ClockId> {
        self.owner
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Consume a pending frame request, as the host does when it runs the callback.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    fn arena(&self, layer: Layer) -> &CellArena {
        match layer {
            Layer::Coarse => &self.coarse,
            Layer::Fine => &self.fine,
        }
    }
}

impl RenderSurface for GridSurface {
    fn grid(&self) -> Option<GridLayout> {
        self.grid
    }

    fn cell(&self, layer: Layer, at: CellCoord) -> Option<&CellPaint> {
        self.arena(layer).get(at)
    }

    fn cell_mut(&mut self, layer: Layer, at: CellCoord) -> Option<&mut CellPaint> {
        match layer {
            Layer::Coarse => self.coarse.get_mut(at),
            Layer::Fine => self.fine.get_mut(at),
        }
    }

    fn globals(&self) -> &GlobalStyle {
        &self.globals
    }

    fn globals_mut(&mut self) -> &mut GlobalStyle {
        &mut self.globals
    }

    fn notify(&mut self, notice: Notice) {
        if self.notices.len() == NOTICE_CAPACITY {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    fn take_dirty(&mut self) -> DirtyReasons {
        std::mem::take(&mut self.dirty)
    }

    fn claim(&mut self, clock: ClockId) -> PulseResult<()> {
        match self.owner {
            Some(current) if current != clock => Err(PulseError::validation(
                "render surface is already driven by another clock",
            )),
            _ => {
                self.owner = Some(clock);
                Ok(())
            }
        }
    }

    fn release(&mut self, clock: ClockId) {
        if self.owner == Some(clock) {
            self.owner = None;
        }
    }

    fn request_frame(&mut self) -> bool {
        !std::mem::replace(&mut self.frame_requested, true)
    }

    fn cancel_frame(&mut self) {
        self.frame_requested = false;
    }

    fn clear_paint(&mut self) {
        self.coarse.reset();
        self.fine.reset();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/grid_surface.rs"]
mod tests;
