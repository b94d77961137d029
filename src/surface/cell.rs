use crate::foundation::core::{CellCoord, Color, Shadow};

/// Program that owns (marks) a fine cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ProgramTag {
    PixelWriter,
    Ring,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum AnimKind {
    /// Full strength at the start, fading linearly to nothing.
    Pulse,
    /// Full strength for the whole duration, then off.
    Flash,
}

/// Restartable per-cell animation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CellAnim {
    pub kind: AnimKind,
    pub started_ms: f64,
    pub duration_ms: f64,
    pub color: Color,
}

impl CellAnim {
    /// Strength in `0..=1` at `now_ms`; zero outside the animation window.
    pub fn intensity(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        let t = (now_ms - self.started_ms) / self.duration_ms;
        if !(0.0..1.0).contains(&t) {
            return 0.0;
        }
        match self.kind {
            AnimKind::Pulse => 1.0 - t,
            AnimKind::Flash => 1.0,
        }
    }
}

/// Sustained style that lasts until `until_ms`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct HoldState {
    pub until_ms: f64,
    pub color: Option<Color>,
    pub shadow: Option<Shadow>,
}

impl HoldState {
    pub fn is_active(&self, now_ms: f64) -> bool {
        now_ms < self.until_ms
    }
}

/// Paint attributes of one cell. The surface owns the cell; the engine only edits these.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CellPaint {
    pub opacity: f32,
    pub color: Option<Color>,
    pub shadow: Option<Shadow>,
    /// Program owning the cell; owned cells are "marked".
    pub owner: Option<ProgramTag>,
    pub anim: Option<CellAnim>,
    pub hold: Option<HoldState>,
    pub zone: Option<u32>,
}

impl CellPaint {
    pub fn is_marked(&self) -> bool {
        self.owner.is_some()
    }

    /// Hold state still in effect at `now_ms`.
    pub fn hold_at(&self, now_ms: f64) -> Option<&HoldState> {
        self.hold.as_ref().filter(|h| h.is_active(now_ms))
    }

    /// Start `anim` from scratch. Any hold is dropped.
    pub fn restart(&mut self, anim: CellAnim) {
        self.anim = Some(anim);
        self.hold = None;
    }

    /// Drop animation, hold and zone styling; ownership is kept.
    pub fn clear_effects(&mut self) {
        self.anim = None;
        self.hold = None;
        self.zone = None;
        self.color = None;
        self.shadow = None;
    }

    /// Mark the cell for `tag`.
    pub fn mark(&mut self, tag: ProgramTag) {
        self.owner = Some(tag);
        self.opacity = 1.0;
        self.anim = None;
        self.hold = None;
    }

    /// Unmark the cell when `tag` owns it. Returns whether it did.
    pub fn unmark(&mut self, tag: ProgramTag) -> bool {
        if self.owner != Some(tag) {
            return false;
        }
        self.owner = None;
        self.opacity = 0.0;
        true
    }
}

/// Row-major 2D store of cell paint, indexed by coordinate.
#[derive(Clone, Debug, Default)]
pub struct CellArena {
    width: u32,
    height: u32,
    cells: Vec<CellPaint>,
}

impl CellArena {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![CellPaint::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn index_of(&self, at: CellCoord) -> Option<usize> {
        (at.x < self.width && at.y < self.height)
            .then(|| at.y as usize * self.width as usize + at.x as usize)
    }

    pub fn get(&self, at: CellCoord) -> Option<&CellPaint> {
        self.index_of(at).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, at: CellCoord) -> Option<&mut CellPaint> {
        self.index_of(at).map(|i| &mut self.cells[i])
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &CellPaint)> + '_ {
        coords(self.width, self.height).zip(self.cells.iter())
    }

    /// Reset every cell to its default paint.
    pub fn reset(&mut self) {
        self.cells.fill(CellPaint::default());
    }
}

/// Row-major coordinates of a `width` x `height` space.
pub fn coords(width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    (0..height).flat_map(move |y| (0..width).map(move |x| CellCoord::new(x, y)))
}

#[cfg(test)]
#[path = "../../tests/unit/surface/cell.rs"]
mod tests;
