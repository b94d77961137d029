use crate::foundation::core::Viewport;

/// Target coarse-cell count used when a session does not override it.
pub const DEFAULT_TARGET_CELLS: u32 = 160;

/// How far the column scan strays from the aspect-ratio estimate.
const COLUMN_SCAN_RADIUS: i64 = 6;
const ASPECT_WEIGHT: f64 = 0.75;
const COUNT_WEIGHT: f64 = 0.25;

/// Coarse grid fitted to a viewport.
///
/// Each coarse cell holds a 2x2 block of square fine cells of `cell_px` pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridLayout {
    /// Coarse columns.
    pub cols: u32,
    /// Coarse rows.
    pub rows: u32,
    /// Side of one fine cell in viewport pixels.
    pub cell_px: f64,
}

impl GridLayout {
    pub fn fine_cols(&self) -> u32 {
        self.cols * 2
    }

    pub fn fine_rows(&self) -> u32 {
        self.rows * 2
    }

    pub fn coarse_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    pub fn fine_count(&self) -> usize {
        self.fine_cols() as usize * self.fine_rows() as usize
    }

    /// Same column/row structure, ignoring pixel size.
    pub fn same_shape(&self, other: &GridLayout) -> bool {
        self.cols == other.cols && self.rows == other.rows
    }
}

/// Fit a grid of roughly `target_cells` coarse cells to `viewport`.
///
/// Candidates are scanned outward from the aspect-ratio estimate; the lowest weighted score wins
/// and the earliest candidate keeps ties, so the result is deterministic and depends only on the
/// viewport's aspect ratio.
pub fn compute_grid_layout(viewport: Viewport, target_cells: u32) -> GridLayout {
    let Viewport { width, height } = viewport.clamped();
    let target = i64::from(target_cells.max(1));
    let aspect = width / height;

    let estimate = ((target as f64 * aspect).sqrt().round() as i64).max(1);

    let mut best: Option<(f64, i64, i64)> = None;
    for delta in scan_offsets() {
        let cols = estimate + delta;
        if cols < 1 {
            continue;
        }
        let rows = rows_for(cols, target);
        let score = layout_score(cols, rows, aspect, target);
        if best.is_none_or(|(s, _, _)| score < s) {
            best = Some((score, cols, rows));
        }
    }

    let (_, cols, rows) = best.unwrap_or((0.0, 1, 1));
    let cols = u32::try_from(cols).unwrap_or(u32::MAX);
    let rows = u32::try_from(rows).unwrap_or(u32::MAX);
    let cell_px = (width / (f64::from(cols) * 2.0)).min(height / (f64::from(rows) * 2.0));

    GridLayout {
        cols,
        rows,
        cell_px: cell_px.max(0.0),
    }
}

// 0, -1, +1, -2, +2, ...
fn scan_offsets() -> impl Iterator<Item = i64> {
    std::iter::once(0).chain((1..=COLUMN_SCAN_RADIUS).flat_map(|d| [-d, d]))
}

fn rows_for(cols: i64, target: i64) -> i64 {
    let lo = (target / cols).max(1);
    let hi = lo + 1;
    if (cols * hi - target).abs() < (cols * lo - target).abs() {
        hi
    } else {
        lo
    }
}

fn layout_score(cols: i64, rows: i64, aspect: f64, target: i64) -> f64 {
    let ratio = cols as f64 / rows as f64;
    let aspect_dev = (ratio / aspect).ln().abs();
    let count_dev = ((cols * rows - target).abs() as f64) / target as f64;
    ASPECT_WEIGHT * aspect_dev + COUNT_WEIGHT * count_dev
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
