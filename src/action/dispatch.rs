use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;

use crate::action::grammar::{Action, CellScope, PixelVariant};
use crate::clock::meter::{Boundary, MeterConfig, MusicalPosition};
use crate::clock::palette::PulseStyle;
use crate::foundation::core::{CellCoord, Color};
use crate::program::ring::RingProgram;
use crate::program::writer::PixelWriter;
use crate::surface::{
    AnimKind, CellAnim, DirtyReasons, HoldState, Layer, Notice, RenderSurface, ZoneStyle,
};

/// Fine flash length as a fraction of one beat.
pub const DEFAULT_FLASH_RATIO: f64 = 0.36;

/// Zone colors used when `m-s-zones` names none.
pub const DEFAULT_ZONE_COLORS: [Color; 4] = [
    Color::rgb(0xff, 0x3b, 0x6b),
    Color::rgb(0x3d, 0x8b, 0xff),
    Color::rgb(0x5c, 0xff, 0x7a),
    Color::rgb(0xff, 0xe6, 0x4a),
];

/// Musical context an action fires in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispatchCtx {
    pub position: MusicalPosition,
    pub meter: MeterConfig,
    pub now_ms: f64,
    pub pulse: PulseStyle,
}

impl DispatchCtx {
    fn boundary_ms(&self) -> f64 {
        Boundary::of(&self.position, &self.meter).pulse_duration_ms(&self.meter)
    }

    fn is_bar_start(&self) -> bool {
        Boundary::of(&self.position, &self.meter) == Boundary::BarStart
    }
}

/// What one dispatch changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Cells whose paint was written.
    pub touched: usize,
}

impl DispatchOutcome {
    fn touched(touched: usize) -> Self {
        Self { touched }
    }
}

/// Applies typed actions to a render surface and owns the overlay programs.
pub struct Dispatcher {
    rng: ChaCha8Rng,
    flash_ratio: f64,
    zone_colors: Vec<Color>,
    writer: PixelWriter,
    ring: RingProgram,
}

impl Dispatcher {
    /// `seed` makes random-pixel picks reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            rng,
            flash_ratio: DEFAULT_FLASH_RATIO,
            zone_colors: DEFAULT_ZONE_COLORS.to_vec(),
            writer: PixelWriter::new(),
            ring: RingProgram::new(),
        }
    }

    pub fn with_flash_ratio(mut self, ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            self.flash_ratio = ratio;
        }
        self
    }

    pub fn with_zone_colors(mut self, colors: Vec<Color>) -> Self {
        if !colors.is_empty() {
            self.zone_colors = colors;
        }
        self
    }

    pub fn flash_ratio(&self) -> f64 {
        self.flash_ratio
    }

    pub fn writer(&self) -> &PixelWriter {
        &self.writer
    }

    pub fn ring(&self) -> &RingProgram {
        &self.ring
    }

    /// Apply `action`. Without an active grid nothing happens.
    pub fn dispatch(
        &mut self,
        action: &Action,
        ctx: &DispatchCtx,
        surface: &mut dyn RenderSurface,
    ) -> DispatchOutcome {
        if surface.grid().is_none() {
            tracing::trace!(kind = action.kind(), "no grid; action skipped");
            return DispatchOutcome::default();
        }

        let outcome = match action {
            Action::PixelWrite { text } => {
                let marked = self.writer.apply_pixel_writer_text(text, surface);
                // Writer cells may have covered the ring.
                self.ring.invalidate(DirtyReasons::TEXT);
                DispatchOutcome::touched(marked)
            }
            Action::Zones { count, colors } => self.zones(*count, colors, surface),
            Action::MatrixPulse => matrix(AnimKind::Pulse, ctx, surface),
            Action::MatrixFlash => matrix(AnimKind::Flash, ctx, surface),
            Action::FinePulse => {
                let cells = surface.eligible_cells();
                animate(&cells, AnimKind::Pulse, ctx.boundary_ms(), ctx, surface)
            }
            Action::FineFlash => {
                let cells = surface.eligible_cells();
                let duration = self.flash_ms(ctx);
                animate(&cells, AnimKind::Flash, duration, ctx, surface)
            }
            Action::Hold { scope, bars } => hold(*scope, *bars, ctx, surface),
            Action::RandomPixel { count, variant } => {
                self.random_pixels(*count, *variant, ctx, surface)
            }
            Action::Ring { inset } => DispatchOutcome::touched(self.ring.show(*inset, surface)),
            Action::RingClear => DispatchOutcome::touched(self.ring.clear(surface)),
            Action::ClearAll => clear_all(surface),
            Action::Unknown { base } => {
                tracing::trace!(base = %base, "unknown action ignored");
                DispatchOutcome::default()
            }
        };
        tracing::trace!(kind = action.kind(), touched = outcome.touched, "dispatched");
        outcome
    }

    /// Queue redraws of active programs.
    pub fn invalidate(&mut self, reasons: DirtyReasons) {
        self.writer.invalidate(reasons);
        self.ring.invalidate(reasons);
    }

    /// Run queued program redraws. The writer goes first so the ring can route around it.
    pub fn run_pending(&mut self, surface: &mut dyn RenderSurface) -> bool {
        let wrote = self.writer.render_pending(surface).is_some();
        let ringed = self.ring.render_pending(surface).is_some();
        wrote || ringed
    }

    /// Stop both programs and clear the cells they own.
    pub fn stop_programs(&mut self, surface: &mut dyn RenderSurface) {
        self.writer.stop(surface);
        self.ring.clear(surface);
    }

    fn flash_ms(&self, ctx: &DispatchCtx) -> f64 {
        self.flash_ratio * ctx.meter.beat_ms()
    }

    fn zones(
        &self,
        count: u32,
        colors: &[Color],
        surface: &mut dyn RenderSurface,
    ) -> DispatchOutcome {
        let colors = if colors.is_empty() {
            self.zone_colors.clone()
        } else {
            colors.to_vec()
        };
        let cells = surface.layer_coords(Layer::Coarse);
        let n = cells.len() as u64;
        let mut touched = 0;
        for (i, at) in cells.into_iter().enumerate() {
            let zone = zone_of(i as u64, n, count);
            if let Some(paint) = surface.cell_mut(Layer::Coarse, at) {
                paint.zone = Some(zone);
                paint.color = Some(colors[zone as usize % colors.len()]);
                touched += 1;
            }
        }
        surface.globals_mut().zones = Some(ZoneStyle { count, colors });
        surface.notify(Notice::ZoneCount(count));
        DispatchOutcome::touched(touched)
    }

    fn random_pixels(
        &mut self,
        count: u32,
        variant: PixelVariant,
        ctx: &DispatchCtx,
        surface: &mut dyn RenderSurface,
    ) -> DispatchOutcome {
        let eligible = surface.eligible_cells();
        let k = (count as usize).min(eligible.len());
        if k == 0 {
            tracing::trace!(count, "random-pixel: no eligible cells");
            return DispatchOutcome::default();
        }
        let picked: Vec<CellCoord> = index::sample(&mut self.rng, eligible.len(), k)
            .into_iter()
            .map(|i| eligible[i])
            .collect();
        let (kind, duration) = match variant {
            PixelVariant::Pulse => (AnimKind::Pulse, ctx.boundary_ms()),
            PixelVariant::Flash => (AnimKind::Flash, self.flash_ms(ctx)),
        };
        animate(&picked, kind, duration, ctx, surface)
    }
}

/// Zone of coarse cell `index` out of `total` when split into `count` contiguous runs.
fn zone_of(index: u64, total: u64, count: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (index * u64::from(count) / total) as u32
}

/// Every coarse cell plus the unmarked fine cells around marked ones.
fn matrix(kind: AnimKind, ctx: &DispatchCtx, surface: &mut dyn RenderSurface) -> DispatchOutcome {
    let duration = ctx.boundary_ms();
    let coarse = surface.layer_coords(Layer::Coarse);
    let mut touched = animate_layer(&coarse, Layer::Coarse, kind, duration, ctx, surface);
    let halo = marked_halo(&*surface);
    touched += animate(&halo, kind, duration, ctx, surface).touched;
    DispatchOutcome::touched(touched)
}

/// Unmarked fine cells orthogonally adjacent to a marked one, row-major and unique.
fn marked_halo(surface: &dyn RenderSurface) -> Vec<CellCoord> {
    let Some(grid) = surface.grid() else {
        return Vec::new();
    };
    let (w, h) = (grid.fine_cols(), grid.fine_rows());
    let mut halo: Vec<CellCoord> = surface
        .marked_cells()
        .into_iter()
        .flat_map(|c| c.neighbors4(w, h))
        .filter(|&n| {
            surface
                .cell(Layer::Fine, n)
                .is_some_and(|p| !p.is_marked())
        })
        .collect();
    halo.sort_by_key(|c| (c.y, c.x));
    halo.dedup();
    halo
}

fn animate(
    cells: &[CellCoord],
    kind: AnimKind,
    duration_ms: f64,
    ctx: &DispatchCtx,
    surface: &mut dyn RenderSurface,
) -> DispatchOutcome {
    DispatchOutcome::touched(animate_layer(
        cells,
        Layer::Fine,
        kind,
        duration_ms,
        ctx,
        surface,
    ))
}

fn animate_layer(
    cells: &[CellCoord],
    layer: Layer,
    kind: AnimKind,
    duration_ms: f64,
    ctx: &DispatchCtx,
    surface: &mut dyn RenderSurface,
) -> usize {
    let anim = CellAnim {
        kind,
        started_ms: ctx.now_ms,
        duration_ms,
        color: ctx.pulse.color,
    };
    let mut touched = 0;
    for &at in cells {
        if let Some(paint) = surface.cell_mut(layer, at) {
            paint.restart(anim);
            touched += 1;
        }
    }
    touched
}

fn hold(
    scope: CellScope,
    bars: u32,
    ctx: &DispatchCtx,
    surface: &mut dyn RenderSurface,
) -> DispatchOutcome {
    let duration = if ctx.is_bar_start() {
        f64::from(bars) * ctx.meter.bar_ms()
    } else {
        ctx.meter.beat_ms()
    };
    let state = HoldState {
        until_ms: ctx.now_ms + duration,
        color: Some(ctx.pulse.color),
        shadow: Some(ctx.pulse.shadow),
    };
    let (layer, cells) = match scope {
        CellScope::Fine => (Layer::Fine, surface.eligible_cells()),
        CellScope::Coarse => (Layer::Coarse, surface.layer_coords(Layer::Coarse)),
    };
    let mut touched = 0;
    for at in cells {
        if let Some(paint) = surface.cell_mut(layer, at) {
            paint.hold = Some(state);
            touched += 1;
        }
    }
    DispatchOutcome::touched(touched)
}

fn clear_all(surface: &mut dyn RenderSurface) -> DispatchOutcome {
    let mut touched = 0;
    for layer in [Layer::Coarse, Layer::Fine] {
        for at in surface.layer_coords(layer) {
            if let Some(paint) = surface.cell_mut(layer, at) {
                paint.clear_effects();
                touched += 1;
            }
        }
    }
    surface.globals_mut().zones = None;
    DispatchOutcome::touched(touched)
}

#[cfg(test)]
#[path = "../../tests/unit/action/dispatch.rs"]
mod tests;
