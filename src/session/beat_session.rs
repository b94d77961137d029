use std::path::Path;

use crate::action::dispatch::{DEFAULT_FLASH_RATIO, DEFAULT_ZONE_COLORS, DispatchCtx, Dispatcher};
use crate::clock::meter::{MeterConfig, MusicalPosition};
use crate::clock::palette::PaletteMode;
use crate::clock::scheduler::{ClockHandle, ClockState, StartOpts};
use crate::foundation::core::{Color, Viewport};
use crate::foundation::error::{PulseError, PulseResult};
use crate::layout::grid::{DEFAULT_TARGET_CELLS, GridLayout};
use crate::sheet::loader::load_sheet;
use crate::sheet::model::Sheet;
use crate::surface::{GridSurface, RenderSurface};

/// Session configuration. Every field has a default, so `{}` is a valid document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeatSessionOpts {
    /// Coarse cells the grid layout aims for.
    pub target_cells: u32,
    pub palette: PaletteMode,
    /// Seed for palette and random-pixel picks; OS entropy when absent.
    pub seed: Option<u64>,
    /// Fine flash length as a fraction of a beat.
    pub flash_ratio: f64,
    /// Zone colors used when `m-s-zones` names none.
    pub zone_colors: Vec<Color>,
    /// Wrap the clock's bar onto the sheet length; otherwise events stop after the last bar.
    pub loop_sheet: bool,
}

impl Default for BeatSessionOpts {
    fn default() -> Self {
        Self {
            target_cells: DEFAULT_TARGET_CELLS,
            palette: PaletteMode::default(),
            seed: None,
            flash_ratio: DEFAULT_FLASH_RATIO,
            zone_colors: DEFAULT_ZONE_COLORS.to_vec(),
            loop_sheet: true,
        }
    }
}

impl BeatSessionOpts {
    pub fn from_json(json: &str) -> PulseResult<Self> {
        let opts: Self = serde_json::from_str(json)
            .map_err(|e| PulseError::serde(format!("session options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> PulseResult<()> {
        if self.target_cells == 0 {
            return Err(PulseError::validation("target_cells must be > 0"));
        }
        if !(self.flash_ratio.is_finite() && self.flash_ratio > 0.0) {
            return Err(PulseError::validation("flash_ratio must be a positive number"));
        }
        Ok(())
    }
}

/// What one frame did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Published clock state, `None` while stopped.
    pub state: Option<ClockState>,
    /// Ids of sheet events dispatched this frame, in sheet order.
    pub fired: Vec<String>,
    /// Whether a program redrew its cells.
    pub redrawn: bool,
}

/// One running engine: a clock, an optional sheet, the dispatcher and the surface it drives.
///
/// Without a sheet the session runs clock-only, publishing position and pulse style.
pub struct BeatSession<S: RenderSurface> {
    opts: BeatSessionOpts,
    clock: ClockHandle,
    sheet: Option<Sheet>,
    dispatcher: Dispatcher,
    surface: S,
    last_address: Option<(u64, u32)>,
}

impl<S: RenderSurface> BeatSession<S> {
    pub fn new(surface: S, opts: BeatSessionOpts) -> Self {
        let dispatcher = Dispatcher::new(opts.seed.map(|s| s.wrapping_add(1)))
            .with_flash_ratio(opts.flash_ratio)
            .with_zone_colors(opts.zone_colors.clone());
        Self {
            clock: ClockHandle::new(opts.seed),
            opts,
            sheet: None,
            dispatcher,
            surface,
            last_address: None,
        }
    }

    pub fn opts(&self) -> &BeatSessionOpts {
        &self.opts
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.clock
    }

    pub fn sheet(&self) -> Option<&Sheet> {
        self.sheet.as_ref()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Meter the clock runs under: the sheet's, else the default meter.
    pub fn meter(&self) -> MeterConfig {
        self.sheet
            .as_ref()
            .map(|s| s.meter().meter)
            .unwrap_or_default()
    }

    /// Swap in a new program. Paint from the previous one is destroyed; a running clock is
    /// restarted when the meter changes.
    pub fn load_sheet(&mut self, sheet: Sheet) {
        self.dispatcher.stop_programs(&mut self.surface);
        self.surface.clear_paint();
        self.surface.globals_mut().zones = None;
        self.last_address = None;

        let meter = sheet.meter().meter;
        tracing::info!(
            events = sheet.len(),
            bars = sheet.meter().bars,
            bpm = meter.bpm,
            "sheet swapped in"
        );
        let restart = self.clock.is_running() && *self.clock.meter() != meter;
        self.sheet = Some(sheet);
        if restart {
            let palette = self.clock.palette_mode();
            self.clock.stop();
            self.clock.start(
                meter,
                StartOpts {
                    palette,
                    start_at_secs: None,
                },
            );
            tracing::debug!(?meter, "clock restarted for new meter");
        }
    }

    /// Load a sheet from disk. On failure the current program is kept.
    pub fn load_sheet_path(&mut self, path: &Path) -> PulseResult<()> {
        let sheet = load_sheet(path)?;
        self.load_sheet(sheet);
        Ok(())
    }

    /// Drop the sheet and fall back to clock-only mode.
    pub fn unload_sheet(&mut self) {
        self.dispatcher.stop_programs(&mut self.surface);
        self.surface.clear_paint();
        self.sheet = None;
        self.last_address = None;
    }

    /// Claim the surface and start (or reconfigure) the clock.
    pub fn start(&mut self, opts: StartOpts) -> PulseResult<()> {
        self.surface.claim(self.clock.id())?;
        let armed = self.clock.start(self.meter(), opts);
        self.surface.globals_mut().palette = opts.palette;
        if armed {
            self.last_address = None;
            tracing::info!(
                clock = ?self.clock.id(),
                palette = opts.palette.name(),
                start_at = ?opts.start_at_secs,
                "session started"
            );
        }
        self.surface.request_frame();
        Ok(())
    }

    /// Stop the clock and clear everything the session painted. Safe to call repeatedly.
    pub fn stop(&mut self) {
        let was_running = self.clock.is_running();
        self.clock.stop();
        self.dispatcher.stop_programs(&mut self.surface);
        self.surface.clear_paint();
        self.surface.globals_mut().clear();
        self.surface.cancel_frame();
        self.surface.release(self.clock.id());
        self.last_address = None;
        if was_running {
            tracing::info!(clock = ?self.clock.id(), "session stopped");
        }
    }

    pub fn set_palette_mode(&mut self, mode: PaletteMode) {
        self.clock.set_palette_mode(mode);
        self.surface.globals_mut().palette = mode;
    }

    /// Run one frame at host time `now_ms`.
    ///
    /// Publishes the clock state, redraws programs invalidated by surface changes, fires the
    /// sheet events at a newly reached sub-beat (each address once) and runs redraws those
    /// events queued.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let Some(update) = self.clock.tick(now_ms) else {
            return FrameReport::default();
        };
        let state = update.state;

        let dirty = self.surface.take_dirty();
        if dirty.any() {
            self.dispatcher.invalidate(dirty);
        }

        let globals = self.surface.globals_mut();
        globals.set_position(state.position, state.eighth);
        globals.palette = state.palette;
        globals.pulse = Some(state.pulse);

        // Programs resync before events so the halo and eligibility see current marks.
        let resynced = self.dispatcher.run_pending(&mut self.surface);
        let fired = self.fire_events(&state, now_ms);
        let redrawn = self.dispatcher.run_pending(&mut self.surface) || resynced;

        self.clock.request_frame();
        self.surface.request_frame();
        FrameReport {
            state: Some(state),
            fired,
            redrawn,
        }
    }

    fn fire_events(&mut self, state: &ClockState, now_ms: f64) -> Vec<String> {
        let pos: MusicalPosition = state.position;
        let address = (pos.bar, pos.sub_beat);
        if self.last_address == Some(address) {
            return Vec::new();
        }
        self.last_address = Some(address);

        let Some(sheet) = self.sheet.as_ref() else {
            return Vec::new();
        };
        let Some(at) = sheet.address_of(&pos, self.opts.loop_sheet) else {
            return Vec::new();
        };
        let ctx = DispatchCtx {
            position: pos,
            meter: sheet.meter().meter,
            now_ms,
            pulse: state.pulse,
        };
        let mut fired = Vec::new();
        for event in sheet.events_at(at) {
            let outcome = self.dispatcher.dispatch(&event.action, &ctx, &mut self.surface);
            tracing::debug!(
                id = %event.id,
                action = %event.source,
                bar = pos.bar,
                sub_beat = pos.sub_beat,
                touched = outcome.touched,
                "sheet event fired"
            );
            fired.push(event.id.clone());
        }
        fired
    }
}

impl BeatSession<GridSurface> {
    /// Session over an unmounted in-memory surface sized by `opts.target_cells`.
    pub fn with_grid(opts: BeatSessionOpts) -> Self {
        let surface = GridSurface::new(opts.target_cells);
        Self::new(surface, opts)
    }

    pub fn mount(&mut self, viewport: Viewport) -> GridLayout {
        self.surface.mount(viewport)
    }

    /// Refit the grid; programs redraw on the next frame.
    pub fn resize(&mut self, viewport: Viewport) -> GridLayout {
        self.surface.resize(viewport)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/beat_session.rs"]
mod tests;
