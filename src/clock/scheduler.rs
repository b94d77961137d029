use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::clock::meter::{MeterConfig, MusicalPosition, eighth_beat, position};
use crate::clock::palette::{Palette, PaletteMode, PulseStyle};

static NEXT_CLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one [`ClockHandle`], used by surfaces to admit a single active clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClockId(u64);

impl ClockId {
    fn next() -> Self {
        Self(NEXT_CLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Options for [`ClockHandle::start`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StartOpts {
    pub palette: PaletteMode,
    /// Resume point; the first published position matches this offset.
    pub start_at_secs: Option<f64>,
}

/// State published after a tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ClockState {
    pub position: MusicalPosition,
    pub eighth: u32,
    pub elapsed_secs: f64,
    pub palette: PaletteMode,
    pub pulse: PulseStyle,
}

/// Result of one tick, with what changed since the previous one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockUpdate {
    pub state: ClockState,
    pub bar_changed: bool,
    pub beat_changed: bool,
    pub sub_beat_changed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum RunState {
    Stopped,
    /// Start timestamp is recorded by the first tick after `start`.
    Running { start_ms: Option<f64> },
}

/// Frame-driven beat clock.
///
/// The host calls [`ClockHandle::tick`] once per frame with a monotonic timestamp. The handle
/// owns its timeline; nothing about it is global, so several handles may exist, but a surface
/// only admits one of them at a time.
pub struct ClockHandle {
    id: ClockId,
    meter: MeterConfig,
    run: RunState,
    pending_offset_secs: Option<f64>,
    palette: Palette,
    rng: ChaCha8Rng,
    published: Option<ClockState>,
    frame_pending: bool,
}

impl ClockHandle {
    /// Create a stopped clock. `seed` makes palette picks reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            id: ClockId::next(),
            meter: MeterConfig::default(),
            run: RunState::Stopped,
            pending_offset_secs: None,
            palette: Palette::default(),
            rng,
            published: None,
            frame_pending: false,
        }
    }

    pub fn id(&self) -> ClockId {
        self.id
    }

    pub fn meter(&self) -> &MeterConfig {
        &self.meter
    }

    pub fn is_running(&self) -> bool {
        matches!(self.run, RunState::Running { .. })
    }

    pub fn state(&self) -> Option<&ClockState> {
        self.published.as_ref()
    }

    pub fn palette_mode(&self) -> PaletteMode {
        self.palette.mode()
    }

    /// Start the clock, or reconfigure it in place when it already runs.
    ///
    /// A running clock keeps its meter and timeline; only the palette and (when given) the
    /// resume offset change. Returns `true` when this call armed a stopped clock.
    pub fn start(&mut self, meter: MeterConfig, opts: StartOpts) -> bool {
        self.palette.set_mode(opts.palette);
        match self.run {
            RunState::Running { .. } => {
                if let Some(offset) = opts.start_at_secs {
                    tracing::debug!(offset, "re-anchoring running clock");
                    self.pending_offset_secs = Some(offset);
                }
                if meter != self.meter {
                    tracing::debug!(?meter, "clock already running; meter change ignored");
                }
                false
            }
            RunState::Stopped => {
                self.meter = meter;
                self.pending_offset_secs = opts.start_at_secs;
                self.run = RunState::Running { start_ms: None };
                self.published = None;
                true
            }
        }
    }

    pub fn set_palette_mode(&mut self, mode: PaletteMode) {
        self.palette.set_mode(mode);
        if let Some(state) = self.published.as_mut() {
            state.palette = mode;
        }
    }

    /// Stop and forget all published state. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.run = RunState::Stopped;
        self.pending_offset_secs = None;
        self.published = None;
        self.frame_pending = false;
    }

    /// Ask for the next frame. Returns `true` only when no frame was already pending, so
    /// repeated requests collapse into one.
    pub fn request_frame(&mut self) -> bool {
        if !self.is_running() || self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Advance to `now_ms`. Returns `None` while stopped.
    pub fn tick(&mut self, now_ms: f64) -> Option<ClockUpdate> {
        let RunState::Running { start_ms } = self.run else {
            return None;
        };
        self.frame_pending = false;

        let start_ms = match (start_ms, self.pending_offset_secs.take()) {
            (_, Some(offset)) => now_ms - offset.max(0.0) * 1000.0,
            (Some(start), None) => start,
            (None, None) => now_ms,
        };
        self.run = RunState::Running {
            start_ms: Some(start_ms),
        };

        let elapsed_secs = ((now_ms - start_ms) / 1000.0).max(0.0);
        let pos = position(elapsed_secs, &self.meter);
        let prev = self.published.map(|s| s.position);

        let bar_changed = prev.is_none_or(|p| p.bar != pos.bar);
        let beat_changed = bar_changed || prev.is_none_or(|p| p.beat != pos.beat);
        let sub_beat_changed = bar_changed || prev.is_none_or(|p| p.sub_beat != pos.sub_beat);

        let pulse = match (sub_beat_changed, self.published) {
            (false, Some(state)) => state.pulse,
            _ => self.palette.next_pulse(&mut self.rng),
        };

        let state = ClockState {
            position: pos,
            eighth: eighth_beat(elapsed_secs, &self.meter),
            elapsed_secs,
            palette: self.palette.mode(),
            pulse,
        };
        self.published = Some(state);

        Some(ClockUpdate {
            state,
            bar_changed,
            beat_changed,
            sub_beat_changed,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/scheduler.rs"]
mod tests;
