use crate::foundation::error::{PulseError, PulseResult};

/// Tempo and subdivision of a run. Immutable once a clock starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MeterConfig {
    /// Beats per minute, must be > 0.
    pub bpm: u32,
    /// Beats in one bar, must be > 0.
    pub beats_per_bar: u32,
    /// Sub-beats in one beat, must be > 0.
    pub sub_beats_per_beat: u32,
}

impl MeterConfig {
    /// Create a validated meter.
    pub fn new(bpm: u32, beats_per_bar: u32, sub_beats_per_beat: u32) -> PulseResult<Self> {
        let meter = Self {
            bpm,
            beats_per_bar,
            sub_beats_per_beat,
        };
        meter.validate()?;
        Ok(meter)
    }

    pub fn validate(&self) -> PulseResult<()> {
        if self.bpm == 0 {
            return Err(PulseError::validation("bpm must be > 0"));
        }
        if self.beats_per_bar == 0 {
            return Err(PulseError::validation("beatsPerBar must be > 0"));
        }
        if self.sub_beats_per_beat == 0 {
            return Err(PulseError::validation("subBeatsPerBeat must be > 0"));
        }
        if self
            .beats_per_bar
            .checked_mul(self.sub_beats_per_beat)
            .is_none()
        {
            return Err(PulseError::validation(format!(
                "beatsPerBar x subBeatsPerBeat ({} x {}) overflows the sub-beat counter",
                self.beats_per_bar, self.sub_beats_per_beat
            )));
        }
        Ok(())
    }

    /// Saturates for meters that never passed [`MeterConfig::validate`].
    pub fn sub_beats_per_bar(&self) -> u32 {
        self.beats_per_bar.saturating_mul(self.sub_beats_per_beat)
    }

    pub fn secs_per_beat(&self) -> f64 {
        60.0 / f64::from(self.bpm)
    }

    pub fn secs_per_sub_beat(&self) -> f64 {
        self.secs_per_beat() / f64::from(self.sub_beats_per_beat)
    }

    pub fn secs_per_bar(&self) -> f64 {
        self.secs_per_beat() * f64::from(self.beats_per_bar)
    }

    pub fn beat_ms(&self) -> f64 {
        self.secs_per_beat() * 1000.0
    }

    pub fn sub_beat_ms(&self) -> f64 {
        self.secs_per_sub_beat() * 1000.0
    }

    pub fn bar_ms(&self) -> f64 {
        self.secs_per_bar() * 1000.0
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            bpm: 120,
            beats_per_bar: 4,
            sub_beats_per_beat: 4,
        }
    }
}

/// Discrete musical position. `sub_beat` counts from the start of the bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct MusicalPosition {
    pub bar: u64,
    pub beat: u32,
    pub sub_beat: u32,
}

impl MusicalPosition {
    pub const START: Self = Self {
        bar: 1,
        beat: 1,
        sub_beat: 1,
    };

    /// Sub-beat index within the current beat, 1-based.
    pub fn sub_beat_in_beat(&self, meter: &MeterConfig) -> u32 {
        (self.sub_beat - 1) % meter.sub_beats_per_beat + 1
    }
}

fn sanitize_elapsed(elapsed_secs: f64) -> f64 {
    if elapsed_secs.is_finite() {
        elapsed_secs.max(0.0)
    } else {
        0.0
    }
}

/// Map elapsed seconds onto a musical position.
///
/// The clock is unbounded: `bar` keeps growing, sheets decide how to wrap it.
pub fn position(elapsed_secs: f64, meter: &MeterConfig) -> MusicalPosition {
    let t = sanitize_elapsed(elapsed_secs);
    let per_bar = meter.secs_per_bar();
    let bar = (t / per_bar).floor() as u64 + 1;
    let in_bar = t % per_bar;
    let sub = (in_bar / meter.secs_per_sub_beat()).floor() as u32 + 1;
    let sub_beat = sub.min(meter.sub_beats_per_bar());
    let beat = (sub_beat - 1) / meter.sub_beats_per_beat + 1;
    MusicalPosition {
        bar,
        beat,
        sub_beat,
    }
}

/// Half-beat index within the bar, `1..=beats_per_bar * 2`.
pub fn eighth_beat(elapsed_secs: f64, meter: &MeterConfig) -> u32 {
    let t = sanitize_elapsed(elapsed_secs);
    let in_bar = t % meter.secs_per_bar();
    let eighth = (in_bar / (meter.secs_per_beat() / 2.0)).floor() as u32 + 1;
    eighth.min(meter.beats_per_bar * 2)
}

/// Strongest grid line a position sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    BarStart,
    Beat,
    /// Half-beat line; only exists when sub-beats per beat is even.
    Eighth,
    SubBeat,
}

impl Boundary {
    pub fn of(pos: &MusicalPosition, meter: &MeterConfig) -> Self {
        let idx = pos.sub_beat - 1;
        let per_beat = meter.sub_beats_per_beat;
        if idx == 0 {
            Self::BarStart
        } else if idx % per_beat == 0 {
            Self::Beat
        } else if per_beat % 2 == 0 && idx % (per_beat / 2) == 0 {
            Self::Eighth
        } else {
            Self::SubBeat
        }
    }

    /// Length of an effect started on this boundary.
    pub fn pulse_duration_ms(self, meter: &MeterConfig) -> f64 {
        match self {
            Self::BarStart => meter.bar_ms(),
            Self::Beat => meter.beat_ms(),
            Self::Eighth => meter.beat_ms() / 2.0,
            Self::SubBeat => meter.sub_beat_ms(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/meter.rs"]
mod tests;
