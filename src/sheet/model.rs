use std::collections::BTreeMap;

use crate::action::grammar::Action;
use crate::clock::meter::{MeterConfig, MusicalPosition};
use crate::foundation::error::{Axis, PulseError, PulseResult, check_range};

/// Meter plus the sheet length used as the validation ceiling for bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SheetMeter {
    pub meter: MeterConfig,
    pub bars: u32,
}

impl SheetMeter {
    pub fn new(meter: MeterConfig, bars: u32) -> PulseResult<Self> {
        meter.validate()?;
        Ok(Self { meter, bars })
    }

    /// Validate a (bar, absolute sub-beat) address against this meter.
    pub fn check(&self, at: SubBeatPos) -> PulseResult<()> {
        check_range(Axis::Bar, i64::from(at.bar), i64::from(self.bars))?;
        check_range(
            Axis::SubBeat,
            i64::from(at.sub_beat),
            i64::from(self.meter.sub_beats_per_bar()),
        )
    }

    /// Address of `sub_beat` (1-based within `beat`) in `bar`, range-checked on every axis.
    pub fn locate(&self, bar: i64, beat: i64, sub_beat: i64) -> PulseResult<SubBeatPos> {
        check_range(Axis::Bar, bar, i64::from(self.bars))?;
        check_range(Axis::Beat, beat, i64::from(self.meter.beats_per_bar))?;
        check_range(
            Axis::SubBeat,
            sub_beat,
            i64::from(self.meter.sub_beats_per_beat),
        )?;
        let per_beat = i64::from(self.meter.sub_beats_per_beat);
        Ok(SubBeatPos {
            bar: bar as u32,
            sub_beat: ((beat - 1) * per_beat + sub_beat) as u32,
        })
    }
}

/// Sheet address: bar and sub-beat counted from the start of the bar.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SubBeatPos {
    pub bar: u32,
    pub sub_beat: u32,
}

impl SubBeatPos {
    pub fn new(bar: u32, sub_beat: u32) -> Self {
        Self { bar, sub_beat }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SheetEvent {
    /// Unique within the sheet.
    pub id: String,
    pub at: SubBeatPos,
    pub action: Action,
    /// Action string as authored.
    pub source: String,
}

/// Flat, validated, immutable list of sub-beat events.
#[derive(Clone, Debug)]
pub struct Sheet {
    meter: SheetMeter,
    events: Vec<SheetEvent>,
    by_pos: BTreeMap<SubBeatPos, Vec<usize>>,
}

impl Sheet {
    /// Build a sheet, checking positions and id uniqueness. Event order is kept: events sharing
    /// a position fire in this order.
    pub fn new(meter: SheetMeter, events: Vec<SheetEvent>) -> PulseResult<Self> {
        meter.meter.validate()?;
        let mut by_pos: BTreeMap<SubBeatPos, Vec<usize>> = BTreeMap::new();
        let mut ids = std::collections::HashSet::with_capacity(events.len());
        for (idx, ev) in events.iter().enumerate() {
            meter.check(ev.at)?;
            if !ids.insert(ev.id.as_str()) {
                return Err(PulseError::validation(format!(
                    "duplicate sheet event id '{}'",
                    ev.id
                )));
            }
            by_pos.entry(ev.at).or_default().push(idx);
        }
        Ok(Self {
            meter,
            events,
            by_pos,
        })
    }

    pub fn meter(&self) -> &SheetMeter {
        &self.meter
    }

    pub fn events(&self) -> &[SheetEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events at `at`, in sheet order.
    pub fn events_at(&self, at: SubBeatPos) -> impl Iterator<Item = &SheetEvent> + '_ {
        self.by_pos
            .get(&at)
            .into_iter()
            .flatten()
            .map(|&i| &self.events[i])
    }

    /// Fold an unbounded clock bar onto `[1, bars]`.
    pub fn wrap_bar(&self, bar: u64) -> Option<u32> {
        if self.meter.bars == 0 || bar == 0 {
            return None;
        }
        let wrapped = (bar - 1) % u64::from(self.meter.bars) + 1;
        u32::try_from(wrapped).ok()
    }

    /// Sheet address for a clock position, or `None` past the end when `looping` is off.
    pub fn address_of(&self, pos: &MusicalPosition, looping: bool) -> Option<SubBeatPos> {
        let bar = if looping {
            self.wrap_bar(pos.bar)?
        } else {
            u32::try_from(pos.bar)
                .ok()
                .filter(|&b| b >= 1 && b <= self.meter.bars)?
        };
        Some(SubBeatPos::new(bar, pos.sub_beat))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/model.rs"]
mod tests;
