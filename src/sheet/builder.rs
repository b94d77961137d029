use crate::action::grammar::Action;
use crate::foundation::error::PulseResult;
use crate::sheet::model::{Sheet, SheetEvent, SheetMeter, SubBeatPos};

/// Start building a sheet in code.
pub fn create_sheet(meter: SheetMeter) -> SheetBuilder {
    SheetBuilder::new(meter)
}

/// Builder for [`Sheet`] values. Every call validates its position before appending.
pub struct SheetBuilder {
    meter: SheetMeter,
    events: Vec<SheetEvent>,
}

impl SheetBuilder {
    pub fn new(meter: SheetMeter) -> Self {
        Self {
            meter,
            events: Vec::new(),
        }
    }

    /// Add `action` on the first sub-beat of `beat` in `bar`.
    pub fn on_beat(self, bar: u32, beat: u32, action: &str, id: Option<&str>) -> PulseResult<Self> {
        self.on_sub_beat(bar, beat, 1, action, id)
    }

    /// Add `action` on `sub_beat` (1-based within `beat`) of `bar`.
    pub fn on_sub_beat(
        mut self,
        bar: u32,
        beat: u32,
        sub_beat: u32,
        action: &str,
        id: Option<&str>,
    ) -> PulseResult<Self> {
        let at = self
            .meter
            .locate(i64::from(bar), i64::from(beat), i64::from(sub_beat))?;
        self.push(at, action, id)?;
        Ok(self)
    }

    /// Add `action` at an absolute sub-beat of `bar`.
    pub fn at(mut self, at: SubBeatPos, action: &str, id: Option<&str>) -> PulseResult<Self> {
        self.meter.check(at)?;
        self.push(at, action, id)?;
        Ok(self)
    }

    pub(crate) fn push(&mut self, at: SubBeatPos, action: &str, id: Option<&str>) -> PulseResult<()> {
        let parsed = Action::parse(action)?;
        let id = match id {
            Some(id) => id.to_owned(),
            None => self.next_auto_id(),
        };
        self.events.push(SheetEvent {
            id,
            at,
            action: parsed,
            source: action.trim().to_owned(),
        });
        Ok(())
    }

    /// `sheet-<index>`, skipping numbers a caller already took.
    fn next_auto_id(&self) -> String {
        let mut n = self.events.len();
        loop {
            let id = format!("sheet-{n}");
            if !self.events.iter().any(|e| e.id == id) {
                return id;
            }
            n += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Build and validate the final [`Sheet`].
    pub fn build(self) -> PulseResult<Sheet> {
        Sheet::new(self.meter, self.events)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/builder.rs"]
mod tests;
