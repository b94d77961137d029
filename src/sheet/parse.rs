use serde_json::{Map, Value};

use crate::clock::meter::MeterConfig;
use crate::foundation::error::{Axis, PulseError, PulseResult, check_range};
use crate::sheet::builder::SheetBuilder;
use crate::sheet::model::{Sheet, SheetMeter, SubBeatPos};

fn four() -> u32 {
    4
}

/// Boundary document. Meter fields follow the camelCase JSON names.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetDoc {
    bpm: u32,
    bars: u32,
    #[serde(default = "four")]
    beats_per_bar: u32,
    #[serde(default = "four")]
    sub_beats_per_beat: u32,
    #[serde(default)]
    program: Option<Map<String, Value>>,
    #[serde(default)]
    events: Option<Map<String, Value>>,
}

/// Parse a sheet document.
///
/// `program` (nested ranges) takes precedence over `events` (flat map); when both are present
/// the flat map is ignored. Positions outside the sheet bounds fail with a range error.
#[tracing::instrument(skip_all, fields(bytes = json.len()))]
pub fn parse_sheet_json(json: &str) -> PulseResult<Sheet> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| PulseError::parse(format!("invalid JSON: {e}")))?;
    parse_sheet_value(&value)
}

pub fn parse_sheet_value(value: &Value) -> PulseResult<Sheet> {
    let doc = SheetDoc::deserialize_from(value)?;
    let meter = SheetMeter::new(
        MeterConfig::new(doc.bpm, doc.beats_per_bar, doc.sub_beats_per_beat)?,
        doc.bars,
    )?;
    let mut builder = SheetBuilder::new(meter);

    match (&doc.program, &doc.events) {
        (Some(program), flat) => {
            if flat.is_some() {
                tracing::debug!("sheet has both program and events; using program");
            }
            expand_program(&meter, program, &mut builder)?;
        }
        (None, Some(events)) => expand_flat(&meter, events, &mut builder)?,
        (None, None) => {}
    }

    let sheet = builder.build()?;
    tracing::debug!(events = sheet.len(), bars = meter.bars, "parsed sheet");
    Ok(sheet)
}

impl SheetDoc {
    fn deserialize_from(value: &Value) -> PulseResult<Self> {
        <Self as serde::Deserialize>::deserialize(value)
            .map_err(|e| PulseError::parse(format!("invalid sheet: {e}")))
    }
}

/// `bar-a-b` -> `beat-a-b` -> `subbeat-a-b` -> action(s), expanded as a cross product.
fn expand_program(
    meter: &SheetMeter,
    program: &Map<String, Value>,
    builder: &mut SheetBuilder,
) -> PulseResult<()> {
    for (bar_key, beats) in program {
        let bars = parse_range_key(bar_key, "bar")?;
        let beats = as_object(beats, bar_key)?;
        for (beat_key, subs) in beats {
            let beat_range = parse_range_key(beat_key, "beat")?;
            let subs = as_object(subs, beat_key)?;
            for (sub_key, actions) in subs {
                let sub_range = parse_range_key(sub_key, "subbeat")?;
                let actions = action_list(actions, sub_key)?;
                for bar in bars.iter() {
                    for beat in beat_range.iter() {
                        for sub in sub_range.iter() {
                            let at = meter.locate(bar, beat, sub)?;
                            for action in &actions {
                                builder.push(at, action, None)?;
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// `bar-n` -> {sub-beat -> action}, `bar-n` -> action (sub-beat 1) or `bar-n-s` -> action.
fn expand_flat(
    meter: &SheetMeter,
    events: &Map<String, Value>,
    builder: &mut SheetBuilder,
) -> PulseResult<()> {
    for (key, value) in events {
        let (bar, sub) = parse_flat_key(key)?;
        match (sub, value) {
            (None, Value::Object(subs)) => {
                for (sub_key, actions) in subs {
                    let sub = parse_sub_key(sub_key)?;
                    let at = checked_pos(meter, bar, sub)?;
                    for action in action_list(actions, sub_key)? {
                        builder.push(at, action, None)?;
                    }
                }
            }
            (sub, actions) => {
                let at = checked_pos(meter, bar, sub.unwrap_or(1))?;
                for action in action_list(actions, key)? {
                    builder.push(at, action, None)?;
                }
            }
        }
    }
    Ok(())
}

fn checked_pos(meter: &SheetMeter, bar: i64, sub: i64) -> PulseResult<SubBeatPos> {
    check_range(Axis::Bar, bar, i64::from(meter.bars))?;
    check_range(Axis::SubBeat, sub, i64::from(meter.meter.sub_beats_per_bar()))?;
    Ok(SubBeatPos::new(bar as u32, sub as u32))
}

/// Inclusive range, normalized so `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct KeyRange {
    pub(crate) start: i64,
    pub(crate) end: i64,
}

impl KeyRange {
    fn iter(self) -> std::ops::RangeInclusive<i64> {
        self.start..=self.end
    }
}

/// Parse `<prefix>-<a>` or `<prefix>-<a>-<b>`.
pub(crate) fn parse_range_key(key: &str, prefix: &str) -> PulseResult<KeyRange> {
    let bad = || {
        PulseError::parse(format!(
            "key \"{key}\" must look like {prefix}-<n> or {prefix}-<a>-<b>"
        ))
    };
    let rest = key
        .trim()
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('-'))
        .ok_or_else(bad)?;
    let mut parts = rest.split('-');
    let a = parse_num(parts.next()).ok_or_else(bad)?;
    let b = match parts.next() {
        Some(p) => parse_num(Some(p)).ok_or_else(bad)?,
        None => a,
    };
    if parts.next().is_some() {
        return Err(bad());
    }
    Ok(KeyRange {
        start: a.min(b),
        end: a.max(b),
    })
}

fn parse_flat_key(key: &str) -> PulseResult<(i64, Option<i64>)> {
    let bad = || {
        PulseError::parse(format!(
            "event key \"{key}\" must look like bar-<n> or bar-<n>-<subbeat>"
        ))
    };
    let rest = key.trim().strip_prefix("bar-").ok_or_else(bad)?;
    let mut parts = rest.split('-');
    let bar = parse_num(parts.next()).ok_or_else(bad)?;
    let sub = match parts.next() {
        Some(p) => Some(parse_num(Some(p)).ok_or_else(bad)?),
        None => None,
    };
    if parts.next().is_some() {
        return Err(bad());
    }
    Ok((bar, sub))
}

fn parse_sub_key(key: &str) -> PulseResult<i64> {
    let trimmed = key.trim();
    let digits = trimmed.strip_prefix("subbeat-").unwrap_or(trimmed);
    parse_num(Some(digits)).ok_or_else(|| {
        PulseError::parse(format!("sub-beat key \"{key}\" must be <n> or subbeat-<n>"))
    })
}

fn parse_num(part: Option<&str>) -> Option<i64> {
    let part = part?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn as_object<'a>(value: &'a Value, key: &str) -> PulseResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| PulseError::parse(format!("value of \"{key}\" must be an object")))
}

fn action_list<'a>(value: &'a Value, key: &str) -> PulseResult<Vec<&'a str>> {
    let not_action = || {
        PulseError::parse(format!(
            "value of \"{key}\" must be an action string or an array of them"
        ))
    };
    match value {
        Value::String(s) => Ok(vec![s.as_str()]),
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().ok_or_else(not_action))
            .collect(),
        _ => Err(not_action()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/parse.rs"]
mod tests;
