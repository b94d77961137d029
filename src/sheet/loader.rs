use std::path::Path;

use crate::foundation::error::{PulseError, PulseResult};
use crate::sheet::model::Sheet;
use crate::sheet::parse::parse_sheet_json;

/// Read and parse a sheet from `path`.
///
/// The file is read on every call, nothing is cached. Read failures surface as
/// [`PulseError::Transport`]; content errors keep their parse/range classification.
pub fn load_sheet(path: &Path) -> PulseResult<Sheet> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| PulseError::transport(format!("read sheet '{}': {e}", path.display())))?;
    let sheet = parse_sheet_json(&json)?;
    tracing::info!(
        path = %path.display(),
        events = sheet.len(),
        bars = sheet.meter().bars,
        bpm = sheet.meter().meter.bpm,
        "loaded sheet"
    );
    Ok(sheet)
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/loader.rs"]
mod tests;
