//! Breakpoint persistence across sessions: an ordered JSON list of
//! locations, enabled breakpoints only. The order is the registry's
//! insertion order, so a restored session enumerates the same way.

use crate::debugger::Breakpoints;
use crate::location::SourceLocation;
use std::fs;
use std::io;
use std::path::Path;

pub fn save_breakpoints(breakpoints: &Breakpoints, path: &Path) -> io::Result<()> {
    let locations: Vec<&SourceLocation> = breakpoints
        .all()
        .iter()
        .filter(|bp| bp.enabled)
        .map(|bp| &bp.location)
        .collect();
    let json = serde_json::to_string_pretty(&locations)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

pub fn load_breakpoints(path: &Path) -> io::Result<Vec<SourceLocation>> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
