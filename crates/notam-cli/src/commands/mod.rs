pub mod config;
pub mod diff;
pub mod keys;
pub mod mark;
pub mod review;

use anyhow::{Context, Result};
use notam_core::{parse_briefing, FlightContext, FlightPlan, RawNotam};
use std::path::Path;

/// Read a briefing exported as a JSON array of notices
pub fn read_briefing(path: &Path) -> Result<Vec<RawNotam>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read briefing {}", path.display()))?;
    parse_briefing(&content).with_context(|| format!("Invalid briefing {}", path.display()))
}

pub fn read_flight(path: &Path) -> Result<FlightContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read flight plan {}", path.display()))?;
    let plan = FlightPlan::from_json(&content)
        .with_context(|| format!("Invalid flight plan {}", path.display()))?;
    Ok(FlightContext::new(plan))
}
