//! JSON reporter
//!
//! Outputs the comparison as pretty-printed JSON for piping to jq or other
//! tools.

use crate::models::{ComparisonReport, ModelSummary};
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &ComparisonReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_summary(summary: &ModelSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
