//! JSON reporter

use crate::pipeline::AnalysisResponse;
use anyhow::Result;

/// Pretty-printed analysis document
pub fn render(response: &AnalysisResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}
