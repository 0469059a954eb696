//! Output reporters for analysis results
//!
//! - `text` - Terminal output with colors
//! - `json` - The same document `POST /analyze` returns

mod json;
mod text;

use crate::pipeline::AnalysisResponse;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render an analysis in the named format
pub fn report(response: &AnalysisResponse, format: &str) -> Result<String> {
    report_with_format(response, OutputFormat::from_str(format)?)
}

pub fn report_with_format(response: &AnalysisResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(response),
        OutputFormat::Json => json::render(response),
    }
}
