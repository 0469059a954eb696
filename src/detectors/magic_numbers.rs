//! Magic numbers detector

use crate::detectors::base::{Detector, DetectorConfig};
use crate::models::{Finding, Severity, SmellKind};
use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_pattern() -> &'static Regex {
    // Standalone runs of 2+ digits
    NUMBER_PATTERN.get_or_init(|| Regex::new(r"\b(\d{2,})\b").expect("valid number regex"))
}

/// Literals that are never reported, compared as written
const ACCEPTABLE: &[&str] = &["0", "100", "1000"];

pub struct MagicNumbersDetector {
    config: DetectorConfig,
    acceptable: HashSet<String>,
}

impl MagicNumbersDetector {
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::new())
    }

    /// Create with custom config; `acceptable` replaces the allowed literals
    pub fn with_config(config: DetectorConfig) -> Self {
        let acceptable = config
            .get_option::<Vec<String>>("acceptable")
            .unwrap_or_else(|| ACCEPTABLE.iter().map(|s| s.to_string()).collect())
            .into_iter()
            .collect();
        Self { config, acceptable }
    }
}

impl Default for MagicNumbersDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MagicNumbersDetector {
    fn name(&self) -> &'static str {
        "magic-number"
    }

    fn config(&self) -> Option<&DetectorConfig> {
        Some(&self.config)
    }

    fn detect(&self, source: &str) -> Result<Vec<Finding>> {
        let mut findings = vec![];

        for (line_num, line) in source.split('\n').enumerate() {
            if line.contains("def ") || line.contains("class ") {
                continue;
            }

            for cap in get_pattern().captures_iter(line) {
                let Some(m) = cap.get(1) else { continue };
                let number = m.as_str();
                if self.acceptable.contains(number) {
                    continue;
                }
                findings.push(Finding::rule(
                    SmellKind::MagicNumber,
                    Severity::Low,
                    (line_num + 1) as u32,
                    format!("Magic number '{}' found. What does it represent?", number),
                ));
            }
        }

        Ok(findings)
    }
}
