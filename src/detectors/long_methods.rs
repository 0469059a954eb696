//! Long method detector
//!
//! Line-based: a function spans from its `def ` line up to the next `def `
//! line (or end of file). Nested functions split their parent's span, and
//! the span includes trailing blank lines and comments.

use crate::detectors::base::{Detector, DetectorConfig};
use crate::models::{Finding, Severity, SmellKind};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

static DEF_NAME: OnceLock<Regex> = OnceLock::new();

fn def_name_pattern() -> &'static Regex {
    DEF_NAME.get_or_init(|| Regex::new(r"^def\s+(\w+)").expect("valid def regex"))
}

/// Thresholds for long method detection
#[derive(Debug, Clone)]
pub struct LongMethodThresholds {
    /// Spans above this many lines are flagged
    pub max_lines: usize,
    /// Spans above this many lines are high severity
    pub high_lines: usize,
}

impl Default for LongMethodThresholds {
    fn default() -> Self {
        Self {
            max_lines: 25,
            high_lines: 40,
        }
    }
}

/// Detects functions whose line span is too long
pub struct LongMethodDetector {
    config: DetectorConfig,
    thresholds: LongMethodThresholds,
}

impl LongMethodDetector {
    pub fn new() -> Self {
        Self::with_thresholds(LongMethodThresholds::default())
    }

    pub fn with_thresholds(thresholds: LongMethodThresholds) -> Self {
        Self {
            config: DetectorConfig::new(),
            thresholds,
        }
    }

    /// Create with custom config (reads `max_lines` / `high_lines`)
    pub fn with_config(config: DetectorConfig) -> Self {
        let defaults = LongMethodThresholds::default();
        let thresholds = LongMethodThresholds {
            max_lines: config.get_option_or("max_lines", defaults.max_lines),
            high_lines: config.get_option_or("high_lines", defaults.high_lines),
        };
        Self { config, thresholds }
    }

    fn check_span(&self, name: &str, start: usize, length: usize, findings: &mut Vec<Finding>) {
        if length <= self.thresholds.max_lines {
            return;
        }
        let severity = if length > self.thresholds.high_lines {
            Severity::High
        } else {
            Severity::Medium
        };
        findings.push(Finding::rule(
            SmellKind::LongMethod,
            severity,
            (start + 1) as u32,
            format!(
                "Method '{}' has {} lines. Methods should be under {} lines.",
                name, length, self.thresholds.max_lines
            ),
        ));
    }
}

impl Default for LongMethodDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for LongMethodDetector {
    fn name(&self) -> &'static str {
        "long-method"
    }

    fn config(&self) -> Option<&DetectorConfig> {
        Some(&self.config)
    }

    fn detect(&self, source: &str) -> Result<Vec<Finding>> {
        let lines: Vec<&str> = source.split('\n').collect();
        let mut findings = Vec::new();
        // (name, start index) of the function being tracked
        let mut current: Option<(&str, usize)> = None;

        for (idx, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if !trimmed.starts_with("def ") {
                continue;
            }

            if let Some((name, start)) = current {
                self.check_span(name, start, idx - start, &mut findings);
            }

            // A `def ` line without a name keeps tracking the previous function
            if let Some(caps) = def_name_pattern().captures(trimmed) {
                if let Some(name) = caps.get(1) {
                    current = Some((name.as_str(), idx));
                }
            }
        }

        if let Some((name, start)) = current {
            self.check_span(name, start, lines.len() - start, &mut findings);
        }

        Ok(findings)
    }
}
