//! Deep nesting detector
//!
//! Nesting level is approximated from indentation: every four leading
//! whitespace characters count as one level. Tabs count as one character.

use crate::detectors::base::{Detector, DetectorConfig};
use crate::models::{Finding, Severity, SmellKind};
use anyhow::Result;

/// Width of one indentation level
const INDENT_WIDTH: usize = 4;

/// Thresholds for deep nesting detection
#[derive(Debug, Clone)]
pub struct DeepNestingThresholds {
    /// Lines at or above this level are flagged
    pub max_depth: usize,
    /// Lines at or above this level are high severity
    pub high_depth: usize,
}

impl Default for DeepNestingThresholds {
    fn default() -> Self {
        Self {
            max_depth: 4,
            high_depth: 5,
        }
    }
}

pub struct DeepNestingDetector {
    config: DetectorConfig,
    thresholds: DeepNestingThresholds,
}

impl DeepNestingDetector {
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::new(),
            thresholds: DeepNestingThresholds::default(),
        }
    }

    /// Create with custom config (reads `max_depth` / `high_depth`)
    pub fn with_config(config: DetectorConfig) -> Self {
        let defaults = DeepNestingThresholds::default();
        let thresholds = DeepNestingThresholds {
            max_depth: config.get_option_or("max_depth", defaults.max_depth),
            high_depth: config.get_option_or("high_depth", defaults.high_depth),
        };
        Self { config, thresholds }
    }

    fn nesting_level(line: &str) -> usize {
        let indent = line.chars().count() - line.trim_start().chars().count();
        indent / INDENT_WIDTH
    }
}

impl Default for DeepNestingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for DeepNestingDetector {
    fn name(&self) -> &'static str {
        "deep-nesting"
    }

    fn config(&self) -> Option<&DetectorConfig> {
        Some(&self.config)
    }

    fn detect(&self, source: &str) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (idx, line) in source.split('\n').enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let level = Self::nesting_level(line);
            if level < self.thresholds.max_depth {
                continue;
            }

            let severity = if level >= self.thresholds.high_depth {
                Severity::High
            } else {
                Severity::Medium
            };
            findings.push(Finding::rule(
                SmellKind::DeepNesting,
                severity,
                (idx + 1) as u32,
                format!(
                    "Code has {} levels of nesting. This makes it hard to understand and test.",
                    level
                ),
            ));
        }

        Ok(findings)
    }
}
