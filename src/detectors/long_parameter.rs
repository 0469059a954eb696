//! Long parameter list detector
//!
//! Detects functions with too many parameters, which usually means related
//! parameters should be grouped into an object.
//!
//! Signatures are matched one line at a time, so a `def` whose parameter
//! list spans several lines is not recognised.

use crate::detectors::base::{Detector, DetectorConfig};
use crate::models::{Finding, Severity, SmellKind};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

static SIGNATURE: OnceLock<Regex> = OnceLock::new();

fn signature_pattern() -> &'static Regex {
    SIGNATURE.get_or_init(|| {
        Regex::new(r"^\s*def\s+(\w+)\((.*?)\):").expect("valid signature regex")
    })
}

/// Parameters to exclude from counting
static SKIP_PARAMS: &[&str] = &["self"];

/// Thresholds for long parameter list detection
#[derive(Debug, Clone)]
pub struct LongParameterThresholds {
    /// Parameters above this count are flagged
    pub max_params: usize,
    /// Parameters above this count are high severity
    pub high_params: usize,
}

impl Default for LongParameterThresholds {
    fn default() -> Self {
        Self {
            max_params: 5,
            high_params: 7,
        }
    }
}

/// Detects functions with too many parameters
pub struct LongParameterListDetector {
    config: DetectorConfig,
    thresholds: LongParameterThresholds,
}

impl LongParameterListDetector {
    /// Create a new detector with default thresholds
    pub fn new() -> Self {
        Self::with_thresholds(LongParameterThresholds::default())
    }

    /// Create with custom thresholds
    pub fn with_thresholds(thresholds: LongParameterThresholds) -> Self {
        Self {
            config: DetectorConfig::new(),
            thresholds,
        }
    }

    /// Create with custom config
    pub fn with_config(config: DetectorConfig) -> Self {
        let defaults = LongParameterThresholds::default();
        let thresholds = LongParameterThresholds {
            max_params: config.get_option_or("max_params", defaults.max_params),
            high_params: config.get_option_or("high_params", defaults.high_params),
        };
        Self { config, thresholds }
    }

    /// Non-empty comma-separated entries, excluding the receiver
    fn meaningful_params(params: &str) -> Vec<&str> {
        params
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty() && !SKIP_PARAMS.contains(p))
            .collect()
    }
}

impl Default for LongParameterListDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for LongParameterListDetector {
    fn name(&self) -> &'static str {
        "too-many-parameters"
    }

    fn config(&self) -> Option<&DetectorConfig> {
        Some(&self.config)
    }

    fn detect(&self, source: &str) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (idx, line) in source.split('\n').enumerate() {
            let Some(caps) = signature_pattern().captures(line) else {
                continue;
            };
            let name = caps.get(1).map_or("", |m| m.as_str());
            let params = Self::meaningful_params(caps.get(2).map_or("", |m| m.as_str()));
            let count = params.len();

            if count <= self.thresholds.max_params {
                continue;
            }
            let severity = if count > self.thresholds.high_params {
                Severity::High
            } else {
                Severity::Medium
            };
            findings.push(Finding::rule(
                SmellKind::TooManyParameters,
                severity,
                (idx + 1) as u32,
                format!(
                    "Function '{}' has {} parameters. Keep it under {} for better readability.",
                    name, count, self.thresholds.max_params
                ),
            ));
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        let detector = LongParameterListDetector::new();

        assert!(detector
            .detect("def f(a, b, c, d, e):\n    pass")
            .unwrap()
            .is_empty());

        let findings = detector.detect("def f(a, b, c, d, e, g):\n    pass").unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(
            findings[0].description,
            "Function 'f' has 6 parameters. Keep it under 5 for better readability."
        );

        let findings = detector
            .detect("x = 1\ndef f(a, b, c, d, e, g, h, i):\n    pass")
            .unwrap();
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].line_number, 2);
    }

    #[test]
    fn test_self_is_not_counted() {
        let source = "class A:\n    def m(self, a, b, c, d, e):\n        pass";
        assert!(LongParameterListDetector::new().detect(source).unwrap().is_empty());
    }

    #[test]
    fn test_multiline_signature_ignored() {
        let source = "def f(a, b, c,\n      d, e, g, h):\n    pass";
        assert!(LongParameterListDetector::new().detect(source).unwrap().is_empty());
    }

    #[test]
    fn test_meaningful_params() {
        assert_eq!(
            LongParameterListDetector::meaningful_params(" self, a ,, b=1 "),
            vec!["a", "b=1"]
        );
        assert!(LongParameterListDetector::meaningful_params("").is_empty());
    }
}
