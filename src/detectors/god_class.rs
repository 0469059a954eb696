//! God class detector
//!
//! Detects classes that define too many methods, a sign the class has taken
//! on too many responsibilities. Only methods defined directly in the class
//! body count; nested classes are measured on their own.
//!
//! Works on the syntax tree, so source that fails to parse yields no
//! findings.

use crate::detectors::base::{Detector, DetectorConfig};
use crate::models::{Finding, Severity, SmellKind};
use crate::parsers::parse_source;
use anyhow::Result;
use tracing::debug;

/// Thresholds for god class detection
#[derive(Debug, Clone)]
pub struct GodClassThresholds {
    /// Classes with more methods than this are flagged
    pub max_methods: usize,
    /// Classes with more methods than this are high severity
    pub high_methods: usize,
}

impl Default for GodClassThresholds {
    fn default() -> Self {
        Self {
            max_methods: 10,
            high_methods: 15,
        }
    }
}

/// Detects classes with too many direct methods
pub struct GodClassDetector {
    config: DetectorConfig,
    thresholds: GodClassThresholds,
}

impl GodClassDetector {
    /// Create a new detector with default thresholds
    pub fn new() -> Self {
        Self::with_thresholds(GodClassThresholds::default())
    }

    /// Create with custom thresholds
    pub fn with_thresholds(thresholds: GodClassThresholds) -> Self {
        Self {
            config: DetectorConfig::new(),
            thresholds,
        }
    }

    /// Create with custom config
    pub fn with_config(config: DetectorConfig) -> Self {
        let defaults = GodClassThresholds::default();
        let thresholds = GodClassThresholds {
            max_methods: config.get_option_or("max_methods", defaults.max_methods),
            high_methods: config.get_option_or("high_methods", defaults.high_methods),
        };
        Self { config, thresholds }
    }

    fn calculate_severity(&self, method_count: usize) -> Severity {
        if method_count > self.thresholds.high_methods {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

impl Default for GodClassDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for GodClassDetector {
    fn name(&self) -> &'static str {
        "god-class"
    }

    fn config(&self) -> Option<&DetectorConfig> {
        Some(&self.config)
    }

    fn detect(&self, source: &str) -> Result<Vec<Finding>> {
        let parsed = match parse_source(source) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("god-class skipped unparsable source: {}", e);
                return Ok(Vec::new());
            }
        };

        let findings = parsed
            .classes()
            .into_iter()
            .filter(|class| class.methods.len() > self.thresholds.max_methods)
            .map(|class| {
                let method_count = class.methods.len();
                Finding::rule(
                    SmellKind::GodClass,
                    self.calculate_severity(method_count),
                    class.line_start,
                    format!(
                        "Class '{}' has {} methods. It likely has too many responsibilities.",
                        class.name, method_count
                    ),
                )
            })
            .collect();

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_with_methods(name: &str, count: usize) -> String {
        let mut source = format!("class {}:\n", name);
        for i in 0..count {
            source.push_str(&format!("    def method_{}(self):\n        return {}\n", i, i));
        }
        source
    }

    #[test]
    fn test_threshold_boundaries() {
        let detector = GodClassDetector::new();

        assert!(detector.detect(&class_with_methods("Ten", 10)).unwrap().is_empty());

        let findings = detector.detect(&class_with_methods("Eleven", 11)).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[0].line_number, 1);
        assert_eq!(
            findings[0].description,
            "Class 'Eleven' has 11 methods. It likely has too many responsibilities."
        );

        let findings = detector.detect(&class_with_methods("Sixteen", 16)).unwrap();
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn test_located_at_class_line() {
        let source = format!("import os\n\n\n{}", class_with_methods("Late", 12));
        let findings = GodClassDetector::new().detect(&source).unwrap();
        assert_eq!(findings[0].line_number, 4);
    }

    #[test]
    fn test_nested_function_not_counted_as_method() {
        let mut source = class_with_methods("Almost", 10);
        source.push_str("    def outer(self):\n        def inner():\n            pass\n        return inner\n");
        let findings = GodClassDetector::new().detect(&source).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("has 11 methods"));
    }

    #[test]
    fn test_unparsable_source_yields_nothing() {
        let source = format!("{}\n    def broken(:\n", class_with_methods("Big", 20));
        assert!(GodClassDetector::new().detect(&source).unwrap().is_empty());
    }
}
