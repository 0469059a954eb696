//! Detector trait and per-detector settings
//!
//! Thresholds arrive from `[detectors.<name>]` sections of the project config
//! as loosely typed JSON values. Each detector reads the keys it knows with
//! [`DetectorConfig::get_option_or`] and falls back to its built-in default.

use crate::models::Finding;
use anyhow::Result;
use std::collections::HashMap;

/// Settings for one detector
#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    /// Keep at most this many findings from the detector
    pub max_findings: Option<usize>,
    /// Threshold overrides keyed by name (e.g. `max_lines`)
    pub options: HashMap<String, serde_json::Value>,
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_findings(mut self, max: usize) -> Self {
        self.max_findings = Some(max);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Typed option value; `None` when missing or of the wrong shape
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_option_or<T: serde::de::DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_option(key).unwrap_or(default)
    }
}

/// A rule-based smell detector
pub trait Detector: Send + Sync {
    /// Stable name, matching the detector's `[detectors.<name>]` config
    /// section (e.g. "long-method")
    fn name(&self) -> &'static str;

    /// Run detection over raw source text
    ///
    /// Detectors must tolerate arbitrary text. Malformed input yields no
    /// findings rather than an error wherever the rule allows it.
    fn detect(&self, source: &str) -> Result<Vec<Finding>>;

    fn config(&self) -> Option<&DetectorConfig> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_config() {
        let config = DetectorConfig::new()
            .with_max_findings(100)
            .with_option("max_lines", serde_json::json!(30));

        assert_eq!(config.max_findings, Some(100));
        assert_eq!(config.get_option::<usize>("max_lines"), Some(30));
        assert_eq!(config.get_option_or("missing", 5usize), 5);
    }

    #[test]
    fn test_config_option_with_wrong_type_falls_back() {
        let config = DetectorConfig::new().with_option("max_lines", serde_json::json!("many"));
        assert_eq!(config.get_option_or("max_lines", 25usize), 25);
    }
}
