//! Project-level configuration support
//!
//! Loads configuration from `codesmell.toml` in the working directory, or
//! from an explicit path given with `--config`.
//!
//! # Configuration Format
//!
//! ```toml
//! # codesmell.toml
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//!
//! [model]
//! model_path = "ml_model.json"
//! scaler_path = "scaler.json"
//!
//! [detectors.long-method]
//! enabled = true
//! thresholds = { max_lines = 25, high_lines = 40 }
//!
//! [detectors.magic-number]
//! thresholds = { acceptable = ["0", "100", "1000", "60"] }
//!
//! [defaults]
//! format = "json"
//! ```

use crate::detectors::DetectorConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "codesmell.toml";

/// Project-level configuration loaded from codesmell.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// HTTP service bind address
    #[serde(default)]
    pub server: ServerConfig,

    /// Classifier artifact locations
    #[serde(default)]
    pub model: ModelConfig,

    /// Per-detector configuration overrides
    #[serde(default)]
    pub detectors: HashMap<String, DetectorConfigOverride>,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// `[model]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Trained classifier (gbdt JSON)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Fitted feature scaler (JSON)
    #[serde(default = "default_scaler_path")]
    pub scaler_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            scaler_path: default_scaler_path(),
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("ml_model.json")
}

fn default_scaler_path() -> PathBuf {
    PathBuf::from("scaler.json")
}

/// Configuration override for a specific detector
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DetectorConfigOverride {
    /// Whether the detector is enabled (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Cap on findings from this detector
    #[serde(default)]
    pub max_findings: Option<usize>,

    /// Detector-specific threshold overrides
    /// Keys depend on the detector (e.g., max_lines, max_params, max_methods)
    #[serde(default)]
    pub thresholds: HashMap<String, ThresholdValue>,
}

/// A threshold value can be an integer, float, boolean, string or list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    List(Vec<ThresholdValue>),
}

impl ThresholdValue {
    /// Convert to the JSON value detectors read their options from
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ThresholdValue::Integer(v) => serde_json::Value::from(*v),
            ThresholdValue::Float(v) => serde_json::Value::from(*v),
            ThresholdValue::Boolean(v) => serde_json::Value::from(*v),
            ThresholdValue::String(v) => serde_json::Value::from(v.as_str()),
            ThresholdValue::List(items) => {
                serde_json::Value::Array(items.iter().map(ThresholdValue::to_json).collect())
            }
        }
    }
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format for `analyze` (text, json)
    #[serde(default)]
    pub format: Option<String>,
}

/// Load project configuration.
///
/// An explicit path wins; otherwise `codesmell.toml` in the working directory
/// is used when present. A file that fails to load logs a warning and the
/// defaults are returned.
pub fn load_project_config(explicit: Option<&Path>) -> ProjectConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = PathBuf::from(CONFIG_FILE_NAME);
            if !candidate.exists() {
                debug!("No project config found, using defaults");
                return ProjectConfig::default();
            }
            candidate
        }
    };

    match load_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded project config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            ProjectConfig::default()
        }
    }
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

impl ProjectConfig {
    fn detector_override(&self, name: &str) -> Option<&DetectorConfigOverride> {
        let normalized = normalize_detector_name(name);
        self.detectors.get(&normalized).or_else(|| {
            self.detectors
                .iter()
                .find(|(key, _)| normalize_detector_name(key) == normalized)
                .map(|(_, value)| value)
        })
    }

    /// Check if a detector is enabled (defaults to true if not specified)
    pub fn is_detector_enabled(&self, name: &str) -> bool {
        self.detector_override(name)
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    /// Build the runtime config handed to a detector's `with_config`
    pub fn detector_config(&self, name: &str) -> DetectorConfig {
        let mut config = DetectorConfig::new();
        if let Some(overrides) = self.detector_override(name) {
            if let Some(max) = overrides.max_findings {
                config = config.with_max_findings(max);
            }
            for (key, value) in &overrides.thresholds {
                config = config.with_option(key.clone(), value.to_json());
            }
        }
        config
    }
}

/// Normalize detector name for config lookup
/// Converts various formats to kebab-case for matching
pub fn normalize_detector_name(name: &str) -> String {
    // LongMethodDetector -> long-method
    // long_method -> long-method
    // long-method -> long-method

    let mut result = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            // Hyphen before a word start: camel hump, or the last capital of an acronym
            let prev_is_lower = i > 0 && chars[i - 1].is_lowercase();
            let is_acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_lowercase();

            if prev_is_lower || is_acronym_end {
                result.push('-');
            }
            result.extend(c.to_lowercase());
        } else if *c == '_' {
            result.push('-');
        } else {
            result.push(*c);
        }
    }

    result.trim_end_matches("-detector").to_string()
}
