//! Configuration module for codesmell
//!
//! This module handles:
//! - Project-level configuration (codesmell.toml)
//! - Server bind address and classifier artifact paths
//! - Detector threshold overrides

mod project_config;

pub use project_config::{
    CliDefaults,
    DetectorConfigOverride,
    ModelConfig,
    ProjectConfig,
    ServerConfig,
    ThresholdValue,
    load_project_config,
    normalize_detector_name,
    CONFIG_FILE_NAME,
};
