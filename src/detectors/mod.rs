//! Rule-based code smell detectors
//!
//! Each detector looks at one source submission independently and reports
//! [`Finding`](crate::models::Finding)s. The [`DetectorEngine`] runs them in a
//! fixed order and concatenates the results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │   source text    │────▶│  DetectorEngine  │────▶│  Findings   │
//! └──────────────────┘     └──────────────────┘     └─────────────┘
//!                                   │
//!                 ┌─────────┬───────┼────────┬───────────┐
//!                 ▼         ▼       ▼        ▼           ▼
//!            long-method  params  nesting  god-class  magic-number
//! ```
//!
//! Line-based detectors (long method, parameters, nesting, magic numbers)
//! accept any text. The god class detector needs a syntax tree and reports
//! nothing for source that does not parse.
//!
//! # Example
//!
//! ```ignore
//! use codesmell::detectors::{DetectorEngineBuilder, GodClassDetector, MagicNumbersDetector};
//! use std::sync::Arc;
//!
//! let engine = DetectorEngineBuilder::new()
//!     .detector(Arc::new(GodClassDetector::new()))
//!     .detector(Arc::new(MagicNumbersDetector::new()))
//!     .build();
//!
//! let findings = engine.run("x = 42\n");
//! ```

mod base;
mod engine;

mod deep_nesting;
mod god_class;
mod long_methods;
mod long_parameter;
mod magic_numbers;

pub use base::{Detector, DetectorConfig};
pub use engine::{DetectorEngine, DetectorEngineBuilder, EngineRun};

pub use deep_nesting::{DeepNestingDetector, DeepNestingThresholds};
pub use god_class::{GodClassDetector, GodClassThresholds};
pub use long_methods::{LongMethodDetector, LongMethodThresholds};
pub use long_parameter::{LongParameterListDetector, LongParameterThresholds};
pub use magic_numbers::MagicNumbersDetector;

use crate::config::ProjectConfig;
use std::sync::Arc;
use tracing::debug;

/// Create the five rule detectors in their fixed run order, applying
/// per-detector thresholds and skipping disabled detectors
pub fn default_detectors(project_config: &ProjectConfig) -> Vec<Arc<dyn Detector>> {
    let all: Vec<Arc<dyn Detector>> = vec![
        Arc::new(LongMethodDetector::with_config(
            project_config.detector_config("long-method"),
        )),
        Arc::new(LongParameterListDetector::with_config(
            project_config.detector_config("too-many-parameters"),
        )),
        Arc::new(DeepNestingDetector::with_config(
            project_config.detector_config("deep-nesting"),
        )),
        Arc::new(GodClassDetector::with_config(
            project_config.detector_config("god-class"),
        )),
        Arc::new(MagicNumbersDetector::with_config(
            project_config.detector_config("magic-number"),
        )),
    ];

    all.into_iter()
        .filter(|d| {
            let enabled = project_config.is_detector_enabled(d.name());
            if !enabled {
                debug!("Detector {} disabled by config", d.name());
            }
            enabled
        })
        .collect()
}

/// Create a detector engine with all default detectors
pub fn create_default_engine(project_config: &ProjectConfig) -> DetectorEngine {
    DetectorEngineBuilder::new()
        .detectors(default_detectors(project_config))
        .build()
}
