//! Detector execution engine
//!
//! The DetectorEngine runs every registered detector over one source
//! submission:
//! - Runs detectors sequentially in registration order
//! - Isolates failures (errors and panics) so one detector cannot sink the rest
//! - Concatenates findings in detector order
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    DetectorEngine                       │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Register detectors                                  │
//! │  2. Run each detector on the source text                │
//! │  3. Log and drop failed detectors                       │
//! │  4. Concatenate findings in registration order          │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::detectors::base::Detector;
use crate::models::Finding;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Orchestrates rule-based detection across all registered detectors
///
/// Every finding a detector reports is kept unless that detector's own
/// config sets `max_findings`.
pub struct DetectorEngine {
    /// Registered detectors, in run order
    detectors: Vec<Arc<dyn Detector>>,
}

/// Outcome of one engine run
#[derive(Debug, Default)]
pub struct EngineRun {
    pub findings: Vec<Finding>,
    /// Detectors that errored or panicked, in run order
    pub failed: Vec<&'static str>,
}

impl DetectorEngine {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Register multiple detectors
    pub fn register_all(&mut self, detectors: impl IntoIterator<Item = Arc<dyn Detector>>) {
        self.detectors.extend(detectors);
    }

    /// Get names of all registered detectors
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Number of registered detectors (test-only accessor)
    #[cfg(test)]
    pub(crate) fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Run all detectors and return the concatenated findings
    ///
    /// Never fails: a detector that errors contributes no findings.
    pub fn run(&self, source: &str) -> Vec<Finding> {
        let start = Instant::now();
        let run = self.run_detailed(source);
        debug!(
            "Rule detection: {} detectors, {} failed, {} findings in {}ms",
            self.detectors.len(),
            run.failed.len(),
            run.findings.len(),
            start.elapsed().as_millis()
        );
        run.findings
    }

    /// Run all detectors, recording which ones failed
    pub fn run_detailed(&self, source: &str) -> EngineRun {
        let mut run = EngineRun::default();
        for detector in &self.detectors {
            match run_single_detector(detector.as_ref(), source) {
                Some(findings) => run.findings.extend(findings),
                None => run.failed.push(detector.name()),
            }
        }
        run
    }
}

/// Run one detector, turning errors and panics into `None`
fn run_single_detector(detector: &dyn Detector, source: &str) -> Option<Vec<Finding>> {
    let name = detector.name();
    let start = Instant::now();

    let detect_result =
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| detector.detect(source)));

    match detect_result {
        Ok(Ok(mut findings)) => {
            if let Some(max) = detector.config().and_then(|c| c.max_findings) {
                findings.truncate(max);
            }
            debug!(
                "Detector {} found {} findings in {}ms",
                name,
                findings.len(),
                start.elapsed().as_millis()
            );
            Some(findings)
        }
        Ok(Err(e)) => {
            warn!("Detector {} failed: {}", name, e);
            None
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            error!("Detector {} panicked: {}", name, panic_msg);
            None
        }
    }
}

impl Default for DetectorEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for DetectorEngine with fluent API
#[derive(Default)]
pub struct DetectorEngineBuilder {
    detectors: Vec<Arc<dyn Detector>>,
}

impl DetectorEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detector
    pub fn detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Add multiple detectors
    pub fn detectors(mut self, detectors: impl IntoIterator<Item = Arc<dyn Detector>>) -> Self {
        self.detectors.extend(detectors);
        self
    }

    /// Build the engine
    pub fn build(self) -> DetectorEngine {
        let mut engine = DetectorEngine::new();
        engine.register_all(self.detectors);
        engine
    }
}
