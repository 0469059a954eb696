//! HTTP service command handler

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::classifier::SmellClassifier;
use crate::config::ProjectConfig;
use crate::pipeline::Analyzer;
use crate::server::{run_server, AppState};

/// Load the classifier once, then serve until killed
pub fn run(config: &ProjectConfig, host: &str, port: u16, model: &Path, scaler: &Path) -> Result<()> {
    let classifier = SmellClassifier::load_or_unloaded(model, scaler);
    let state = Arc::new(AppState::new(Analyzer::from_config(config, classifier)));
    run_server(host, port, state)
}
