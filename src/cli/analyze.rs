//! Analyze command handler

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::classifier::SmellClassifier;
use crate::config::ProjectConfig;
use crate::pipeline::Analyzer;
use crate::reporters;

fn read_source(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

/// Analyze one file and print the report
pub fn run(config: &ProjectConfig, file: &Path, format: &str, model: &Path, scaler: &Path) -> Result<()> {
    let source = read_source(file)?;
    let analyzer = Analyzer::from_config(config, SmellClassifier::load_or_unloaded(model, scaler));

    let response = analyzer.analyze(&source)?;
    info!("{}: {} findings", file.display(), response.smells.len());

    println!("{}", reporters::report(&response, format)?);
    Ok(())
}
