//! Dataset and training command handlers

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::classifier::{dataset, train, TrainConfig};

/// Generate the synthetic dataset and write it as JSON
pub fn run_dataset(output: &Path, seed: u64) -> Result<()> {
    let samples = dataset::generate(seed);
    dataset::save(&samples, output)?;

    let smelly = samples.iter().filter(|s| s.has_smell).count();
    println!(
        "Wrote {} samples ({} smelly, {} clean) to {}",
        samples.len(),
        smelly,
        samples.len() - smelly,
        output.display()
    );
    Ok(())
}

/// Train on a dataset file, or on a freshly generated one
pub fn run_train(data: Option<&Path>, model_out: &Path, scaler_out: &Path, seed: u64) -> Result<()> {
    let samples = match data {
        Some(path) => dataset::load(path)?,
        None => {
            info!("No dataset given, generating one with seed {}", seed);
            dataset::generate(seed)
        }
    };

    let config = TrainConfig {
        seed,
        model_out: model_out.to_path_buf(),
        scaler_out: scaler_out.to_path_buf(),
        ..TrainConfig::default()
    };
    let result = train(&samples, &config).context("Training failed")?;

    println!(
        "Trained on {} samples ({} smelly, {} clean, {} skipped)",
        result.samples_used, result.smelly, result.clean, result.samples_skipped
    );
    println!(
        "  train: {} examples, accuracy {:.4}",
        result.train_size, result.train_accuracy
    );
    match result.test_accuracy {
        Some(acc) => println!("  test:  {} examples, accuracy {:.4}", result.test_size, acc),
        None => println!("  test:  no held-out examples"),
    }
    println!("Model:  {}", result.model_path.display());
    println!("Scaler: {}", result.scaler_path.display());
    Ok(())
}
