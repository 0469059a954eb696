//! Training for the smell classifier
//!
//! Extracts features from labelled samples, fits the scaler on the training
//! split, trains a GBDT and writes both artifacts.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use super::dataset::LabeledSample;
use super::gbdt_model::{train_gbdt, GbdtClassifier, GbdtParams};
use super::scaler::StandardScaler;
use super::ClassifierError;
use crate::features::{FeatureExtractor, NUM_FEATURES};

/// Fewest usable samples worth training on
pub const MIN_TRAINING_SAMPLES: usize = 10;

/// Errors raised by the training pipeline
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("need at least {required} usable samples, found {found}")]
    TooFewSamples { found: usize, required: usize },

    #[error("training split is empty")]
    EmptySplit,

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Seed for the train/test shuffle
    pub seed: u64,
    /// Share of each class held out for testing (0.0 - 1.0)
    pub test_split: f64,
    pub params: GbdtParams,
    pub model_out: PathBuf,
    pub scaler_out: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_split: 0.2,
            params: GbdtParams::default(),
            model_out: PathBuf::from("ml_model.json"),
            scaler_out: PathBuf::from("scaler.json"),
        }
    }
}

/// Training result
#[derive(Debug)]
pub struct TrainResult {
    /// Samples whose features could be extracted
    pub samples_used: usize,
    /// Samples skipped because they did not parse
    pub samples_skipped: usize,
    pub smelly: usize,
    pub clean: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub train_accuracy: f64,
    /// `None` when the test split is empty
    pub test_accuracy: Option<f64>,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

type Row = ([f64; NUM_FEATURES], bool);

/// Shuffle each class on its own and hold out `test_split` of it
fn stratified_split(rows: Vec<Row>, test_split: f64, seed: u64) -> (Vec<Row>, Vec<Row>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (mut smelly, mut clean): (Vec<Row>, Vec<Row>) = rows.into_iter().partition(|(_, l)| *l);

    let mut train = Vec::new();
    let mut test = Vec::new();
    for class in [&mut smelly, &mut clean] {
        class.shuffle(&mut rng);
        let n_test = ((class.len() as f64 * test_split).round() as usize).min(class.len());
        test.extend(class.drain(..n_test));
        train.append(class);
    }
    train.shuffle(&mut rng);
    (train, test)
}

fn accuracy(
    classifier: &GbdtClassifier,
    scaler: &StandardScaler,
    rows: &[Row],
) -> Result<f64, ClassifierError> {
    let scaled = rows
        .iter()
        .map(|(f, _)| scaler.transform(f))
        .collect::<Result<Vec<_>, _>>()?;
    let probs = classifier.predict_batch(&scaled);
    let correct = probs
        .iter()
        .zip(rows)
        .filter(|(p, (_, label))| (**p >= 0.5) == *label)
        .count();
    Ok(correct as f64 / rows.len().max(1) as f64)
}

/// Train the classifier on labelled samples and save the artifacts
pub fn train(samples: &[LabeledSample], config: &TrainConfig) -> Result<TrainResult, TrainError> {
    let extractor = FeatureExtractor::new();

    let rows: Vec<Row> = samples
        .iter()
        .filter_map(|s| extractor.extract_or_none(&s.code).map(|f| (f.values(), s.has_smell)))
        .collect();
    let samples_skipped = samples.len() - rows.len();
    if samples_skipped > 0 {
        debug!("Skipped {} samples that failed feature extraction", samples_skipped);
    }

    if rows.len() < MIN_TRAINING_SAMPLES {
        return Err(TrainError::TooFewSamples {
            found: rows.len(),
            required: MIN_TRAINING_SAMPLES,
        });
    }

    let samples_used = rows.len();
    let smelly = rows.iter().filter(|(_, l)| *l).count();
    info!(
        "Dataset: {} samples ({} smelly, {} clean)",
        samples_used,
        smelly,
        samples_used - smelly
    );

    let (train_rows, test_rows) = stratified_split(rows, config.test_split, config.seed);
    info!("Training: {} examples, Test: {} examples", train_rows.len(), test_rows.len());

    let train_features: Vec<[f64; NUM_FEATURES]> = train_rows.iter().map(|(f, _)| *f).collect();
    let scaler = StandardScaler::fit(&train_features).ok_or(TrainError::EmptySplit)?;

    let scaled = train_features
        .iter()
        .map(|f| scaler.transform(f))
        .collect::<Result<Vec<_>, _>>()?;
    let labels: Vec<f64> = train_rows
        .iter()
        .map(|(_, l)| if *l { 1.0 } else { -1.0 })
        .collect();

    let classifier = GbdtClassifier::from_trained(train_gbdt(&scaled, &labels, &config.params)?);

    let train_accuracy = accuracy(&classifier, &scaler, &train_rows)?;
    let test_accuracy = if test_rows.is_empty() {
        None
    } else {
        Some(accuracy(&classifier, &scaler, &test_rows)?)
    };
    info!(
        "Training accuracy: {:.4}, test accuracy: {}",
        train_accuracy,
        test_accuracy.map_or_else(|| "n/a".to_string(), |a| format!("{a:.4}"))
    );

    for path in [&config.model_out, &config.scaler_out] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ClassifierError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    classifier.save(&config.model_out)?;
    scaler.save(&config.scaler_out)?;
    info!(
        "Model saved to {}, scaler saved to {}",
        config.model_out.display(),
        config.scaler_out.display()
    );

    Ok(TrainResult {
        samples_used,
        samples_skipped,
        smelly,
        clean: samples_used - smelly,
        train_size: train_rows.len(),
        test_size: test_rows.len(),
        train_accuracy,
        test_accuracy,
        model_path: config.model_out.clone(),
        scaler_path: config.scaler_out.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::dataset::{self, SampleCategory};

    fn config_in(dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            params: GbdtParams {
                num_trees: 20,
                max_depth: 3,
                learning_rate: 0.3,
            },
            model_out: dir.join("model.json"),
            scaler_out: dir.join("scaler.json"),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_train_config_default() {
        let config = TrainConfig::default();
        assert_eq!(config.seed, 42);
        assert!((config.test_split - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.model_out, PathBuf::from("ml_model.json"));
    }

    #[test]
    fn test_too_few_samples() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<LabeledSample> = (0..5)
            .map(|i| LabeledSample {
                code: format!("x = {}", i),
                smell_type: SampleCategory::None,
                has_smell: false,
                severity: None,
            })
            .collect();
        let err = train(&samples, &config_in(dir.path())).unwrap_err();
        assert!(matches!(err, TrainError::TooFewSamples { found: 5, required: 10 }));
    }

    #[test]
    fn test_stratified_split_keeps_both_classes() {
        let rows: Vec<Row> = (0..50)
            .map(|i| ([i as f64; NUM_FEATURES], i % 5 == 0))
            .collect();
        let (train, test) = stratified_split(rows, 0.2, 1);
        assert_eq!(train.len() + test.len(), 50);
        assert_eq!(test.len(), 10);
        assert_eq!(test.iter().filter(|(_, l)| *l).count(), 2);
    }

    #[test]
    fn test_train_on_synthetic_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let samples = dataset::generate(42);

        let result = train(&samples, &config).expect("training should succeed");
        assert_eq!(result.samples_used + result.samples_skipped, samples.len());
        assert_eq!(result.train_size + result.test_size, result.samples_used);
        assert!(result.train_accuracy > 0.5);
        assert!(result.test_accuracy.is_some());
        assert!(config.model_out.exists());
        assert!(config.scaler_out.exists());

        let scaler = StandardScaler::load(&config.scaler_out).unwrap();
        assert_eq!(scaler.mean.len(), NUM_FEATURES);
        assert!(GbdtClassifier::load(&config.model_out).is_ok());
    }
}
