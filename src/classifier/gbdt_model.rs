//! GBDT model wrapper for smell classification
//!
//! Wraps the `gbdt` crate to provide:
//! - Model loading from and saving to the gbdt-rs native JSON format
//! - Single and batch inference on scaled feature rows
//! - Training helper for building new models from labelled data
//!
//! The classifier produces probabilities via the `LogLikelyhood` loss
//! (binary classification), interpreting label 1.0 as smelly and -1.0 as
//! clean.
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`), while feature
//! rows are `f64`. Conversions happen at the crate boundary.

use std::path::Path;

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;

use super::ClassifierError;
use crate::features::NUM_FEATURES;

#[inline]
fn row_to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}

fn path_str(path: &Path) -> Result<&str, ClassifierError> {
    path.to_str()
        .ok_or_else(|| ClassifierError::InvalidArtifact("invalid UTF-8 in model path".to_string()))
}

/// Boosting hyperparameters
#[derive(Debug, Clone)]
pub struct GbdtParams {
    /// Number of boosting iterations
    pub num_trees: usize,
    pub max_depth: u32,
    /// Shrinkage / step size
    pub learning_rate: f64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: 6,
            learning_rate: 0.1,
        }
    }
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT`
pub struct GbdtClassifier {
    model: GBDT,
}

impl GbdtClassifier {
    /// Load a model from the gbdt-rs native JSON format on disk.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::MissingArtifact(path.to_path_buf()));
        }
        let model = GBDT::load_model(path_str(path)?)
            .map_err(|e| ClassifierError::InvalidArtifact(format!("failed to load GBDT model: {e}")))?;
        Ok(Self { model })
    }

    /// Wrap an already-trained `GBDT` instance.
    pub fn from_trained(model: GBDT) -> Self {
        Self { model }
    }

    /// Probability that one scaled feature row is smelly
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        if row.len() != NUM_FEATURES {
            return Err(ClassifierError::ShapeMismatch {
                expected: NUM_FEATURES,
                actual: row.len(),
            });
        }
        let data = vec![Data::new_test_data(row_to_f32(row), None)];
        let preds = self.model.predict(&data);
        let prob = preds
            .first()
            .copied()
            .ok_or_else(|| ClassifierError::Inference("model returned no prediction".to_string()))?
            as f64;
        if !prob.is_finite() {
            return Err(ClassifierError::Inference(format!("non-finite probability {prob}")));
        }
        Ok(prob.clamp(0.0, 1.0))
    }

    /// Smell probabilities for a batch of scaled rows
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        if rows.is_empty() {
            return Vec::new();
        }

        let data: Vec<Data> = rows
            .iter()
            .map(|r| Data::new_test_data(row_to_f32(r), None))
            .collect();

        self.model
            .predict(&data)
            .into_iter()
            .map(|p| (p as f64).clamp(0.0, 1.0))
            .collect()
    }

    /// Save to disk in the gbdt-rs native JSON format.
    pub fn save(&self, path: &Path) -> Result<(), ClassifierError> {
        self.model
            .save_model(path_str(path)?)
            .map_err(|e| ClassifierError::InvalidArtifact(format!("failed to save GBDT model: {e}")))
    }
}

/// Train a new GBDT model from labelled, scaled feature rows.
///
/// `labels` are 1.0 for smelly and -1.0 for clean (LogLikelyhood convention).
pub fn train_gbdt(
    rows: &[Vec<f64>],
    labels: &[f64],
    params: &GbdtParams,
) -> Result<GBDT, ClassifierError> {
    if rows.is_empty() {
        return Err(ClassifierError::Inference("no training samples provided".into()));
    }
    if rows.len() != labels.len() {
        return Err(ClassifierError::Inference(format!(
            "row count ({}) does not match label count ({})",
            rows.len(),
            labels.len()
        )));
    }
    if let Some(bad) = rows.iter().find(|r| r.len() != NUM_FEATURES) {
        return Err(ClassifierError::ShapeMismatch {
            expected: NUM_FEATURES,
            actual: bad.len(),
        });
    }

    let mut cfg = Config::new();
    cfg.set_feature_size(NUM_FEATURES);
    cfg.set_max_depth(params.max_depth);
    cfg.set_iterations(params.num_trees);
    cfg.set_shrinkage(params.learning_rate as f32);
    cfg.set_loss("LogLikelyhood");
    cfg.set_debug(false);
    cfg.set_training_optimization_level(2);
    cfg.set_min_leaf_size(1);

    let mut gbdt = GBDT::new(&cfg);

    let mut training_data: Vec<Data> = rows
        .iter()
        .zip(labels.iter())
        .map(|(r, &label)| Data::new_training_data(row_to_f32(r), 1.0_f32, label as f32, None))
        .collect();

    gbdt.fit(&mut training_data);

    Ok(gbdt)
}
