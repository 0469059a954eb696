//! Smell classifier
//!
//! A gradient-boosted binary classifier over the structural feature vector.
//!
//! Pipeline: source → [`FeatureVector`] → [`StandardScaler`] → GBDT →
//! probability that the code smells.
//!
//! [`SmellClassifier::predict`] never fails. A missing model, unparsable
//! source or an inference error all produce a neutral "no smell" prediction
//! carrying the reason in `error`.

pub mod dataset;
pub mod gbdt_model;
pub mod scaler;
pub mod train;

pub use dataset::{LabeledSample, SampleCategory};
pub use gbdt_model::{GbdtClassifier, GbdtParams};
pub use scaler::StandardScaler;
pub use train::{train, TrainConfig, TrainError, TrainResult};

use crate::features::{FeatureExtractor, FeatureVector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading or running the classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Class probabilities of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub clean: f64,
    pub smell: f64,
}

/// Classifier output, serialized as `ml_prediction` in the analysis response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    pub has_smell: bool,
    /// Probability of the predicted class
    pub confidence: f64,
    pub features: Option<FeatureVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Probabilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MlPrediction {
    /// Neutral result used whenever the classifier cannot answer
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            has_smell: false,
            confidence: 0.0,
            features: None,
            probabilities: None,
            error: Some(reason.into()),
        }
    }

    fn from_probability(p_smell: f64, features: FeatureVector) -> Self {
        let has_smell = p_smell >= 0.5;
        Self {
            has_smell,
            confidence: if has_smell { p_smell } else { 1.0 - p_smell },
            features: Some(features),
            probabilities: Some(Probabilities {
                clean: 1.0 - p_smell,
                smell: p_smell,
            }),
            error: None,
        }
    }
}

struct LoadedModel {
    gbdt: GbdtClassifier,
    scaler: StandardScaler,
}

/// Classifier adapter shared by every request
///
/// Built once at startup and immutable afterwards.
pub struct SmellClassifier {
    model: Option<LoadedModel>,
    extractor: FeatureExtractor,
}

impl SmellClassifier {
    /// A classifier with no model; every prediction is "unavailable"
    pub fn unloaded() -> Self {
        Self {
            model: None,
            extractor: FeatureExtractor::new(),
        }
    }

    pub fn from_parts(gbdt: GbdtClassifier, scaler: StandardScaler) -> Self {
        Self {
            model: Some(LoadedModel { gbdt, scaler }),
            extractor: FeatureExtractor::new(),
        }
    }

    /// Load model and scaler artifacts
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, ClassifierError> {
        let gbdt = GbdtClassifier::load(model_path)?;
        if !scaler_path.exists() {
            return Err(ClassifierError::MissingArtifact(scaler_path.to_path_buf()));
        }
        let scaler = StandardScaler::load(scaler_path)?;
        Ok(Self::from_parts(gbdt, scaler))
    }

    /// Load artifacts, degrading to [`SmellClassifier::unloaded`] on failure
    pub fn load_or_unloaded(model_path: &Path, scaler_path: &Path) -> Self {
        match Self::load(model_path, scaler_path) {
            Ok(classifier) => {
                info!("ML model loaded from {}", model_path.display());
                classifier
            }
            Err(e) => {
                warn!("Could not load ML model: {}", e);
                Self::unloaded()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Classify source text
    pub fn predict(&self, source: &str) -> MlPrediction {
        if !self.is_loaded() {
            return MlPrediction::unavailable("ML model not loaded");
        }
        self.predict_features(self.extractor.extract_or_none(source))
    }

    /// Classify an already extracted feature vector
    pub fn predict_features(&self, features: Option<FeatureVector>) -> MlPrediction {
        let Some(model) = &self.model else {
            return MlPrediction::unavailable("ML model not loaded");
        };
        let Some(features) = features else {
            return MlPrediction::unavailable("Failed to extract features");
        };

        match model
            .scaler
            .transform(&features.values())
            .and_then(|row| model.gbdt.predict_proba(&row))
        {
            Ok(p_smell) => MlPrediction::from_probability(p_smell, features),
            Err(e) => {
                warn!("ML prediction failed: {}", e);
                MlPrediction::unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::NUM_FEATURES;
    use gbdt_model::train_gbdt;

    fn trained_parts() -> (GbdtClassifier, StandardScaler) {
        let extractor = FeatureExtractor::new();
        let samples = dataset::generate(3);
        let rows: Vec<([f64; NUM_FEATURES], bool)> = samples
            .iter()
            .filter_map(|s| extractor.extract_or_none(&s.code).map(|f| (f.values(), s.has_smell)))
            .collect();
        let raw: Vec<[f64; NUM_FEATURES]> = rows.iter().map(|(f, _)| *f).collect();
        let scaler = StandardScaler::fit(&raw).unwrap();
        let scaled: Vec<Vec<f64>> = raw.iter().map(|r| scaler.transform(r).unwrap()).collect();
        let labels: Vec<f64> = rows.iter().map(|(_, l)| if *l { 1.0 } else { -1.0 }).collect();
        let params = GbdtParams {
            num_trees: 10,
            max_depth: 3,
            learning_rate: 0.3,
        };
        let gbdt = GbdtClassifier::from_trained(train_gbdt(&scaled, &labels, &params).unwrap());
        (gbdt, scaler)
    }

    fn trained_classifier() -> SmellClassifier {
        let (gbdt, scaler) = trained_parts();
        SmellClassifier::from_parts(gbdt, scaler)
    }

    #[test]
    fn test_unloaded_prediction() {
        let classifier = SmellClassifier::unloaded();
        assert!(!classifier.is_loaded());
        let pred = classifier.predict("def f():\n    pass");
        assert!(!pred.has_smell);
        assert_eq!(pred.confidence, 0.0);
        assert!(pred.features.is_none());
        assert!(pred.error.is_some());
    }

    #[test]
    fn test_load_missing_artifacts_degrades() {
        let classifier = SmellClassifier::load_or_unloaded(
            Path::new("/nonexistent/ml_model.json"),
            Path::new("/nonexistent/scaler.json"),
        );
        assert!(!classifier.is_loaded());
    }

    #[test]
    fn test_loaded_prediction_shape() {
        let classifier = trained_classifier();
        assert!(classifier.is_loaded());

        let pred = classifier.predict("def square(x):\n    return x * x");
        assert!(pred.error.is_none());
        let probs = pred.probabilities.expect("probabilities present");
        assert!((probs.clean + probs.smell - 1.0).abs() < 1e-9);
        assert_eq!(pred.has_smell, probs.smell >= 0.5);
        assert!(pred.confidence >= 0.5 && pred.confidence <= 1.0);
        assert!(pred.features.is_some());
    }

    #[test]
    fn test_unparsable_source_with_model() {
        let pred = trained_classifier().predict("def broken(:");
        assert!(!pred.has_smell);
        assert_eq!(pred.confidence, 0.0);
        assert_eq!(pred.error.as_deref(), Some("Failed to extract features"));
    }

    #[test]
    fn test_scaler_shape_error_is_reported() {
        let (gbdt, _) = trained_parts();
        let broken = SmellClassifier::from_parts(
            gbdt,
            StandardScaler {
                mean: vec![0.0; 3],
                scale: vec![1.0; 3],
            },
        );
        let pred = broken.predict("x = 1");
        assert!(!pred.has_smell);
        assert_eq!(pred.confidence, 0.0);
        assert!(pred.error.unwrap().contains("expected 3 features"));
    }

    #[test]
    fn test_prediction_json_omits_absent_fields() {
        let v = serde_json::to_value(MlPrediction::unavailable("ML model not loaded")).unwrap();
        assert_eq!(v["has_smell"], false);
        assert_eq!(v["confidence"], 0.0);
        assert!(v["features"].is_null());
        assert!(v.get("probabilities").is_none());
    }
}
