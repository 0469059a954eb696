//! Standard feature scaling
//!
//! Persisted alongside the model so inference applies exactly the
//! transformation fitted on the training split: `(x - mean) / scale`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ClassifierError;
use crate::features::NUM_FEATURES;

/// Per-feature mean and standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    /// Population standard deviation; zero-variance features use 1.0
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on a set of rows. Returns `None` for an empty set.
    pub fn fit(rows: &[[f64; NUM_FEATURES]]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let n = rows.len() as f64;

        let mut mean = vec![0.0; NUM_FEATURES];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = vec![0.0; NUM_FEATURES];
        for row in rows {
            for ((var, v), m) in variance.iter_mut().zip(row).zip(&mean) {
                *var += (v - m).powi(2);
            }
        }
        let scale = variance
            .into_iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Some(Self { mean, scale })
    }

    /// Scale one row
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        if row.len() != self.mean.len() || row.len() != self.scale.len() {
            return Err(ClassifierError::ShapeMismatch {
                expected: self.mean.len(),
                actual: row.len(),
            });
        }
        let scaled: Vec<f64> = row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((x, m), s)| (x - m) / s)
            .collect();
        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(ClassifierError::Inference(
                "scaled features contain non-finite values".to_string(),
            ));
        }
        Ok(scaled)
    }

    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path).map_err(|e| ClassifierError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let scaler: Self = serde_json::from_str(&content)
            .map_err(|e| ClassifierError::InvalidArtifact(format!("scaler: {e}")))?;
        if scaler.mean.len() != NUM_FEATURES || scaler.scale.len() != NUM_FEATURES {
            return Err(ClassifierError::ShapeMismatch {
                expected: NUM_FEATURES,
                actual: scaler.mean.len(),
            });
        }
        Ok(scaler)
    }

    pub fn save(&self, path: &Path) -> Result<(), ClassifierError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ClassifierError::InvalidArtifact(format!("scaler: {e}")))?;
        std::fs::write(path, json).map_err(|e| ClassifierError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
