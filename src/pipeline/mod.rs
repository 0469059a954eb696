//! Analysis pipeline
//!
//! Orchestrates one analysis request:
//! 1. Run the rule detectors
//! 2. Extract features and run the classifier
//! 3. Fold a positive classifier verdict into the findings
//! 4. Deduplicate on `(smell_type, line_number)` and rank by severity
//! 5. Compute summary metrics

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::classifier::{MlPrediction, SmellClassifier};
use crate::config::ProjectConfig;
use crate::detectors::{create_default_engine, DetectorEngine};
use crate::features::{count_code_lines, FeatureExtractor, FeatureVector};
use crate::models::{CodeMetrics, Finding, Origin, Severity, SmellKind};

/// Errors surfaced to callers of [`Analyzer::analyze`]
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Code cannot be empty")]
    EmptyCode,
}

/// Combined result of one analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub smells: Vec<Finding>,
    pub metrics: CodeMetrics,
    pub ml_prediction: MlPrediction,
}

/// Rule engine plus classifier, shared read-only across requests
pub struct Analyzer {
    engine: DetectorEngine,
    classifier: SmellClassifier,
    extractor: FeatureExtractor,
}

impl Analyzer {
    pub fn new(engine: DetectorEngine, classifier: SmellClassifier) -> Self {
        Self {
            engine,
            classifier,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Default detectors configured from the project config
    pub fn from_config(config: &ProjectConfig, classifier: SmellClassifier) -> Self {
        Self::new(create_default_engine(config), classifier)
    }

    pub fn classifier(&self) -> &SmellClassifier {
        &self.classifier
    }

    /// Analyze one source submission
    pub fn analyze(&self, source: &str) -> Result<AnalysisResponse, AnalyzeError> {
        if source.trim().is_empty() {
            return Err(AnalyzeError::EmptyCode);
        }

        let rule_findings = self.engine.run(source);
        let features = self.extractor.extract_or_none(source);
        let ml_prediction = self.classifier.predict_features(features.clone());

        let smells = rank_findings(merge_findings(rule_findings, &ml_prediction));
        let metrics = calculate_code_metrics(source, features.as_ref());

        debug!(
            "Analysis produced {} findings (ml has_smell={})",
            smells.len(),
            ml_prediction.has_smell
        );

        Ok(AnalysisResponse {
            smells,
            metrics,
            ml_prediction,
        })
    }
}

/// Append the classifier's verdict as a finding when it predicts a smell
pub fn merge_findings(mut findings: Vec<Finding>, ml: &MlPrediction) -> Vec<Finding> {
    if ml.has_smell {
        findings.push(Finding {
            smell_type: SmellKind::MlDetected,
            severity: Severity::Medium,
            line_number: 1,
            description: format!(
                "ML model detected potential code smell with {:.1}% confidence",
                ml.confidence * 100.0
            ),
            suggestion: SmellKind::MlDetected.suggestion().to_string(),
            detector: Origin::Ml,
        });
    }
    findings
}

/// Drop later duplicates of `(smell_type, line_number)`, then stable-sort by
/// severity rank
pub fn rank_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = std::collections::HashSet::new();
    let mut unique: Vec<Finding> = findings
        .into_iter()
        .filter(|f| seen.insert((f.smell_type, f.line_number)))
        .collect();
    unique.sort_by_key(|f| f.severity.rank());
    unique
}

/// One decimal place, ties to even on the exact binary value
///
/// Float formatting already rounds the exact decimal expansion half to even,
/// so `1.25` becomes `1.2` and `0.15` (just below a tie) becomes `0.1`.
fn round1(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Summary metrics; all zeros when features are unavailable
pub fn calculate_code_metrics(source: &str, features: Option<&FeatureVector>) -> CodeMetrics {
    let Some(features) = features else {
        return CodeMetrics::default();
    };

    let lines = count_code_lines(source);
    let comment_ratio = features.num_comments as f64 / lines.max(1) as f64 * 100.0;
    let avg_method_length = lines as f64 / features.num_functions.max(1) as f64;

    CodeMetrics {
        lines,
        functions: features.num_functions,
        classes: features.num_classes,
        complexity: features.complexity,
        avg_method_length: round1(avg_method_length),
        comment_ratio: round1(comment_ratio),
        max_nesting_depth: Some(features.max_depth),
        max_parameters: Some(features.max_params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(kind: SmellKind, severity: Severity, line: u32, text: &str) -> Finding {
        Finding::rule(kind, severity, line, text.to_string())
    }

    fn smelly_prediction(confidence: f64) -> MlPrediction {
        MlPrediction {
            has_smell: true,
            confidence,
            features: None,
            probabilities: None,
            error: None,
        }
    }

    #[test]
    fn test_rank_findings_dedups_and_sorts_stably() {
        let findings = vec![
            finding(SmellKind::MagicNumber, Severity::Low, 3, "first"),
            finding(SmellKind::DeepNesting, Severity::Medium, 5, "nest-a"),
            finding(SmellKind::MagicNumber, Severity::Low, 3, "duplicate"),
            finding(SmellKind::GodClass, Severity::High, 1, "god"),
            finding(SmellKind::DeepNesting, Severity::High, 6, "nest-b"),
            finding(SmellKind::MagicNumber, Severity::Low, 4, "second"),
        ];
        let ranked = rank_findings(findings);
        let descriptions: Vec<&str> = ranked.iter().map(|f| f.description.as_str()).collect();
        assert_eq!(descriptions, vec!["god", "nest-b", "nest-a", "first", "second"]);
    }

    #[test]
    fn test_ml_finding_appended() {
        let merged = merge_findings(Vec::new(), &smelly_prediction(0.873));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].smell_type, SmellKind::MlDetected);
        assert_eq!(merged[0].severity, Severity::Medium);
        assert_eq!(merged[0].line_number, 1);
        assert_eq!(merged[0].detector, Origin::Ml);
        assert_eq!(
            merged[0].description,
            "ML model detected potential code smell with 87.3% confidence"
        );

        let clean = MlPrediction::unavailable("ML model not loaded");
        assert!(merge_findings(Vec::new(), &clean).is_empty());
    }

    #[test]
    fn test_metrics_without_features() {
        let metrics = calculate_code_metrics("def broken(:", None);
        assert_eq!(metrics, CodeMetrics::default());
    }

    #[test]
    fn test_metrics_ratios_rounded() {
        let source = "# one\n# two\ndef a():\n    pass\n\ndef b():\n    pass\n";
        let features = FeatureExtractor::new().extract(source).unwrap();
        let metrics = calculate_code_metrics(source, Some(&features));
        assert_eq!(metrics.lines, 6);
        assert_eq!(metrics.functions, 2);
        assert_eq!(metrics.avg_method_length, 3.0);
        // 2 / 6 * 100
        assert_eq!(metrics.comment_ratio, 33.3);
        assert_eq!(metrics.max_parameters, Some(0));
        assert_eq!(metrics.max_nesting_depth, Some(0));
    }

    #[test]
    fn test_round1_ties_to_even() {
        assert_eq!(round1(1.25), 1.2);
        assert_eq!(round1(1.75), 1.8);
        assert_eq!(round1(0.15), 0.1);
        assert_eq!(round1(33.333333), 33.3);
        assert_eq!(round1(3.0), 3.0);
    }

    #[test]
    fn test_avg_method_length_tie_rounds_down() {
        let source = "def a(): pass\ndef b(): pass\ndef c(): pass\ndef d(): pass\nx = 1\n";
        let features = FeatureExtractor::new().extract(source).unwrap();
        let metrics = calculate_code_metrics(source, Some(&features));
        assert_eq!(metrics.lines, 5);
        assert_eq!(metrics.functions, 4);
        // 5 / 4 = 1.25
        assert_eq!(metrics.avg_method_length, 1.2);
    }

    #[test]
    fn test_empty_code_rejected() {
        let analyzer = Analyzer::from_config(&ProjectConfig::default(), SmellClassifier::unloaded());
        assert!(matches!(analyzer.analyze("   \n\t"), Err(AnalyzeError::EmptyCode)));
    }

    #[test]
    fn test_analyze_without_model() {
        let analyzer = Analyzer::from_config(&ProjectConfig::default(), SmellClassifier::unloaded());
        let response = analyzer.analyze("x = 42\n").unwrap();
        assert_eq!(response.smells.len(), 1);
        assert_eq!(response.smells[0].smell_type, SmellKind::MagicNumber);
        assert!(!response.ml_prediction.has_smell);
        assert_eq!(response.ml_prediction.confidence, 0.0);
        assert_eq!(response.metrics.lines, 1);
    }
}
