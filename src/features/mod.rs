//! Feature extraction for smell classification
//!
//! Turns Python source into a fixed-shape [`FeatureVector`]. The vector's
//! field order is the classifier's input layout, so [`FEATURE_NAMES`] and
//! [`FeatureVector::values`] must stay in sync with any trained model.

mod scorer;

pub use scorer::{HalsteadScorer, MetricsScorer};

use crate::parsers::{parse_source, ParseError, ParsedSource};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Number of features fed to the classifier
pub const NUM_FEATURES: usize = 11;

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "num_lines",
    "num_functions",
    "num_classes",
    "num_loops",
    "num_ifs",
    "max_params",
    "max_depth",
    "complexity",
    "maintainability",
    "num_comments",
    "avg_line_length",
];

/// Complexity used when the scorer fails
const FALLBACK_COMPLEXITY: u32 = 0;

/// Maintainability used when the scorer fails (treated as fully maintainable)
const FALLBACK_MAINTAINABILITY: f64 = 100.0;

static COMMENT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn comment_pattern() -> &'static Regex {
    COMMENT_PATTERN.get_or_init(|| Regex::new(r"(?m)#.*$").expect("valid comment regex"))
}

/// Structural summary of one source submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub num_lines: usize,
    pub num_functions: usize,
    pub num_classes: usize,
    pub num_loops: usize,
    pub num_ifs: usize,
    pub max_params: usize,
    pub max_depth: usize,
    pub complexity: u32,
    pub maintainability: f64,
    pub num_comments: usize,
    pub avg_line_length: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn values(&self) -> [f64; NUM_FEATURES] {
        [
            self.num_lines as f64,
            self.num_functions as f64,
            self.num_classes as f64,
            self.num_loops as f64,
            self.num_ifs as f64,
            self.max_params as f64,
            self.max_depth as f64,
            self.complexity as f64,
            self.maintainability,
            self.num_comments as f64,
            self.avg_line_length,
        ]
    }
}

/// Number of non-blank lines
pub fn count_code_lines(source: &str) -> usize {
    source.split('\n').filter(|l| !l.trim().is_empty()).count()
}

/// Extracts [`FeatureVector`]s from source text
pub struct FeatureExtractor {
    scorer: Box<dyn MetricsScorer>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::with_scorer(Box::new(HalsteadScorer))
    }

    /// Use a custom complexity/maintainability scorer
    pub fn with_scorer(scorer: Box<dyn MetricsScorer>) -> Self {
        Self { scorer }
    }

    /// Extract features, failing if the source is not valid Python
    pub fn extract(&self, source: &str) -> Result<FeatureVector, ParseError> {
        let parsed = parse_source(source)?;
        Ok(self.extract_parsed(&parsed))
    }

    /// Extract features, returning `None` for unparsable source
    pub fn extract_or_none(&self, source: &str) -> Option<FeatureVector> {
        match self.extract(source) {
            Ok(features) => Some(features),
            Err(e) => {
                debug!("feature extraction skipped: {}", e);
                None
            }
        }
    }

    fn extract_parsed(&self, parsed: &ParsedSource<'_>) -> FeatureVector {
        let source = parsed.source();
        let lines: Vec<&str> = source.split('\n').collect();

        let functions = parsed.functions();
        let max_params = functions
            .iter()
            .map(|f| f.parameters.len())
            .max()
            .unwrap_or(0);

        let complexity = self
            .scorer
            .cyclomatic_complexity(parsed)
            .unwrap_or_else(|e| {
                debug!("complexity scoring failed, using fallback: {}", e);
                FALLBACK_COMPLEXITY
            });
        let maintainability = self
            .scorer
            .maintainability_index(parsed)
            .unwrap_or_else(|e| {
                debug!("maintainability scoring failed, using fallback: {}", e);
                FALLBACK_MAINTAINABILITY
            });

        let total_chars: usize = lines.iter().map(|l| l.chars().count()).sum();
        let avg_line_length = total_chars as f64 / lines.len().max(1) as f64;

        FeatureVector {
            num_lines: count_code_lines(source),
            num_functions: functions.len(),
            num_classes: parsed.count_kinds(&["class_definition"]),
            num_loops: parsed.count_kinds(&["for_statement", "while_statement"]),
            num_ifs: parsed.count_kinds(&["if_statement", "elif_clause"]),
            max_params,
            max_depth: parsed.max_nesting_depth(),
            complexity,
            maintainability,
            num_comments: comment_pattern().find_iter(source).count(),
            avg_line_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    const SAMPLE: &str = r#"# module comment
class Account:
    def __init__(self, owner, balance):
        self.owner = owner  # who
        self.balance = balance

    def withdraw(self, amount):
        if amount > self.balance:
            raise ValueError("insufficient")
        elif amount < 0:
            raise ValueError("negative")
        self.balance -= amount


def total(accounts):
    result = 0
    for account in accounts:
        while account.pending:
            result += account.pending.pop()
    return result
"#;

    #[test]
    fn test_extract_counts() {
        let features = FeatureExtractor::new().extract(SAMPLE).expect("valid python");

        assert_eq!(features.num_lines, 17);
        assert_eq!(features.num_functions, 3);
        assert_eq!(features.num_classes, 1);
        assert_eq!(features.num_loops, 2);
        assert_eq!(features.num_ifs, 2);
        assert_eq!(features.max_params, 2);
        assert_eq!(features.num_comments, 2);
        // for -> while
        assert_eq!(features.max_depth, 2);
        assert!(features.complexity > 0);
        assert!((0.0..=100.0).contains(&features.maintainability));
    }

    #[test]
    fn test_avg_line_length_includes_blank_lines() {
        let features = FeatureExtractor::new().extract("x = 1\n\ny = 22\n").unwrap();
        // "x = 1" (5) + "" (0) + "y = 22" (6) + "" (0) over 4 pieces
        assert!((features.avg_line_length - 11.0 / 4.0).abs() < 1e-9);
        assert_eq!(features.num_lines, 2);
    }

    #[test]
    fn test_unparsable_source_yields_none() {
        let extractor = FeatureExtractor::new();
        assert!(extractor.extract("def broken(:\n").is_err());
        assert!(extractor.extract_or_none("class (:").is_none());
    }

    #[test]
    fn test_values_follow_feature_names() {
        let features = FeatureExtractor::new().extract(SAMPLE).unwrap();
        let values = features.values();
        assert_eq!(values.len(), FEATURE_NAMES.len());
        assert_eq!(values[0], features.num_lines as f64);
        assert_eq!(values[8], features.maintainability);
        assert_eq!(values[10], features.avg_line_length);
    }

    struct FailingScorer;

    impl MetricsScorer for FailingScorer {
        fn cyclomatic_complexity(&self, _parsed: &ParsedSource<'_>) -> anyhow::Result<u32> {
            Err(anyhow!("scorer unavailable"))
        }

        fn maintainability_index(&self, _parsed: &ParsedSource<'_>) -> anyhow::Result<f64> {
            Err(anyhow!("scorer unavailable"))
        }
    }

    #[test]
    fn test_scorer_failure_uses_fallbacks() {
        let extractor = FeatureExtractor::with_scorer(Box::new(FailingScorer));
        let features = extractor.extract(SAMPLE).unwrap();
        assert_eq!(features.complexity, 0);
        assert_eq!(features.maintainability, 100.0);
    }
}
