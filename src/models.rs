//! Core data models for codesmell
//!
//! These models are shared by the detectors, the classifier adapter and the
//! aggregator, and are serialized as-is into the `/analyze` response.

use serde::{Deserialize, Serialize};

/// Severity levels for findings
///
/// Variant order is the ranking order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort rank used by the aggregator (high=0, medium=1, low=2)
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// Smell categories a finding can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmellKind {
    #[serde(rename = "Long Method")]
    LongMethod,
    #[serde(rename = "Too Many Parameters")]
    TooManyParameters,
    #[serde(rename = "Deep Nesting")]
    DeepNesting,
    #[serde(rename = "God Class")]
    GodClass,
    #[serde(rename = "Magic Number")]
    MagicNumber,
    #[serde(rename = "ML Detected Smell")]
    MlDetected,
}

impl SmellKind {
    pub fn label(self) -> &'static str {
        match self {
            SmellKind::LongMethod => "Long Method",
            SmellKind::TooManyParameters => "Too Many Parameters",
            SmellKind::DeepNesting => "Deep Nesting",
            SmellKind::GodClass => "God Class",
            SmellKind::MagicNumber => "Magic Number",
            SmellKind::MlDetected => "ML Detected Smell",
        }
    }

    /// Fixed remediation text for the category
    pub fn suggestion(self) -> &'static str {
        match self {
            SmellKind::LongMethod => {
                "Break this method into smaller, focused functions. Each function should do one thing well."
            }
            SmellKind::TooManyParameters => {
                "Consider grouping related parameters into a configuration object or dataclass."
            }
            SmellKind::DeepNesting => {
                "Use early returns, extract methods, or use guard clauses to reduce nesting."
            }
            SmellKind::GodClass => {
                "Apply Single Responsibility Principle. Split this class into smaller, focused classes."
            }
            SmellKind::MagicNumber => "Replace with a named constant to explain its purpose.",
            SmellKind::MlDetected => {
                "Review the code structure and consider refactoring based on rule-based suggestions"
            }
        }
    }
}

impl std::fmt::Display for SmellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which pipeline produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "rule-based")]
    RuleBased,
    #[serde(rename = "ml")]
    Ml,
}

/// A code smell finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub smell_type: SmellKind,
    pub severity: Severity,
    /// 1-based source line
    pub line_number: u32,
    pub description: String,
    pub suggestion: String,
    pub detector: Origin,
}

impl Finding {
    /// Build a rule-based finding with the category's standard suggestion
    pub fn rule(kind: SmellKind, severity: Severity, line_number: u32, description: String) -> Self {
        Self {
            smell_type: kind,
            severity,
            line_number,
            description,
            suggestion: kind.suggestion().to_string(),
            detector: Origin::RuleBased,
        }
    }
}

/// Summary metrics attached to every analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeMetrics {
    pub lines: usize,
    pub functions: usize,
    pub classes: usize,
    pub complexity: u32,
    pub avg_method_length: f64,
    pub comment_ratio: f64,
    /// Absent when the source could not be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nesting_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parameters: Option<usize>,
}

/// Count of findings per severity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(Severity::Medium.to_string(), "medium");
        assert!(Severity::High < Severity::Medium && Severity::Medium < Severity::Low);
    }

    #[test]
    fn test_finding_json_shape() {
        let f = Finding::rule(SmellKind::GodClass, Severity::High, 3, "big".into());
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v["smell_type"], "God Class");
        assert_eq!(v["detector"], "rule-based");
        assert_eq!(v["line_number"], 3);
        assert!(v["suggestion"].as_str().unwrap().contains("Single Responsibility"));
    }

    #[test]
    fn test_metrics_omit_missing_depth() {
        let v = serde_json::to_value(CodeMetrics::default()).unwrap();
        assert!(v.get("max_nesting_depth").is_none());
        assert!(v.get("max_parameters").is_none());
        assert_eq!(v["lines"], 0);
    }

    #[test]
    fn test_findings_summary() {
        let findings = vec![
            Finding::rule(SmellKind::MagicNumber, Severity::Low, 1, String::new()),
            Finding::rule(SmellKind::DeepNesting, Severity::High, 2, String::new()),
        ];
        let summary = FindingsSummary::from_findings(&findings);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.low, 1);
    }
}
