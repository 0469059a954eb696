//! End-to-end analysis tests through the public library API

use codesmell::classifier::{dataset, train, SmellClassifier, TrainConfig};
use codesmell::config::ProjectConfig;
use codesmell::models::{Origin, Severity, SmellKind};
use codesmell::pipeline::{AnalyzeError, Analyzer};

const DEMO: &str = r#"def calculate_total(a, b, c, d, e, f, g, h):
    result = 0
    if a > 0:
        if b > 0:
            if c > 0:
                if d > 0:
                    result = a + b + c + d + e + f + g + h
    return result

class UserManager:
    def __init__(self):
        self.users = []
        
    def create_user(self, name, email, password, age, country, city, zipcode, phone):
        pass
    
    def update_user(self): pass
    def delete_user(self): pass
    def validate_user(self): pass
    def send_email(self): pass
    def log_activity(self): pass
    def calculate_metrics(self): pass
    def generate_report(self): pass
    def export_data(self): pass
    def import_data(self): pass
    def sync_database(self): pass
    def backup_data(self): pass

def process_data(data):
    x = 500
    temp = data * x
    if temp > 500:
        return temp * 2
    else:
        return temp / 2"#;

fn analyzer() -> Analyzer {
    Analyzer::from_config(&ProjectConfig::default(), SmellClassifier::unloaded())
}

fn class_with_methods(n: usize) -> String {
    let mut code = String::from("class Everything:\n");
    for i in 0..n {
        code.push_str(&format!("    def method_{}(self):\n        pass\n", i));
    }
    code
}

#[test]
fn test_demo_findings_in_rank_order() {
    let response = analyzer().analyze(DEMO).unwrap();
    let got: Vec<(SmellKind, Severity, u32)> = response
        .smells
        .iter()
        .map(|f| (f.smell_type, f.severity, f.line_number))
        .collect();

    assert_eq!(
        got,
        vec![
            (SmellKind::TooManyParameters, Severity::High, 1),
            (SmellKind::TooManyParameters, Severity::High, 14),
            (SmellKind::DeepNesting, Severity::High, 7),
            (SmellKind::DeepNesting, Severity::Medium, 6),
            (SmellKind::GodClass, Severity::Medium, 10),
            (SmellKind::MagicNumber, Severity::Low, 30),
            (SmellKind::MagicNumber, Severity::Low, 32),
        ]
    );
    assert!(response.smells.iter().all(|f| f.detector == Origin::RuleBased));
}

#[test]
fn test_demo_metrics() {
    let metrics = analyzer().analyze(DEMO).unwrap().metrics;
    assert_eq!(metrics.classes, 1);
    assert_eq!(metrics.functions, 14);
    assert_eq!(metrics.max_parameters, Some(8));
    assert!(metrics.lines > 0);
    assert!(metrics.complexity >= 1);
}

#[test]
fn test_god_class_severity_thresholds() {
    let analyzer = analyzer();
    let severity_for = |n: usize| {
        analyzer
            .analyze(&class_with_methods(n))
            .unwrap()
            .smells
            .into_iter()
            .find(|f| f.smell_type == SmellKind::GodClass)
            .map(|f| f.severity)
    };
    assert_eq!(severity_for(10), None);
    assert_eq!(severity_for(11), Some(Severity::Medium));
    assert_eq!(severity_for(14), Some(Severity::Medium));
    assert_eq!(severity_for(16), Some(Severity::High));
}

#[test]
fn test_unparsable_code_still_gets_rule_findings() {
    let response = analyzer().analyze("def broken(:\n    x = 42\n").unwrap();
    assert!(response.smells.iter().any(|f| f.smell_type == SmellKind::MagicNumber));
    assert_eq!(response.metrics.classes, 0);
    assert_eq!(response.metrics.max_nesting_depth, None);
    assert!(!response.ml_prediction.has_smell);
}

#[test]
fn test_pathologically_nested_code_is_answered() {
    let code = format!("x = {}1{}\n", "(".repeat(60_000), ")".repeat(60_000));
    let response = analyzer().analyze(&code).unwrap();
    assert_eq!(response.metrics.classes, 0);
    assert_eq!(response.metrics.max_nesting_depth, None);
    assert!(response.ml_prediction.features.is_none());
}

#[test]
fn test_findings_past_ten_thousand_are_kept() {
    let mut code = class_with_methods(16);
    for _ in 0..10_001 {
        code.push_str("x = 42\n");
    }
    let response = analyzer().analyze(&code).unwrap();
    let magic = response
        .smells
        .iter()
        .filter(|f| f.smell_type == SmellKind::MagicNumber)
        .count();
    assert_eq!(magic, 10_001);
    assert!(response
        .smells
        .iter()
        .any(|f| f.smell_type == SmellKind::GodClass && f.severity == Severity::High));
}

#[test]
fn test_blank_code_rejected() {
    assert!(matches!(analyzer().analyze("\n  \n"), Err(AnalyzeError::EmptyCode)));
}

#[test]
fn test_trained_model_flows_into_response() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        model_out: dir.path().join("ml_model.json"),
        scaler_out: dir.path().join("scaler.json"),
        ..TrainConfig::default()
    };
    train(&dataset::generate(7), &config).expect("training succeeds");

    let classifier = SmellClassifier::load(&config.model_out, &config.scaler_out).unwrap();
    let analyzer = Analyzer::from_config(&ProjectConfig::default(), classifier);
    let response = analyzer.analyze(DEMO).unwrap();

    let ml = &response.ml_prediction;
    assert!(ml.error.is_none());
    assert!(ml.features.is_some());
    let ml_findings: Vec<_> = response
        .smells
        .iter()
        .filter(|f| f.detector == Origin::Ml)
        .collect();
    if ml.has_smell {
        assert_eq!(ml_findings.len(), 1);
        assert_eq!(ml_findings[0].smell_type, SmellKind::MlDetected);
        assert_eq!(ml_findings[0].line_number, 1);
    } else {
        assert!(ml_findings.is_empty());
    }
}
