//! Text (terminal) reporter with colors

use crate::models::{FindingsSummary, Severity};
use crate::pipeline::AnalysisResponse;
use anyhow::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "\x1b[91m",
        Severity::Medium => "\x1b[33m",
        Severity::Low => "\x1b[34m",
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "[H]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
    }
}

/// Render an analysis as formatted terminal output
pub fn render(response: &AnalysisResponse) -> Result<String> {
    let mut out = String::new();
    let m = &response.metrics;

    out.push_str(&format!("\n{BOLD}Code Smell Analysis{RESET}\n"));
    out.push_str(&format!("{DIM}──────────────────────────────────────{RESET}\n"));
    out.push_str(&format!(
        "Lines: {}  Functions: {}  Classes: {}  Complexity: {}\n",
        m.lines, m.functions, m.classes, m.complexity
    ));
    out.push_str(&format!(
        "Avg method length: {:.1}  Comment ratio: {:.1}%",
        m.avg_method_length, m.comment_ratio
    ));
    if let (Some(depth), Some(params)) = (m.max_nesting_depth, m.max_parameters) {
        out.push_str(&format!("  Max nesting: {}  Max params: {}", depth, params));
    }
    out.push_str("\n\n");

    let fs = FindingsSummary::from_findings(&response.smells);
    out.push_str(&format!("{BOLD}FINDINGS{RESET} ({} total)\n", fs.total));
    let counts: Vec<String> = [
        (Severity::High, fs.high),
        (Severity::Medium, fs.medium),
        (Severity::Low, fs.low),
    ]
    .into_iter()
    .filter(|(_, n)| *n > 0)
    .map(|(sev, n)| format!("{}{} {}{RESET}", severity_color(sev), n, sev))
    .collect();
    if !counts.is_empty() {
        out.push_str(&format!("  {}\n", counts.join(" | ")));
    }
    out.push('\n');

    for finding in &response.smells {
        out.push_str(&format!(
            "  {}{}{RESET} {DIM}line {:>4}{RESET}  {BOLD}{}{RESET}\n",
            severity_color(finding.severity),
            severity_tag(finding.severity),
            finding.line_number,
            finding.smell_type
        ));
        out.push_str(&format!("      {}\n", finding.description));
        out.push_str(&format!("      {DIM}{}{RESET}\n", finding.suggestion));
    }
    if !response.smells.is_empty() {
        out.push('\n');
    }

    let ml = &response.ml_prediction;
    match &ml.error {
        Some(reason) => out.push_str(&format!("{DIM}ML prediction unavailable: {}{RESET}\n", reason)),
        None => out.push_str(&format!(
            "ML prediction: {} ({:.1}% confidence)\n",
            if ml.has_smell { "smelly" } else { "clean" },
            ml.confidence * 100.0
        )),
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_response;

    #[test]
    fn test_text_render_lists_findings() {
        let out = render(&test_response()).unwrap();
        assert!(out.contains("Code Smell Analysis"));
        assert!(out.contains("2 total"));
        assert!(out.contains("[H]"));
        assert!(out.contains("Magic Number"));
        assert!(out.contains("Max nesting: 1"));
        assert!(out.contains("ML prediction unavailable: ML model not loaded"));
    }
}
