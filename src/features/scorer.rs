//! Complexity and maintainability scoring
//!
//! [`MetricsScorer`] is the seam for the two "black box" metrics in the
//! feature vector. [`HalsteadScorer`] is the built-in implementation:
//!
//! - cyclomatic complexity: sum over every function block (methods and nested
//!   functions included) plus one block per class, where a class scores the
//!   mean complexity of its methods plus one when it has more than one method
//! - maintainability index: the classic formula
//!   `171 - 5.2 ln(V) - 0.23 G - 16.2 ln(SLOC) + 50 sin(sqrt(2.46 C))`,
//!   rescaled to 0..100, with `C` the comment percentage in radians

use crate::parsers::python::walk;
use crate::parsers::ParsedSource;
use anyhow::{bail, Result};
use std::collections::HashSet;
use tree_sitter::Node;

/// Pluggable scorer for complexity and maintainability
pub trait MetricsScorer: Send + Sync {
    /// Total cyclomatic complexity of the program
    fn cyclomatic_complexity(&self, parsed: &ParsedSource<'_>) -> Result<u32>;

    /// Maintainability index in 0..=100 (higher is better)
    fn maintainability_index(&self, parsed: &ParsedSource<'_>) -> Result<f64>;
}

/// Default scorer built on the tree-sitter syntax tree
#[derive(Debug, Clone, Copy, Default)]
pub struct HalsteadScorer;

impl MetricsScorer for HalsteadScorer {
    fn cyclomatic_complexity(&self, parsed: &ParsedSource<'_>) -> Result<u32> {
        let function_total: u32 = parsed.functions().iter().map(|f| f.complexity).sum();
        let class_total: u32 = parsed
            .classes()
            .iter()
            .map(|c| class_block_complexity(&c.method_complexities))
            .sum();
        Ok(function_total + class_total)
    }

    fn maintainability_index(&self, parsed: &ParsedSource<'_>) -> Result<f64> {
        let volume = halstead_counts(parsed).volume();
        let complexity = self.cyclomatic_complexity(parsed)? + parsed.module_complexity();
        let raw = RawLineCounts::from_parsed(parsed);

        if volume <= 0.0 || raw.sloc == 0 {
            return Ok(100.0);
        }

        let comment_percent = (raw.comments + raw.multi) as f64 * 100.0 / raw.sloc as f64;
        let non_normalized = 171.0
            - 5.2 * volume.ln()
            - 0.23 * complexity as f64
            - 16.2 * (raw.sloc as f64).ln()
            + 50.0 * (2.46 * comment_percent.to_radians()).sqrt().sin();
        let mi = (non_normalized * 100.0 / 171.0).clamp(0.0, 100.0);

        if !mi.is_finite() {
            bail!("maintainability index is not finite (volume={volume}, sloc={})", raw.sloc);
        }
        Ok(mi)
    }
}

fn class_block_complexity(method_complexities: &[u32]) -> u32 {
    if method_complexities.is_empty() {
        return 1;
    }
    let sum: u32 = method_complexities.iter().sum();
    let n = method_complexities.len() as u32;
    sum / n + u32::from(n > 1)
}

/// Operator and operand tallies for Halstead metrics
#[derive(Debug, Default)]
struct HalsteadCounts {
    distinct_operators: HashSet<String>,
    distinct_operands: HashSet<String>,
    total_operators: usize,
    total_operands: usize,
}

impl HalsteadCounts {
    fn operator(&mut self, op: &str) {
        self.distinct_operators.insert(op.to_string());
        self.total_operators += 1;
    }

    fn operand(&mut self, operand: &str) {
        self.distinct_operands.insert(operand.to_string());
        self.total_operands += 1;
    }

    /// Program volume `N * log2(n)`
    fn volume(&self) -> f64 {
        let vocabulary = self.distinct_operators.len() + self.distinct_operands.len();
        if vocabulary == 0 {
            return 0.0;
        }
        let length = self.total_operators + self.total_operands;
        length as f64 * (vocabulary as f64).log2()
    }
}

/// Count operators and operands in arithmetic, boolean, comparison and
/// augmented-assignment expressions
fn halstead_counts(parsed: &ParsedSource<'_>) -> HalsteadCounts {
    let mut counts = HalsteadCounts::default();
    walk(parsed.root(), &mut |node: Node| match node.kind() {
        "binary_operator" | "boolean_operator" | "augmented_assignment" => {
            if let Some(op) = node.child_by_field_name("operator") {
                counts.operator(parsed.text(op));
            }
            for field in ["left", "right"] {
                if let Some(operand) = node.child_by_field_name(field) {
                    counts.operand(parsed.text(operand));
                }
            }
        }
        "unary_operator" | "not_operator" => {
            let op = node
                .child_by_field_name("operator")
                .map(|op| parsed.text(op))
                .unwrap_or("not");
            counts.operator(op);
            if let Some(arg) = node.child_by_field_name("argument") {
                counts.operand(parsed.text(arg));
            }
        }
        "comparison_operator" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.is_named() {
                    counts.operand(parsed.text(child));
                } else {
                    counts.operator(parsed.text(child));
                }
            }
        }
        _ => {}
    });
    counts
}

/// Raw line classification used by the maintainability index
#[derive(Debug, Default, PartialEq)]
struct RawLineCounts {
    /// Lines holding code (not blank, not comment-only, not docstring)
    sloc: usize,
    /// Comment-only lines
    comments: usize,
    /// Lines inside standalone string statements (docstrings)
    multi: usize,
}

impl RawLineCounts {
    fn from_parsed(parsed: &ParsedSource<'_>) -> Self {
        let mut docstring_lines: HashSet<usize> = HashSet::new();
        walk(parsed.root(), &mut |node: Node| {
            if node.kind() == "expression_statement"
                && node.named_child_count() == 1
                && node
                    .named_children(&mut node.walk())
                    .all(|c| c.kind() == "string")
            {
                for row in node.start_position().row..=node.end_position().row {
                    docstring_lines.insert(row);
                }
            }
        });

        let mut counts = Self::default();
        for (row, line) in parsed.source().split('\n').enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if docstring_lines.contains(&row) {
                counts.multi += 1;
            } else if trimmed.starts_with('#') {
                counts.comments += 1;
            } else {
                counts.sloc += 1;
            }
        }
        counts
    }
}
