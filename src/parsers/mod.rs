//! Source code parsing using tree-sitter
//!
//! Only Python is supported. Every consumer (feature extraction, the god
//! class detector, metrics scoring) works on a [`python::ParsedSource`].

pub mod python;

use thiserror::Error;

pub use python::{parse_source, ClassInfo, FunctionInfo, ParsedSource};

/// Errors raised while turning source text into a syntax tree
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to load Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("parser returned no syntax tree")]
    NoTree,

    #[error("invalid syntax at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    #[error("syntax tree nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Get the language name for a request's `language` field
pub fn language_for_name(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "python" | "py" | "python3" => Some("Python"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_for_name() {
        assert_eq!(language_for_name("python"), Some("Python"));
        assert_eq!(language_for_name("PY"), Some("Python"));
        assert_eq!(language_for_name("rust"), None);
    }
}
