//! Python parser using tree-sitter
//!
//! Extracts functions, classes and structural counts from Python source code.
//! A tree that contains any error or missing node is treated as a parse
//! failure, so callers only ever see syntactically valid programs.

use super::ParseError;
use tree_sitter::{Node, Parser, Tree};

/// Parameter names treated as an implicit receiver when they come first
const RECEIVER_PARAMS: &[&str] = &["self", "cls"];

/// A successfully parsed Python program
pub struct ParsedSource<'a> {
    source: &'a str,
    tree: Tree,
}

/// A function definition found anywhere in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    pub line_start: u32,
    /// Positional parameters, receiver and `*args`/`**kwargs`/keyword-only excluded
    pub parameters: Vec<String>,
    /// Cyclomatic complexity of this function's own body
    pub complexity: u32,
}

/// A class definition found anywhere in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    /// Line of the `class` keyword (decorators are not included)
    pub line_start: u32,
    /// Names of functions defined directly in the class body
    pub methods: Vec<String>,
    /// Complexity of each direct method, same order as `methods`
    pub method_complexities: Vec<u32>,
}

/// Deepest syntax tree accepted. CPython refuses far shallower nesting
/// (200 open brackets), so real programs stay well below this.
pub const MAX_TREE_DEPTH: usize = 1_000;

/// Parse Python source code
pub fn parse_source(source: &str) -> Result<ParsedSource<'_>, ParseError> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE;
    parser.set_language(&language.into())?;

    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;

    let root = tree.root_node();
    if exceeds_depth(root, MAX_TREE_DEPTH) {
        return Err(ParseError::TooDeep {
            limit: MAX_TREE_DEPTH,
        });
    }
    if root.has_error() {
        let (line, column) = first_error_position(root).unwrap_or((1, 1));
        return Err(ParseError::Syntax { line, column });
    }

    Ok(ParsedSource { source, tree })
}

/// Whether any node sits more than `limit` levels below `root`
fn exceeds_depth(root: Node, limit: usize) -> bool {
    let mut cursor = root.walk();
    let mut depth = 0;
    loop {
        if cursor.goto_first_child() {
            depth += 1;
            if depth > limit {
                return true;
            }
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return false;
            }
            depth -= 1;
        }
    }
}

/// 1-based position of the first ERROR or MISSING node
fn first_error_position(root: Node) -> Option<(usize, usize)> {
    let mut found = None;
    walk(root, &mut |node| {
        if found.is_none() && (node.is_error() || node.is_missing()) {
            let pos = node.start_position();
            found = Some((pos.row + 1, pos.column + 1));
        }
    });
    found
}

/// Pre-order visit of every node under (and including) `node`
///
/// Iterates with a cursor so tree depth never turns into stack depth.
pub(crate) fn walk<'t>(node: Node<'t>, visit: &mut impl FnMut(Node<'t>)) {
    let mut cursor = node.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

impl<'a> ParsedSource<'a> {
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub(crate) fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Count nodes whose kind is in `kinds`
    pub fn count_kinds(&self, kinds: &[&str]) -> usize {
        let mut count = 0;
        walk(self.root(), &mut |n| {
            if kinds.contains(&n.kind()) {
                count += 1;
            }
        });
        count
    }

    /// Every function definition, including methods and nested functions
    pub fn functions(&self) -> Vec<FunctionInfo> {
        let mut nodes = Vec::new();
        walk(self.root(), &mut |n| {
            if n.kind() == "function_definition" {
                nodes.push(n);
            }
        });
        nodes
            .into_iter()
            .filter_map(|n| self.parse_function_node(n))
            .collect()
    }

    /// Every class definition, including nested classes
    pub fn classes(&self) -> Vec<ClassInfo> {
        let mut nodes = Vec::new();
        walk(self.root(), &mut |n| {
            if n.kind() == "class_definition" {
                nodes.push(n);
            }
        });
        nodes
            .into_iter()
            .filter_map(|n| self.parse_class_node(n))
            .collect()
    }

    /// Maximum nesting depth of `for`/`while`/`if`/`with` constructs
    pub fn max_nesting_depth(&self) -> usize {
        nesting_depth(self.root())
    }

    /// Decision points outside any function or class body
    pub fn module_complexity(&self) -> u32 {
        count_decisions(self.root())
    }

    fn parse_function_node(&self, node: Node) -> Option<FunctionInfo> {
        let name_node = node.child_by_field_name("name")?;
        let name = self.text(name_node).to_string();

        let parameters = self.extract_parameters(node.child_by_field_name("parameters"));

        Some(FunctionInfo {
            name,
            line_start: node.start_position().row as u32 + 1,
            parameters,
            complexity: function_complexity(node),
        })
    }

    /// Extract positional parameter names from a parameters node
    fn extract_parameters(&self, params_node: Option<Node>) -> Vec<String> {
        let Some(node) = params_node else {
            return vec![];
        };

        let mut params = Vec::new();
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "identifier" => params.push(self.text(child).to_string()),
                "default_parameter" | "typed_default_parameter" => {
                    if let Some(name_node) = child.child_by_field_name("name") {
                        params.push(self.text(name_node).to_string());
                    }
                }
                "typed_parameter" => {
                    // `x: int` names an identifier, `*args: int` a splat
                    match child.named_children(&mut child.walk()).next() {
                        Some(first) if first.kind() == "identifier" => {
                            params.push(self.text(first).to_string());
                        }
                        _ => break,
                    }
                }
                // Everything after `*` or `*args` is keyword-only
                "list_splat_pattern" | "keyword_separator" => break,
                _ => {}
            }
        }

        if params
            .first()
            .is_some_and(|p| RECEIVER_PARAMS.contains(&p.as_str()))
        {
            params.remove(0);
        }

        params
    }

    fn parse_class_node(&self, node: Node) -> Option<ClassInfo> {
        let name_node = node.child_by_field_name("name")?;
        let name = self.text(name_node).to_string();

        let mut methods = Vec::new();
        let mut method_complexities = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for child in body.children(&mut body.walk()) {
                let func = match child.kind() {
                    "function_definition" => Some(child),
                    "decorated_definition" => child
                        .child_by_field_name("definition")
                        .filter(|d| d.kind() == "function_definition"),
                    _ => None,
                };
                if let Some(func) = func {
                    if let Some(method_name) = func.child_by_field_name("name") {
                        methods.push(self.text(method_name).to_string());
                        method_complexities.push(function_complexity(func));
                    }
                }
            }
        }

        Some(ClassInfo {
            name,
            line_start: node.start_position().row as u32 + 1,
            methods,
            method_complexities,
        })
    }
}

fn nesting_depth(root: Node) -> usize {
    let mut max_depth = 0;
    let mut stack = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        max_depth = max_depth.max(depth);
        let mut cursor = node.walk();
        if node.kind() == "if_statement" {
            // Each `elif` is an `if` nested in the previous branch's `else`
            let mut level = depth;
            for child in node.children(&mut cursor) {
                match child.kind() {
                    "elif_clause" => {
                        level += 1;
                        stack.push((child, level));
                    }
                    "else_clause" => stack.push((child, level)),
                    _ => stack.push((child, depth)),
                }
            }
            continue;
        }
        for child in node.children(&mut cursor) {
            let child_depth = match child.kind() {
                "if_statement" | "for_statement" | "while_statement" | "with_statement" => {
                    depth + 1
                }
                _ => depth,
            };
            stack.push((child, child_depth));
        }
    }
    max_depth
}

/// Calculate cyclomatic complexity of a function (nested definitions excluded)
fn function_complexity(node: Node) -> u32 {
    let base = 1;
    base + node.child_by_field_name("body").map_or(0, count_decisions)
}

/// Decision points below `node`, skipping nested function and class bodies
fn count_decisions(node: Node) -> u32 {
    let mut decisions = 0;
    let mut cursor = node.walk();
    let mut stack: Vec<Node> = node.children(&mut cursor).collect();
    while let Some(child) = stack.pop() {
        match child.kind() {
            // Scored as their own blocks
            "function_definition" | "class_definition" | "lambda" => continue,
            "if_statement" | "elif_clause" | "conditional_expression" => {
                decisions += 1;
            }
            // A loop counts once, plus one for an `else` branch
            "for_statement" | "while_statement" => {
                decisions += 1;
                if child.child_by_field_name("alternative").is_some() {
                    decisions += 1;
                }
            }
            // Each handler and the `else` branch of a try
            "except_clause" | "except_group_clause" => {
                decisions += 1;
            }
            "try_statement" => {
                if child
                    .children(&mut child.walk())
                    .any(|c| c.kind() == "else_clause")
                {
                    decisions += 1;
                }
            }
            // `a and b or c` parses as two binary nodes, one per extra operand
            "boolean_operator" => {
                decisions += 1;
            }
            "for_in_clause" | "if_clause" | "case_clause" => {
                decisions += 1;
            }
            _ => {}
        }
        stack.extend(child.children(&mut child.walk()));
    }
    decisions
}
