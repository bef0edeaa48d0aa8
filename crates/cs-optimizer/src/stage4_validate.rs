//! Stage 4: syntax validation.
//!
//! Validators never fail: every problem, including a grammar that cannot be
//! loaded, comes back as [`ValidationResult::Invalid`].

use cs_core::{SourceText, SyntaxDiagnostic, ValidationResult};
use tree_sitter::{Node, Parser};

/// Trait for syntax validators.
pub trait SyntaxValidator: Send + Sync {
    /// Parse `text` and report whether it is syntactically valid.
    fn validate(&self, text: &SourceText) -> ValidationResult;

    /// Name of the grammar checked against.
    fn language(&self) -> &'static str;
}

/// Python validator backed by the tree-sitter Python grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonValidator;

impl PythonValidator {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxValidator for PythonValidator {
    fn validate(&self, text: &SourceText) -> ValidationResult {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
            return ValidationResult::invalid(SyntaxDiagnostic::new(format!(
                "failed to load grammar: {e}"
            )));
        }
        let Some(tree) = parser.parse(text.as_str(), None) else {
            return ValidationResult::invalid(SyntaxDiagnostic::new("parser produced no tree"));
        };

        let root = tree.root_node();
        if root.has_error() {
            let diagnostic = match first_error(root) {
                Some(node) => describe(node, text.as_str()),
                None => SyntaxDiagnostic::new("invalid syntax"),
            };
            return ValidationResult::invalid(diagnostic);
        }
        match first_rejected(root) {
            Some(diagnostic) => ValidationResult::invalid(diagnostic),
            None => ValidationResult::Valid,
        }
    }

    fn language(&self) -> &'static str {
        "python"
    }
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

/// The grammar still accepts some constructs the Python 3 parser rejects:
/// Python 2 `print`/`exec` statements and tuple parameters, and a parameter
/// without a default after one with a default (outside the keyword-only
/// section).
fn first_rejected(node: Node<'_>) -> Option<SyntaxDiagnostic> {
    match node.kind() {
        "print_statement" => return Some(at_node(node, "missing parentheses in call to 'print'")),
        "exec_statement" => return Some(at_node(node, "missing parentheses in call to 'exec'")),
        "parameters" | "lambda_parameters" => {
            if let Some(diagnostic) = check_parameter_order(node) {
                return Some(diagnostic);
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = first_rejected(child) {
            return Some(found);
        }
    }
    None
}

fn check_parameter_order(params: Node<'_>) -> Option<SyntaxDiagnostic> {
    let mut seen_default = false;
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "default_parameter" | "typed_default_parameter" => seen_default = true,
            "identifier" | "typed_parameter" if is_splat(param) => break,
            "identifier" | "typed_parameter" if seen_default => {
                return Some(at_node(
                    param,
                    "parameter without a default follows parameter with a default",
                ));
            }
            "tuple_pattern" => {
                return Some(at_node(param, "tuple parameters are not supported"));
            }
            // `*` and `*args` start the keyword-only section, `**kwargs` ends the list
            "keyword_separator" | "list_splat_pattern" | "dictionary_splat_pattern" => break,
            _ => {}
        }
    }
    None
}

/// `*args: T` / `**kw: T` parse as a typed parameter wrapping a splat.
fn is_splat(param: Node<'_>) -> bool {
    param.kind() == "typed_parameter"
        && param.named_child(0).is_some_and(|c| {
            matches!(c.kind(), "list_splat_pattern" | "dictionary_splat_pattern")
        })
}

fn at_node(node: Node<'_>, message: &str) -> SyntaxDiagnostic {
    let pos = node.start_position();
    SyntaxDiagnostic::new(message).at(pos.row + 1, pos.column + 1)
}

fn describe(node: Node<'_>, source: &str) -> SyntaxDiagnostic {
    let pos = node.start_position();
    let message = if node.is_missing() {
        format!("missing \"{}\"", node.kind())
    } else {
        let snippet: String = node
            .utf8_text(source.as_bytes())
            .unwrap_or("")
            .chars()
            .take(24)
            .collect();
        if snippet.trim().is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near \"{}\"", snippet.trim())
        }
    };
    SyntaxDiagnostic::new(message).at(pos.row + 1, pos.column + 1)
}
