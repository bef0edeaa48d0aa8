//! Definition extraction — locate a named function or class in module text.

use cs_core::{CodeslimError, Result, SourceText};
use tree_sitter::{Node, Parser};

const DEFINITION_KINDS: &[&str] = &["function_definition", "class_definition"];

/// Return the source of the first function or class named `name`, dedented
/// to column zero. Decorators are not included.
pub fn extract_definition(module: &SourceText, name: &str) -> Result<SourceText> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| CodeslimError::Other(anyhow::anyhow!("failed to load grammar: {e}")))?;
    let tree = parser
        .parse(module.as_str(), None)
        .ok_or_else(|| CodeslimError::Other(anyhow::anyhow!("parser produced no tree")))?;

    let source = module.as_str();
    let node = find_definition(tree.root_node(), source, name)
        .ok_or_else(|| CodeslimError::DefinitionNotFound { name: name.to_string() })?;

    let text = &source[node.start_byte()..node.end_byte()];
    Ok(SourceText::new(dedent_tail(text, node.start_position().column)))
}

fn find_definition<'t>(node: Node<'t>, source: &str, name: &str) -> Option<Node<'t>> {
    if DEFINITION_KINDS.contains(&node.kind()) {
        let matches = node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source.as_bytes()).ok())
            .is_some_and(|n| n == name);
        if matches {
            return Some(node);
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_definition(child, source, name) {
            return Some(found);
        }
    }
    None
}

/// The first line starts at the node, so only later lines carry the
/// enclosing indentation; strip up to `column` leading whitespace from them.
fn dedent_tail(text: &str, column: usize) -> String {
    let mut lines = text.split('\n');
    let mut out = Vec::new();
    if let Some(first) = lines.next() {
        out.push(first.to_string());
    }
    for line in lines {
        let strip = line
            .char_indices()
            .take(column)
            .take_while(|(_, c)| *c == ' ' || *c == '\t')
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        out.push(line[strip..].to_string());
    }
    out.join("\n")
}
