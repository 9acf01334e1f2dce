//! Source regeneration for full-detail nodes
//!
//! The printer works from the syntax tree rather than raw bytes: it refuses
//! subtrees that error recovery touched, and re-indents the rest so a nested
//! method reads as if it were written at column zero. When the printer
//! declines, callers fall back to the verbatim slice.

use tree_sitter::Node;

use super::languages::node_text;

/// Capability: render a declaration's syntax node back to text
pub trait SourcePrinter {
    /// `None` means regeneration is unavailable for this node
    fn print(&self, node: Node<'_>, source: &str) -> Option<String>;
}

/// Printer that normalises indentation and line endings
#[derive(Debug, Clone, Default)]
pub struct ReindentPrinter;

impl SourcePrinter for ReindentPrinter {
    fn print(&self, node: Node<'_>, source: &str) -> Option<String> {
        if node.has_error() || node.is_missing() {
            return None;
        }

        let text = node_text(node, source);
        if text.is_empty() {
            return None;
        }

        let base_indent = leading_indent(source, node.start_byte());
        let literals = multiline_literals(node, source);
        let inside = |offset: usize| literals.iter().any(|(start, end)| *start < offset && offset < *end);

        let mut lines = Vec::new();
        let mut line_start = node.start_byte();

        for (i, raw) in text.split('\n').enumerate() {
            let line_end = line_start + raw.len();
            let mut line = raw.strip_suffix('\r').unwrap_or(raw);
            if !inside(line_end) {
                line = line.trim_end();
            }
            if i > 0 && !inside(line_start) {
                line = strip_indent(line, &base_indent);
            }
            lines.push(line);
            line_start = line_end + 1;
        }

        Some(lines.join("\n"))
    }
}

/// Byte ranges of literal and comment nodes that span more than one line
fn multiline_literals(node: Node<'_>, source: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        match current.kind() {
            "template_string" | "string" | "comment" => {
                if node_text(current, source).contains('\n') {
                    ranges.push((current.start_byte(), current.end_byte()));
                }
            }
            _ => {
                let mut cursor = current.walk();
                stack.extend(current.children(&mut cursor));
            }
        }
    }
    ranges
}

/// Whitespace that starts the line containing `offset`
fn leading_indent(source: &str, offset: usize) -> String {
    let line_start = source
        .get(..offset)
        .and_then(|before| before.rfind('\n').map(|i| i + 1))
        .unwrap_or(0);

    source
        .get(line_start..)
        .unwrap_or("")
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

fn strip_indent<'a>(line: &'a str, indent: &str) -> &'a str {
    if let Some(rest) = line.strip_prefix(indent) {
        return rest;
    }
    // shallower than the first line: drop whatever whitespace it has
    line.trim_start_matches([' ', '\t'])
}
