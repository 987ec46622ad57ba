use std::fmt::Write as _;

use super::model::{DiagramDocument, DiagramNode};

/// Indentation unit: one level per two spaces.
pub const INDENT: &str = "  ";

/// Renders a document back to mindmap text with canonical two-space indentation.
///
/// Nodes are indented one level below the header, so a node at level `l` (root = 0) starts
/// with `2 * (l + 1)` spaces.
pub fn render_mindmap(doc: &DiagramDocument) -> String {
    let mut out = String::new();
    for line in &doc.preamble {
        out.push_str(line);
        out.push('\n');
    }
    if let Some(header) = &doc.header {
        out.push_str(header);
        out.push('\n');
    }
    for node in &doc.nodes {
        render_node(&mut out, node, 0);
    }
    for directive in &doc.trailer {
        out.push_str(directive.text());
        out.push('\n');
    }
    out
}

fn render_node(out: &mut String, node: &DiagramNode, level: usize) {
    let indent = INDENT.repeat(level + 1);
    for directive in &node.leading {
        let _ = writeln!(out, "{indent}{}", directive.text());
    }
    let _ = write!(out, "{indent}{}", node.shape);
    if let Some(class) = node.class.as_deref().filter(|c| !c.is_empty()) {
        let _ = write!(out, ":::{class}");
    }
    out.push('\n');
    if let Some(icon) = &node.icon {
        let _ = writeln!(out, "{indent}{INDENT}::icon({icon})");
    }
    for child in &node.children {
        render_node(out, child, level + 1);
    }
}

impl std::fmt::Display for DiagramDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_mindmap(self))
    }
}
