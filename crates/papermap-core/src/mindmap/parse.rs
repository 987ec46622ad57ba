use serde::Serialize;

use super::model::{DiagramDocument, DiagramNode, Directive, MINDMAP_HEADER};
use super::utils::{
    parse_node_text, split_class_suffix, split_indent, starts_with_case_insensitive,
    strip_inline_comment,
};

/// What the parser had to repair or ignore while reading the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub header_found: bool,
    pub repaired_nodes: usize,
    /// `::icon(..)` / `:::class` lines with no node to attach to.
    pub orphan_decorations: usize,
}

/// Parses mindmap text into a [`DiagramDocument`]. Never fails: malformed node lines are
/// repaired into plain labels and ragged indentation is resolved against the closest
/// shallower node.
pub fn parse_mindmap(text: &str, max_label_width: usize) -> (DiagramDocument, ParseReport) {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = text.split('\n').collect();

    let mut doc = DiagramDocument::default();
    let mut report = ParseReport::default();

    let prelude = scan_prelude(&lines);
    let mut body: Vec<String> = Vec::new();
    match prelude.header {
        Some((idx, tail)) => {
            doc.preamble = collect_verbatim(&lines[..idx]);
            doc.header = Some(MINDMAP_HEADER.to_string());
            report.header_found = true;
            body.extend(tail);
            body.extend(lines[idx + 1..].iter().map(|l| l.to_string()));
        }
        None => {
            doc.preamble = collect_verbatim(&lines[..prelude.front_matter_end]);
            body.extend(
                lines[prelude.front_matter_end..]
                    .iter()
                    .map(|l| l.to_string()),
            );
        }
    }

    let mut builder = TreeBuilder::default();
    for line in &body {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(directive) = Directive::classify(trimmed) {
            builder.pending.push(directive);
            continue;
        }

        if starts_with_case_insensitive(trimmed, "::icon(") {
            let after = &trimmed["::icon(".len()..];
            let icon = after.find(')').map(|end| after[..end].trim().to_string());
            match (builder.last_mut(), icon) {
                (Some(node), Some(icon)) if !icon.is_empty() => node.icon = Some(icon),
                _ => report.orphan_decorations += 1,
            }
            continue;
        }

        if let Some(after) = trimmed.strip_prefix(":::") {
            let class = after.split_whitespace().collect::<Vec<_>>().join(" ");
            match builder.last_mut() {
                Some(node) if !class.is_empty() => node.class = Some(class),
                _ => report.orphan_decorations += 1,
            }
            continue;
        }

        let (indent, rest) = split_indent(line);
        let rest = strip_inline_comment(rest).trim_end();
        if rest.is_empty() {
            continue;
        }
        let (rest, class) = split_class_suffix(rest);
        let (shape, repaired) = parse_node_text(rest, max_label_width);
        if repaired {
            tracing::debug!(line = %rest, label = %shape.descr, "repaired malformed node line");
            report.repaired_nodes += 1;
        }

        let mut node = DiagramNode::new(shape);
        node.class = class;
        builder.push(indent, node);
    }

    let (nodes, trailer) = builder.finish();
    doc.nodes = nodes;
    doc.trailer = trailer;
    (doc, report)
}

struct Prelude {
    /// Index one past a leading `---` front-matter block (0 when there is none).
    front_matter_end: usize,
    /// Header line index plus any node text that followed the keyword on the same line.
    header: Option<(usize, Option<String>)>,
}

fn scan_prelude(lines: &[&str]) -> Prelude {
    let mut idx = 0usize;
    while idx < lines.len() && lines[idx].trim().is_empty() {
        idx += 1;
    }

    let mut front_matter_end = 0usize;
    if lines.get(idx).is_some_and(|l| l.trim() == "---") {
        if let Some(close) = lines[idx + 1..].iter().position(|l| l.trim() == "---") {
            front_matter_end = idx + 1 + close + 1;
            idx = front_matter_end;
        }
    }

    while let Some(line) = lines.get(idx) {
        let trimmed = line.trim();
        if trimmed.is_empty() || Directive::classify(trimmed).is_some() {
            idx += 1;
            continue;
        }
        let header = header_tail(trimmed).map(|tail| (idx, tail));
        return Prelude {
            front_matter_end,
            header,
        };
    }

    Prelude {
        front_matter_end,
        header: None,
    }
}

/// `Some(tail)` when the line is a `mindmap` header; the tail keeps the original spacing so
/// `mindmap root((x))` parses like a node on the next line.
fn header_tail(trimmed: &str) -> Option<Option<String>> {
    if trimmed.eq_ignore_ascii_case(MINDMAP_HEADER) {
        return Some(None);
    }
    if !starts_with_case_insensitive(trimmed, MINDMAP_HEADER) {
        return None;
    }
    let after_keyword = &trimmed[MINDMAP_HEADER.len()..];
    if !after_keyword.starts_with(char::is_whitespace) {
        return None;
    }
    let indent = after_keyword
        .chars()
        .take_while(|c| c.is_whitespace())
        .count();
    let rest = after_keyword.trim_start();
    Some((!rest.is_empty()).then(|| format!("{}{}", " ".repeat(indent), rest)))
}

fn collect_verbatim(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<(usize, DiagramNode)>,
    roots: Vec<DiagramNode>,
    pending: Vec<Directive>,
}

impl TreeBuilder {
    fn push(&mut self, indent: usize, mut node: DiagramNode) {
        node.leading = std::mem::take(&mut self.pending);
        while self.stack.last().is_some_and(|(top, _)| *top >= indent) {
            self.pop_one();
        }
        self.stack.push((indent, node));
    }

    fn pop_one(&mut self) {
        let Some((_, node)) = self.stack.pop() else {
            return;
        };
        match self.stack.last_mut() {
            Some((_, parent)) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn last_mut(&mut self) -> Option<&mut DiagramNode> {
        self.stack.last_mut().map(|(_, n)| n)
    }

    fn finish(mut self) -> (Vec<DiagramNode>, Vec<Directive>) {
        while !self.stack.is_empty() {
            self.pop_one();
        }
        (self.roots, self.pending)
    }
}
