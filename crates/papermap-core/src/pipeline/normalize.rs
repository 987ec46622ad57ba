use serde::Serialize;

use crate::mindmap::{DiagramDocument, DiagramNode, MINDMAP_HEADER, NodeShape};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub added_header: bool,
    pub synthesized_root: bool,
    /// A nested root-marked node was lifted to the top with its subtree.
    pub promoted_nested_root: bool,
    /// Root-marked nodes rewritten to plain rounded nodes.
    pub demoted: usize,
    /// Extra top-level nodes moved under the root.
    pub reattached: usize,
}

/// Ensures the document has a `mindmap` header and exactly one root-marked node, which is
/// also its only top-level node.
///
/// The first top-level `((..))` node becomes the root, else the first nested one in
/// pre-order is lifted out with its subtree. Any other top-level node is moved under it
/// (after the root's own children) and every other `((..))` marker is demoted to `(..)`.
/// Only when no root-marked node exists at all is a `root((<default_label>))` created.
pub fn normalize_root_document(doc: &mut DiagramDocument, default_label: &str) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    if doc.header.is_none() {
        doc.header = Some(MINDMAP_HEADER.to_string());
        report.added_header = true;
    }

    let mut tops = std::mem::take(&mut doc.nodes);
    let found = match tops.iter().position(|n| n.shape.is_root_marked()) {
        Some(idx) => Some(tops.remove(idx)),
        None => take_first_root_marked(&mut tops).inspect(|_| report.promoted_nested_root = true),
    };
    let mut root = match found {
        Some(root) => root,
        None => {
            report.synthesized_root = true;
            let mut root = DiagramNode::new(NodeShape::root(default_label));
            root.synthetic = true;
            // Comments that opened the body stay at the top of the tree.
            if let Some(first) = tops.first_mut() {
                root.leading = std::mem::take(&mut first.leading);
            }
            root
        }
    };

    for child in &mut root.children {
        report.demoted += demote_subtree(child);
    }
    report.reattached = tops.len();
    for mut node in tops {
        report.demoted += demote_subtree(&mut node);
        root.children.push(node);
    }

    if report.demoted > 0
        || report.reattached > 0
        || report.synthesized_root
        || report.promoted_nested_root
    {
        tracing::debug!(
            demoted = report.demoted,
            reattached = report.reattached,
            synthesized_root = report.synthesized_root,
            promoted_nested_root = report.promoted_nested_root,
            "normalized diagram root"
        );
    }

    doc.nodes = vec![root];
    report
}

fn demote_subtree(node: &mut DiagramNode) -> usize {
    let mut demoted = 0;
    if node.shape.is_root_marked() {
        node.shape.demote();
        demoted += 1;
    }
    for child in &mut node.children {
        demoted += demote_subtree(child);
    }
    demoted
}

/// Detaches the first root-marked node in pre-order, children included.
fn take_first_root_marked(nodes: &mut Vec<DiagramNode>) -> Option<DiagramNode> {
    for idx in 0..nodes.len() {
        if nodes[idx].shape.is_root_marked() {
            return Some(nodes.remove(idx));
        }
        if let Some(found) = take_first_root_marked(&mut nodes[idx].children) {
            return Some(found);
        }
    }
    None
}
