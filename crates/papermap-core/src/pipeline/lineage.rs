use crate::mindmap::DiagramNode;
use crate::theme::is_summary_label;

/// Which first-level branch a node descends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lineage {
    Summary,
    /// 1-based branch number.
    Branch(usize),
}

/// Assigns a lineage to each child of `root`.
///
/// The first child, and any child labelled like a summary, is the summary branch. Every other
/// child takes the next branch number from `next`, which is shared across roots so numbering
/// stays unique in a forest.
pub(crate) fn branch_lineages(root: &DiagramNode, next: &mut usize) -> Vec<Lineage> {
    root.children
        .iter()
        .enumerate()
        .map(|(idx, child)| {
            if idx == 0 || is_summary_label(child.shape.text()) {
                Lineage::Summary
            } else {
                *next += 1;
                Lineage::Branch(*next)
            }
        })
        .collect()
}
