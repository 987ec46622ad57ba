use crate::mindmap::{DiagramDocument, DiagramNode, Directive};

/// Removes every node whose rendered depth (root = 1) exceeds `max_depth`, together with its
/// subtree. Returns the number of removed nodes.
///
/// Directive lines attached to removed nodes are kept: they move to the next surviving node,
/// or to the trailer, so their relative order is unchanged.
pub fn filter_document_by_depth(doc: &mut DiagramDocument, max_depth: usize) -> usize {
    let mut carry = Vec::new();
    let mut pruned = 0usize;
    prune_level(&mut doc.nodes, 0, max_depth, &mut carry, &mut pruned);
    if !carry.is_empty() {
        carry.append(&mut doc.trailer);
        doc.trailer = carry;
    }
    if pruned > 0 {
        tracing::debug!(pruned, max_depth, "pruned nodes beyond depth limit");
    }
    pruned
}

fn prune_level(
    nodes: &mut Vec<DiagramNode>,
    level: usize,
    max_depth: usize,
    carry: &mut Vec<Directive>,
    pruned: &mut usize,
) {
    for mut node in std::mem::take(nodes) {
        if level < max_depth {
            if !carry.is_empty() {
                let mut leading = std::mem::take(carry);
                leading.append(&mut node.leading);
                node.leading = leading;
            }
            prune_level(&mut node.children, level + 1, max_depth, carry, pruned);
            nodes.push(node);
        } else {
            *pruned += node.subtree_len();
            collect_directives(node, carry);
        }
    }
}

fn collect_directives(node: DiagramNode, out: &mut Vec<Directive>) {
    out.extend(node.leading);
    for child in node.children {
        collect_directives(child, out);
    }
}
