use crate::config::{DetailLevel, ExpansionConfig};
use crate::keywords::KeywordExtractor;
use crate::mindmap::{DiagramDocument, DiagramNode, repair_plain_label};
use crate::theme::BranchFamily;

use super::lineage::{Lineage, branch_lineages};

const KEYWORD_TEMPLATES: &[&str] = &[
    "Key aspects of {kw}",
    "{kw} in context",
    "Implications of {kw}",
    "Evidence on {kw}",
    "Challenges in {kw}",
    "Applications of {kw}",
];

const KEYWORD_SUB_TEMPLATES: &[&str] = &[
    "Example of {kw}",
    "Open questions on {kw}",
    "Measures of {kw}",
];

const GENERIC_DETAILS: &[&str] = &[
    "Supporting evidence",
    "Critical analysis",
    "Limitations",
    "Applications",
    "Key findings",
    "Open questions",
    "Related work",
    "Practical implications",
];

const GENERIC_SUB_DETAILS: &[&str] = &["Example", "Counterpoint", "Follow-up question"];

#[derive(Debug, Clone, Copy)]
struct Plan {
    /// Level (root = 0) of the leaves that get children.
    leaf_level: usize,
    children: usize,
    grandchildren: usize,
}

/// Gives every childless node at rendered depth `max_depth - 1` synthesized children.
///
/// Returns the number of nodes added. `Simple` never adds nodes.
pub fn expand_document(
    doc: &mut DiagramDocument,
    level: DetailLevel,
    max_depth: usize,
    expansion: &ExpansionConfig,
    extractor: &dyn KeywordExtractor,
) -> usize {
    let (children, grandchildren) = expansion.counts_for(level);
    if children == 0 || max_depth < 2 {
        return 0;
    }
    let plan = Plan {
        leaf_level: max_depth - 2,
        children,
        grandchildren,
    };

    let mut added = 0usize;
    let mut next_branch = 0usize;
    for root in &mut doc.nodes {
        let lineages = branch_lineages(root, &mut next_branch);
        if root.children.is_empty() {
            expand_node(root, 0, None, 0, &plan, extractor, &mut added);
            continue;
        }
        for (idx, (child, lineage)) in root.children.iter_mut().zip(lineages).enumerate() {
            expand_node(child, 1, Some(lineage), idx, &plan, extractor, &mut added);
        }
    }

    if added > 0 {
        tracing::debug!(added, %level, max_depth, "synthesized detail nodes");
    }
    added
}

fn expand_node(
    node: &mut DiagramNode,
    level: usize,
    lineage: Option<Lineage>,
    sibling: usize,
    plan: &Plan,
    extractor: &dyn KeywordExtractor,
    added: &mut usize,
) {
    if !node.children.is_empty() {
        for (idx, child) in node.children.iter_mut().enumerate() {
            expand_node(child, level + 1, lineage, idx, plan, extractor, added);
        }
        return;
    }
    if level != plan.leaf_level {
        return;
    }

    let keywords: Vec<String> = extractor
        .extract_keywords(node.shape.text())
        .iter()
        .map(|k| repair_plain_label(k))
        .filter(|k| !k.is_empty())
        .collect();

    let (child_class, grandchild_class) = match lineage {
        Some(Lineage::Branch(n)) => (
            Some(BranchFamily::SubDetail.class_name(n)),
            Some(BranchFamily::SubSubDetail.class_name(n)),
        ),
        Some(Lineage::Summary) => (
            Some("summaryDetail".to_string()),
            Some("summaryDetail".to_string()),
        ),
        // Children of a bare root become first-level branches; the colorizer names them.
        None => (None, None),
    };

    for i in 0..plan.children {
        let label = detail_label(&keywords, sibling, i, plan.children);
        let mut child = DiagramNode::synthetic(label, child_class.clone());
        if i == 0 {
            for j in 0..plan.grandchildren {
                let label = sub_detail_label(&keywords, sibling, j);
                child
                    .children
                    .push(DiagramNode::synthetic(label, grandchild_class.clone()));
            }
        }
        *added += 1 + child.children.len();
        node.children.push(child);
    }
}

fn fill(template: &str, keyword: &str) -> String {
    template.replace("{kw}", keyword)
}

/// Label for the `i`-th synthesized child of the `sibling`-th leaf among its siblings.
fn detail_label(keywords: &[String], sibling: usize, i: usize, per_leaf: usize) -> String {
    if keywords.is_empty() {
        let idx = (sibling * per_leaf + i) % GENERIC_DETAILS.len();
        return GENERIC_DETAILS[idx].to_string();
    }
    let keyword = &keywords[i % keywords.len()];
    let template = KEYWORD_TEMPLATES[(sibling + i) % KEYWORD_TEMPLATES.len()];
    fill(template, keyword)
}

fn sub_detail_label(keywords: &[String], sibling: usize, j: usize) -> String {
    if keywords.is_empty() {
        let idx = (sibling + j) % GENERIC_SUB_DETAILS.len();
        return GENERIC_SUB_DETAILS[idx].to_string();
    }
    let keyword = &keywords[(j + 1) % keywords.len()];
    let template = KEYWORD_SUB_TEMPLATES[(sibling + j) % KEYWORD_SUB_TEMPLATES.len()];
    fill(template, keyword)
}
