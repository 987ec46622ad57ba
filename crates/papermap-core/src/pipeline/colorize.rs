use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::Regex;
use rustc_hash::FxBuildHasher;
use serde::Serialize;

use crate::mindmap::{DiagramDocument, DiagramNode, Directive};
use crate::theme::{
    BranchFamily, MonoTier, SEMANTIC_CLASSES, parse_branch_class, semantic_class_for, style_for,
};

use super::lineage::{Lineage, branch_lineages};

/// Branch palettes always defined, even when fewer branches exist.
const MIN_DEFINED_BRANCHES: usize = 3;

type ClassSet = IndexSet<String, FxBuildHasher>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorizeMode {
    /// Classes were assigned and a definitions block appended.
    Assigned,
    /// Existing definitions were re-themed to the monochrome palette.
    Rethemed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorizeReport {
    pub mode: ColorizeMode,
    /// Nodes that received a class in this pass.
    pub classified: usize,
    /// Definition lines appended or rewritten.
    pub definitions: usize,
}

/// Annotates every node with a style class and appends matching `classDef` lines.
///
/// When the document already carries `classDef` lines, assignments are left alone and only
/// the `fill`/`stroke`/`color` values of those definitions are rewritten to a fixed grayscale
/// palette, so running this twice yields the same assignments. Classes in use without a
/// definition get a grayscale one appended.
pub fn colorize_document(doc: &mut DiagramDocument) -> ColorizeReport {
    if doc.has_class_defs() {
        let mut definitions = 0usize;
        let mut defined = ClassSet::default();
        doc.for_each_directive_mut(&mut |directive| {
            if let Directive::ClassDef(line) = directive {
                *line = retheme_class_def(line);
                definitions += 1;
                if let Some(names) = line.split_whitespace().nth(1) {
                    defined.extend(names.split(',').map(str::to_string));
                }
            }
        });

        let missing: Vec<Directive> = used_classes(doc)
            .into_iter()
            .filter(|class| !defined.contains(class))
            .map(|class| Directive::ClassDef(mono_definition(&class)))
            .collect();
        let appended = missing.len();
        doc.trailer.extend(missing);
        tracing::debug!(definitions, appended, "re-themed existing class definitions");
        return ColorizeReport {
            mode: ColorizeMode::Rethemed,
            classified: 0,
            definitions: definitions + appended,
        };
    }

    let mut classified = 0usize;
    let mut next_branch = 0usize;
    for root in &mut doc.nodes {
        classified += assign(root, "root".to_string());
        let lineages = branch_lineages(root, &mut next_branch);
        for (child, lineage) in root.children.iter_mut().zip(lineages) {
            classify_branch(child, lineage, &mut classified);
        }
    }

    let definitions = definition_lines(&used_classes(doc));
    let count = definitions.len();
    doc.trailer
        .extend(definitions.into_iter().map(Directive::ClassDef));
    tracing::debug!(classified, definitions = count, "assigned style classes");

    ColorizeReport {
        mode: ColorizeMode::Assigned,
        classified,
        definitions: count,
    }
}

/// Every class named by a node suffix, in first-use order.
fn used_classes(doc: &DiagramDocument) -> ClassSet {
    let mut used = ClassSet::default();
    doc.walk(&mut |node, _| {
        if let Some(class) = &node.class {
            used.extend(class.split_whitespace().map(str::to_string));
        }
    });
    used
}

fn mono_definition(name: &str) -> String {
    let (fill, stroke, color) = MonoTier::of(name).colors();
    format!("classDef {name} fill:{fill},stroke:{stroke},color:{color}")
}

/// Sets `class` unless the node already has one; returns 1 when it was set.
fn assign(node: &mut DiagramNode, class: String) -> usize {
    if node.has_class() {
        return 0;
    }
    node.class = Some(class);
    1
}

fn classify_branch(node: &mut DiagramNode, lineage: Lineage, classified: &mut usize) {
    match lineage {
        Lineage::Summary => {
            *classified += assign(node, "summary".to_string());
            for child in &mut node.children {
                classify_descendants(child, 2, &|_: usize| "summaryDetail".to_string(), classified);
            }
        }
        Lineage::Branch(n) => {
            let class = semantic_class_for(node.shape.text())
                .map(str::to_string)
                .unwrap_or_else(|| BranchFamily::Branch.class_name(n));
            *classified += assign(node, class);
            let by_level = move |level: usize| {
                let family = match level {
                    2 => BranchFamily::SubBranch,
                    3 => BranchFamily::Detail,
                    _ => BranchFamily::SubDetail,
                };
                family.class_name(n)
            };
            for child in &mut node.children {
                classify_descendants(child, 2, &by_level, classified);
            }
        }
    }
}

fn classify_descendants(
    node: &mut DiagramNode,
    level: usize,
    class_for: &dyn Fn(usize) -> String,
    classified: &mut usize,
) {
    *classified += assign(node, class_for(level));
    for child in &mut node.children {
        classify_descendants(child, level + 1, class_for, classified);
    }
}

/// Builds the definitions block: the fixed core set, per-branch families up to the highest
/// branch in use (at least [`MIN_DEFINED_BRANCHES`]), every content class, then any other
/// class a node references.
fn definition_lines(used: &ClassSet) -> Vec<String> {
    let highest = used
        .iter()
        .filter_map(|c| parse_branch_class(c).map(|(_, n)| n))
        .max()
        .unwrap_or(0)
        .max(MIN_DEFINED_BRANCHES);

    let mut names = ClassSet::default();
    for core in ["root", "summary", "summaryDetail"] {
        names.insert(core.to_string());
    }
    for n in 1..=highest {
        for family in BranchFamily::ALL {
            names.insert(family.class_name(n));
        }
    }
    for (name, _, _) in SEMANTIC_CLASSES {
        names.insert((*name).to_string());
    }
    for class in used {
        names.insert(class.clone());
    }

    names
        .iter()
        .map(|name| style_for(name).definition(name))
        .collect()
}

fn class_def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*classDef\s+)(\S+)(\s+)(.*?)(;?)\s*$").expect("valid regex"))
}

/// Rewrites the color values of one `classDef` line to its grayscale tier.
pub(crate) fn retheme_class_def(line: &str) -> String {
    let Some(caps) = class_def_re().captures(line) else {
        return line.to_string();
    };
    let (prefix, name, gap, props, semi) = (&caps[1], &caps[2], &caps[3], &caps[4], &caps[5]);
    let (fill, stroke, color) = MonoTier::of(name).colors();

    let props = props
        .split(',')
        .map(|prop| {
            let Some((key, _)) = prop.split_once(':') else {
                return prop.to_string();
            };
            match key.trim() {
                "fill" => format!("{key}:{fill}"),
                "stroke" => format!("{key}:{stroke}"),
                "color" => format!("{key}:{color}"),
                _ => prop.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("{prefix}{name}{gap}{props}{semi}")
}
