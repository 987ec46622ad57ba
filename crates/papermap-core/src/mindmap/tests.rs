use super::*;
use serde_json::Value;

fn parse(text: &str) -> (DiagramDocument, ParseReport) {
    parse_mindmap(text, 80)
}

fn labels(node: &DiagramNode) -> Vec<&str> {
    node.children.iter().map(|c| c.shape.text()).collect()
}

#[test]
fn mindmap_simple_hierarchy() {
    let (doc, report) = parse("mindmap\n  root((Paper))\n    Intro\n      Detail\n    Methods");
    assert!(report.header_found);
    assert_eq!(doc.header.as_deref(), Some(MINDMAP_HEADER));
    assert_eq!(doc.nodes.len(), 1);

    let root = doc.root().unwrap();
    assert_eq!(root.shape.id.as_deref(), Some("root"));
    assert_eq!(root.shape.descr, "Paper");
    assert!(root.shape.is_root_marked());
    assert_eq!(labels(root), vec!["Intro", "Methods"]);
    assert_eq!(labels(&root.children[0]), vec!["Detail"]);
    assert_eq!(doc.node_count(), 4);
    assert_eq!(doc.max_depth(), 3);
}

#[test]
fn mindmap_ragged_indentation_is_normalized() {
    let (doc, _) = parse("mindmap\n  root((A))\n     B\n   C\n        D");
    let root = doc.root().unwrap();
    assert_eq!(labels(root), vec!["B", "C"]);
    assert_eq!(labels(&root.children[1]), vec!["D"]);
    assert_eq!(
        render_mindmap(&doc),
        "mindmap\n  root((A))\n    B\n    C\n      D\n"
    );
}

#[test]
fn mindmap_tabs_count_as_two_columns() {
    let (doc, _) = parse("mindmap\n\troot((A))\n\t\tB\n    C");
    let root = doc.root().unwrap();
    assert_eq!(labels(root), vec!["B", "C"]);
}

#[test]
fn mindmap_icon_and_class_lines_decorate_previous_node() {
    let (doc, report) =
        parse("mindmap\n  root((A))\n    B\n    ::icon(fa fa-book)\n    :::urgent  large\n");
    assert_eq!(report.orphan_decorations, 0);
    let b = &doc.root().unwrap().children[0];
    assert_eq!(b.icon.as_deref(), Some("fa fa-book"));
    assert_eq!(b.class.as_deref(), Some("urgent large"));
    assert_eq!(
        render_mindmap(&doc),
        "mindmap\n  root((A))\n    B:::urgent large\n      ::icon(fa fa-book)\n"
    );
}

#[test]
fn mindmap_decoration_without_node_is_counted() {
    let (doc, report) = parse("mindmap\n::icon(fa fa-book)\n  root((A))");
    assert_eq!(report.orphan_decorations, 1);
    assert_eq!(doc.node_count(), 1);
    assert_eq!(doc.root().unwrap().icon, None);
}

#[test]
fn mindmap_class_suffix_on_node_line() {
    let (doc, _) = parse("mindmap\n  root((A)):::root\n    B ::: branch1");
    let root = doc.root().unwrap();
    assert_eq!(root.class.as_deref(), Some("root"));
    assert_eq!(root.children[0].class.as_deref(), Some("branch1"));
    assert_eq!(root.children[0].shape.descr, "B");
}

#[test]
fn mindmap_directives_round_trip() {
    let text = "mindmap\n  %% top comment\n  root((A))\n    B\nclassDef foo fill:#fff\n";
    let (doc, _) = parse(text);
    let root = doc.root().unwrap();
    assert_eq!(
        root.leading,
        vec![Directive::Comment("%% top comment".to_string())]
    );
    assert_eq!(
        doc.trailer,
        vec![Directive::ClassDef("classDef foo fill:#fff".to_string())]
    );
    assert!(doc.has_class_defs());
    assert_eq!(render_mindmap(&doc), text);
}

#[test]
fn mindmap_front_matter_is_kept_before_header() {
    let (doc, report) = parse("---\ntitle: X\n---\nmindmap\n  root((A))");
    assert!(report.header_found);
    assert_eq!(doc.preamble, vec!["---", "title: X", "---"]);
    assert_eq!(
        render_mindmap(&doc),
        "---\ntitle: X\n---\nmindmap\n  root((A))\n"
    );
}

#[test]
fn mindmap_node_on_header_line() {
    let (doc, _) = parse("mindmap root((A))\n  B");
    let root = doc.root().unwrap();
    assert_eq!(root.shape.descr, "A");
    assert_eq!(labels(root), vec!["B"]);
}

#[test]
fn mindmap_missing_header_is_not_invented_by_parser() {
    let (doc, report) = parse("root((A))\n  B");
    assert!(!report.header_found);
    assert_eq!(doc.header, None);
    assert_eq!(render_mindmap(&doc), "  root((A))\n    B\n");
}

#[test]
fn mindmap_crlf_input() {
    let (doc, _) = parse("mindmap\r\n  root((A))\r\n    B\r\n");
    assert_eq!(render_mindmap(&doc), "mindmap\n  root((A))\n    B\n");
}

#[test]
fn mindmap_malformed_nodes_are_repaired() {
    let (doc, report) = parse("mindmap\n  root((A))\n    Results (Table 2)\n    ((Broken");
    assert_eq!(report.repaired_nodes, 2);
    let root = doc.root().unwrap();
    assert_eq!(labels(root), vec!["Results Table 2", "Broken"]);
    assert!(root.children.iter().all(|c| c.shape.delimiters.is_none()));
}

#[test]
fn mindmap_shapes_render_back_unchanged() {
    let text = "mindmap\n  root((A))\n    id1[Square]\n    {{Hex}}\n    )Cloud(\n    ))Bang((\n    (-x-)\n    [\"`**bold** text`\"]\n";
    let (doc, report) = parse(text);
    assert_eq!(report.repaired_nodes, 0);
    let root = doc.root().unwrap();
    assert_eq!(root.children[0].shape.id.as_deref(), Some("id1"));
    assert_eq!(root.children[5].shape.quote, LabelQuote::Markdown);
    assert_eq!(root.children[5].shape.descr, "**bold** text");
    assert_eq!(render_mindmap(&doc), text);
}

#[test]
fn mindmap_inline_comment_is_dropped() {
    let (doc, _) = parse("mindmap\n  root((A))\n    Intro %% remove me");
    assert_eq!(labels(doc.root().unwrap()), vec!["Intro"]);
}

#[test]
fn mindmap_demote_drops_root_id() {
    let mut shape = NodeShape::root("B");
    shape.demote();
    assert_eq!(shape.to_string(), "(B)");

    let mut shape = NodeShape {
        id: Some("topic".to_string()),
        ..NodeShape::root("C")
    };
    shape.demote();
    assert_eq!(shape.to_string(), "topic(C)");
}

#[test]
fn mindmap_directive_classification() {
    assert_eq!(
        Directive::classify("%%{init: {}}%%"),
        Some(Directive::Other("%%{init: {}}%%".to_string()))
    );
    assert!(matches!(
        Directive::classify("%% note"),
        Some(Directive::Comment(_))
    ));
    assert!(Directive::classify("classDef x fill:#fff").is_some_and(|d| d.is_class_def()));
    assert_eq!(Directive::classify("classDefinitions"), None);
}

#[test]
fn mindmap_document_serializes_to_json() {
    let (doc, _) = parse("mindmap\n  root((A))\n    B");
    let value: Value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value["header"], "mindmap");
    assert_eq!(value["nodes"][0]["shape"]["descr"], "A");
    assert_eq!(value["nodes"][0]["shape"]["delimiters"]["open"], "((");
    assert_eq!(value["nodes"][0]["children"][0]["shape"]["descr"], "B");
    assert_eq!(value["nodes"][0]["synthetic"], false);
}

#[test]
fn mindmap_empty_input() {
    let (doc, report) = parse("");
    assert!(!report.header_found);
    assert_eq!(doc.node_count(), 0);
    assert_eq!(doc.max_depth(), 0);
    assert_eq!(render_mindmap(&doc), "");
}
