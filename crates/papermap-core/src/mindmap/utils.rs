use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use unicode_width::UnicodeWidthChar;

use super::model::{Delimiters, LabelQuote, NodeShape};

/// Columns a tab contributes to indentation.
const TAB_WIDTH: usize = 2;

pub(crate) const UNTITLED_LABEL: &str = "Untitled";

pub(crate) fn starts_with_case_insensitive(haystack: &str, needle: &str) -> bool {
    if haystack.len() < needle.len() {
        return false;
    }
    haystack
        .as_bytes()
        .iter()
        .take(needle.len())
        .copied()
        .map(|b| b.to_ascii_lowercase())
        .eq(needle
            .as_bytes()
            .iter()
            .copied()
            .map(|b| b.to_ascii_lowercase()))
}

/// Splits leading whitespace off a line and returns its width in columns.
pub(crate) fn split_indent(line: &str) -> (usize, &str) {
    let mut columns = 0usize;
    for (idx, ch) in line.char_indices() {
        match ch {
            '\t' => columns += TAB_WIDTH,
            c if c.is_whitespace() => columns += 1,
            _ => return (columns, &line[idx..]),
        }
    }
    (columns, "")
}

pub(crate) fn strip_inline_comment(line: &str) -> &str {
    let mut in_quote = false;
    let mut in_backtick_quote = false;

    let mut it = line.char_indices().peekable();
    while let Some((idx, ch)) = it.next() {
        if in_backtick_quote {
            if ch == '`' && it.peek().is_some_and(|(_, next)| *next == '"') {
                in_backtick_quote = false;
                it.next();
            }
            continue;
        }

        if in_quote {
            if ch == '"' {
                in_quote = false;
            }
            continue;
        }

        if ch == '"' {
            if it.peek().is_some_and(|(_, next)| *next == '`') {
                in_backtick_quote = true;
                it.next();
                continue;
            }
            in_quote = true;
            continue;
        }

        if ch == '%' && it.peek().is_some_and(|(_, next)| *next == '%') {
            return &line[..idx];
        }
    }

    line
}

fn class_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r":::\s*([A-Za-z_][\w-]*(?:\s+[A-Za-z_][\w-]*)*)\s*$").expect("valid regex")
    })
}

/// Splits a trailing `:::class` suffix off a node line.
pub(crate) fn split_class_suffix(rest: &str) -> (&str, Option<String>) {
    let Some(caps) = class_suffix_re().captures(rest) else {
        return (rest, None);
    };
    let (Some(whole), Some(classes)) = (caps.get(0), caps.get(1)) else {
        return (rest, None);
    };
    let classes = classes
        .as_str()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (rest[..whole.start()].trim_end(), Some(classes))
}

type NodeSpec = (Option<String>, String, Option<Delimiters>, LabelQuote);

pub(crate) fn parse_node_spec(input: &str) -> std::result::Result<NodeSpec, String> {
    let input = input.trim_end();
    if input.is_empty() {
        return Err("expected node".to_string());
    }

    if let Some(delims) = node_delimiter_pair_at_start(input) {
        let (inner, tail) = extract_delimited(input, delims)?;
        if !tail.trim().is_empty() {
            return Err("unexpected trailing input".to_string());
        }
        let (descr, quote) = unquote_node_descr(inner);
        return Ok((None, descr, Some(delims), quote));
    }

    let (id_raw, rest) = split_node_id(input);
    let rest = rest.trim_end();
    if rest.is_empty() {
        return Ok((None, id_raw.to_string(), None, LabelQuote::None));
    }

    let Some(delims) = node_delimiter_pair_at_start(rest) else {
        return Err("expected node delimiter".to_string());
    };
    let id = id_raw.trim();
    if id_raw.chars().any(char::is_whitespace) && !id.eq_ignore_ascii_case("root") {
        // `Results (Table 2)` is prose with a parenthetical, not an id followed by a shape.
        return Err("node id contains whitespace".to_string());
    }

    let (inner, tail) = extract_delimited(rest, delims)?;
    if !tail.trim().is_empty() {
        return Err("unexpected trailing input".to_string());
    }

    let (descr, quote) = unquote_node_descr(inner);
    let id = (!id.is_empty()).then(|| id.to_string());
    Ok((id, descr, Some(delims), quote))
}

fn split_node_id(input: &str) -> (&str, &str) {
    let bytes = input.as_bytes();
    for (idx, b) in bytes.iter().enumerate() {
        match b {
            b'(' | b')' | b'[' | b'{' | b'}' => return (&input[..idx], &input[idx..]),
            _ => {}
        }
    }
    (input, "")
}

fn node_delimiter_pair_at_start(input: &str) -> Option<Delimiters> {
    const PAIRS: &[Delimiters] = &[
        Delimiters::new("(-", "-)"),
        Delimiters::new("-)", "(-"),
        Delimiters::CIRCLE,
        Delimiters::new("))", "(("),
        Delimiters::new("{{", "}}"),
        Delimiters::new("[", "]"),
        Delimiters::new(")", "("),
        Delimiters::ROUNDED,
    ];

    PAIRS.iter().copied().find(|d| input.starts_with(d.open))
}

fn extract_delimited(
    input: &str,
    delims: Delimiters,
) -> std::result::Result<(&str, &str), String> {
    if !input.starts_with(delims.open) {
        return Err("expected delimiter start".to_string());
    }
    let mut in_quote = false;
    let mut in_backtick_quote = false;

    let start_len = delims.open.len();
    let mut it = input[start_len..].char_indices().peekable();
    while let Some((off, ch)) = it.next() {
        let idx = start_len + off;

        if in_backtick_quote {
            if ch == '`' && it.peek().is_some_and(|(_, next)| *next == '"') {
                in_backtick_quote = false;
                it.next();
            }
            continue;
        }

        if in_quote {
            if ch == '"' {
                in_quote = false;
            }
            continue;
        }

        if ch == '"' {
            if it.peek().is_some_and(|(_, next)| *next == '`') {
                in_backtick_quote = true;
                it.next();
                continue;
            }
            in_quote = true;
            continue;
        }

        if input[idx..].starts_with(delims.close) {
            let inner = &input[start_len..idx];
            let tail = &input[idx + delims.close.len()..];
            return Ok((inner, tail));
        }
    }

    Err("unterminated node delimiter".to_string())
}

fn unquote_node_descr(raw: &str) -> (String, LabelQuote) {
    if let Some(inner) = raw.strip_prefix("\"`").and_then(|s| s.strip_suffix("`\"")) {
        return (inner.to_string(), LabelQuote::Markdown);
    }
    if let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return (inner.to_string(), LabelQuote::Plain);
    }
    (raw.to_string(), LabelQuote::None)
}

/// Characters that change meaning in an unquoted mindmap label.
fn is_label_breaking(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '{' | '}' | '"' | '`')
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Degrades malformed node text to a plain label the renderer accepts.
pub(crate) fn repair_plain_label(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .map(|c| if is_label_breaking(c) { ' ' } else { c })
        .collect();
    collapse_whitespace(&stripped)
}

pub(crate) fn truncate_to_width(label: &str, max_width: usize) -> Cow<'_, str> {
    let width: usize = label.chars().map(|c| c.width().unwrap_or(0)).sum();
    if width <= max_width {
        return Cow::Borrowed(label);
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0usize;
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    let mut out = out.trim_end().to_string();
    out.push('…');
    Cow::Owned(out)
}

fn tidy_descr(raw: &str, quote: LabelQuote, max_width: usize) -> String {
    let unescaped = htmlize::unescape(raw);
    let mut descr = match quote {
        // Markdown strings may carry meaningful line breaks and emphasis markers.
        LabelQuote::Markdown => unescaped.trim().to_string(),
        LabelQuote::Plain => collapse_whitespace(&unescaped.replace('"', "")),
        LabelQuote::None => collapse_whitespace(&unescaped),
    };
    if quote == LabelQuote::None && descr.chars().any(is_label_breaking) {
        descr = repair_plain_label(&descr);
    }
    if descr.is_empty() {
        return UNTITLED_LABEL.to_string();
    }
    if quote == LabelQuote::Markdown {
        return descr;
    }
    truncate_to_width(&descr, max_width).into_owned()
}

/// Parses node text into a shape, repairing anything the renderer would reject.
pub(crate) fn parse_node_text(input: &str, max_width: usize) -> (NodeShape, bool) {
    match parse_node_spec(input) {
        Ok((id, descr, delimiters, quote)) => {
            let descr = tidy_descr(&descr, quote, max_width);
            let shape = NodeShape {
                id,
                descr,
                delimiters,
                quote,
            };
            (shape, false)
        }
        Err(_) => {
            let label = tidy_descr(&repair_plain_label(input), LabelQuote::None, max_width);
            (NodeShape::plain(label), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_indent_counts_tabs_as_two_columns() {
        assert_eq!(split_indent("\t\tchild"), (4, "child"));
        assert_eq!(split_indent("   x"), (3, "x"));
        assert_eq!(split_indent("    "), (4, ""));
    }

    #[test]
    fn class_suffix_is_split_off() {
        assert_eq!(
            split_class_suffix("root((Paper))::: root"),
            ("root((Paper))", Some("root".to_string()))
        );
        assert_eq!(
            split_class_suffix("Intro:::a  b"),
            ("Intro", Some("a b".to_string()))
        );
        assert_eq!(split_class_suffix("ratio 3:1"), ("ratio 3:1", None));
    }

    #[test]
    fn node_spec_with_id_and_shape() {
        let (id, descr, delims, _) = parse_node_spec("root((The Paper))").unwrap();
        assert_eq!(id.as_deref(), Some("root"));
        assert_eq!(descr, "The Paper");
        assert_eq!(delims, Some(Delimiters::CIRCLE));
    }

    #[test]
    fn prose_with_parenthetical_is_not_an_id() {
        assert!(parse_node_spec("Results (Table 2)").is_err());
        let (shape, repaired) = parse_node_text("Results (Table 2)", 80);
        assert!(repaired);
        assert_eq!(shape, NodeShape::plain("Results Table 2"));
    }

    #[test]
    fn unbalanced_delimiters_degrade_to_plain_text() {
        let (shape, repaired) = parse_node_text("((Unclosed root", 80);
        assert!(repaired);
        assert_eq!(shape.descr, "Unclosed root");
        assert_eq!(shape.delimiters, None);
    }

    #[test]
    fn entities_are_unescaped() {
        let (shape, _) = parse_node_text("Methods &amp; Data", 80);
        assert_eq!(shape.descr, "Methods & Data");
    }

    #[test]
    fn empty_shape_gets_placeholder_label() {
        let (shape, _) = parse_node_text("[]", 80);
        assert_eq!(shape.descr, UNTITLED_LABEL);
    }

    #[test]
    fn long_labels_are_truncated_by_display_width() {
        let label = "x".repeat(20);
        assert_eq!(truncate_to_width(&label, 10), format!("{}…", "x".repeat(9)));
        assert_eq!(truncate_to_width("short", 10), "short");
        // Wide CJK characters count two columns each.
        assert_eq!(truncate_to_width("漢字漢字漢字", 6), "漢字…");
    }

    #[test]
    fn inline_comment_is_stripped_outside_quotes() {
        assert_eq!(strip_inline_comment("Intro %% note"), "Intro ");
        assert_eq!(strip_inline_comment("[\"50%% off\"]"), "[\"50%% off\"]");
    }
}
