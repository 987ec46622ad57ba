//! Cleanup of raw AI responses before they are parsed as mindmap text.

use regex::Regex;
use std::sync::OnceLock;

use crate::mindmap::MINDMAP_HEADER;

fn newline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r\n?").expect("valid regex"))
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(```|~~~)\s*([A-Za-z0-9_-]*)").expect("valid regex"))
}

fn is_invisible(ch: char) -> bool {
    matches!(
        ch,
        '\u{feff}' | '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{2060}'
    )
}

/// Normalizes an AI response into bare diagram text.
///
/// - line endings become `\n`; BOM and zero-width characters are removed
/// - a fenced block (```` ```mermaid ````, ```` ``` ````, `~~~`) is unwrapped; a block tagged
///   `mermaid`/`mindmap` wins over untagged ones, and an unclosed fence runs to the end
/// - chatter before an unfenced `mindmap` header is dropped
/// - trailing whitespace and surrounding blank lines are trimmed
pub fn clean_response(raw: &str) -> String {
    let text: String = newline_re()
        .replace_all(raw, "\n")
        .chars()
        .filter(|c| !is_invisible(*c))
        .collect();
    let lines: Vec<&str> = text.split('\n').collect();

    let body = match extract_fenced(&lines) {
        Some(block) => block,
        None => drop_leading_chatter(&lines),
    };

    let trimmed: Vec<&str> = body.iter().map(|l| l.trim_end()).collect();
    let start = trimmed.iter().position(|l| !l.is_empty());
    let end = trimmed.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(s), Some(e)) => trimmed[s..=e].join("\n"),
        _ => String::new(),
    }
}

fn extract_fenced<'a>(lines: &[&'a str]) -> Option<Vec<&'a str>> {
    let mut blocks: Vec<(String, Vec<&'a str>)> = Vec::new();
    let mut idx = 0usize;
    while idx < lines.len() {
        let Some(caps) = fence_re().captures(lines[idx]) else {
            idx += 1;
            continue;
        };
        let marker = caps[1].to_string();
        let tag = caps[2].to_ascii_lowercase();
        let body_start = idx + 1;
        let close = lines[body_start..]
            .iter()
            .position(|l| l.trim_start().starts_with(marker.as_str()));
        let body_end = close.map_or(lines.len(), |c| body_start + c);
        blocks.push((tag, lines[body_start..body_end].to_vec()));
        idx = body_end + 1;
    }

    let preferred = blocks
        .iter()
        .position(|(tag, _)| tag == "mermaid" || tag == MINDMAP_HEADER);
    let pick = preferred.or_else(|| (!blocks.is_empty()).then_some(0))?;
    Some(blocks.swap_remove(pick).1)
}

fn drop_leading_chatter<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let Some(header) = lines.iter().position(|l| {
        let t = l.trim();
        t.eq_ignore_ascii_case(MINDMAP_HEADER)
            || (t.len() > MINDMAP_HEADER.len()
                && t.is_char_boundary(MINDMAP_HEADER.len())
                && t[..MINDMAP_HEADER.len()].eq_ignore_ascii_case(MINDMAP_HEADER)
                && t[MINDMAP_HEADER.len()..].starts_with(char::is_whitespace))
    }) else {
        return lines.to_vec();
    };
    // Front matter and directives before the header are part of the diagram.
    let keeps_prelude = lines[..header].iter().any(|l| {
        let t = l.trim();
        t == "---" || t.starts_with("%%")
    });
    if keeps_prelude {
        lines.to_vec()
    } else {
        lines[header..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_mermaid_fence_surrounded_by_prose() {
        let raw = "Sure! Here is your mind map:\n\n```mermaid\nmindmap\n  root((Paper))\n    Intro\n```\nLet me know if you need changes.";
        assert_eq!(clean_response(raw), "mindmap\n  root((Paper))\n    Intro");
    }

    #[test]
    fn prefers_tagged_block_over_untagged() {
        let raw = "```\nnot this\n```\n```mermaid\nmindmap\n  root((A))\n```";
        assert_eq!(clean_response(raw), "mindmap\n  root((A))");
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let raw = "```mermaid\r\nmindmap\r\n  root((A))\r\n";
        assert_eq!(clean_response(raw), "mindmap\n  root((A))");
    }

    #[test]
    fn strips_invisible_characters_and_trailing_spaces() {
        let raw = "\u{feff}mindmap   \n  root((A\u{200b}))  \n\n\n";
        assert_eq!(clean_response(raw), "mindmap\n  root((A))");
    }

    #[test]
    fn drops_chatter_before_unfenced_header() {
        let raw = "Here you go:\nmindmap\n  root((A))";
        assert_eq!(clean_response(raw), "mindmap\n  root((A))");
    }

    #[test]
    fn keeps_front_matter_before_header() {
        let raw = "---\ntitle: Paper\n---\nmindmap\n  root((A))";
        assert_eq!(clean_response(raw), raw);
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        assert_eq!(clean_response(" \n\t\n"), "");
    }
}
