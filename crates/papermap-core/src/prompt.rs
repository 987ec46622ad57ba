//! Generation prompts for the model that drafts the mindmap.

use serde::Serialize;

use crate::config::{DetailLevel, PipelineConfig};

/// Appended to document text that was cut to fit the prompt budget.
pub const TRUNCATION_MARKER: &str = "\n[... document truncated ...]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramPrompt {
    pub system: String,
    pub user: String,
}

fn level_guidance(level: DetailLevel) -> &'static str {
    match level {
        DetailLevel::Simple => {
            "Keep it high level: the main sections of the document and at most one layer of \
             key points under each."
        }
        DetailLevel::Detailed => {
            "Cover every section with its key points and the most important supporting details."
        }
        DetailLevel::Advanced => {
            "Be exhaustive: sections, key points, supporting details, examples, methods, \
             figures and open questions."
        }
    }
}

/// Builds the system and user messages asking for a mindmap of `document_text`.
///
/// The document is cut at a character boundary after `config.prompt_char_budget` characters.
pub fn build_prompt(
    document_text: &str,
    level: DetailLevel,
    config: &PipelineConfig,
) -> DiagramPrompt {
    let max_depth = config.max_depth(level);
    let system = format!(
        "You turn documents into Mermaid mindmaps.\n\
         Reply with mindmap text only, no explanations.\n\
         Rules:\n\
         - The first line is `mindmap`.\n\
         - Exactly one root node, written as root((Title)) and indented by 2 spaces.\n\
         - Indent every child 2 spaces deeper than its parent. Use spaces, never tabs.\n\
         - At most {max_depth} levels including the root.\n\
         - Put a summary of the whole document as the first child of the root.\n\
         - Plain labels only: no parentheses, brackets, braces or quotes inside labels.\n\
         - No styling: no classDef lines and no ::: class suffixes.\n\
         {}",
        level_guidance(level)
    );

    let (body, truncated) = truncate_chars(document_text.trim(), config.prompt_char_budget);
    let mut user = format!("Create a mindmap ({level} level) of this document:\n\n{body}");
    if truncated {
        user.push_str(TRUNCATION_MARKER);
    }

    DiagramPrompt { system, user }
}

fn truncate_chars(text: &str, budget: usize) -> (&str, bool) {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => (&text[..cut], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_states_depth_for_level() {
        let cfg = PipelineConfig::default();
        let p = build_prompt("Body", DetailLevel::Simple, &cfg);
        assert!(p.system.contains("At most 3 levels"));
        let p = build_prompt("Body", DetailLevel::Advanced, &cfg);
        assert!(p.system.contains("At most 10 levels"));
        assert!(p.user.starts_with("Create a mindmap (advanced level)"));
    }

    #[test]
    fn short_documents_are_not_truncated() {
        let p = build_prompt("  A short paper.  ", DetailLevel::Detailed, &PipelineConfig::default());
        assert!(p.user.ends_with("A short paper."));
        assert!(!p.user.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn long_documents_are_cut_on_char_boundaries() {
        let cfg = PipelineConfig {
            prompt_char_budget: 5,
            ..PipelineConfig::default()
        };
        let p = build_prompt("ééééééééé", DetailLevel::Detailed, &cfg);
        assert!(!p.user.contains("éééééé"));
        assert!(p.user.ends_with(&format!("ééééé{TRUNCATION_MARKER}")));
    }
}
