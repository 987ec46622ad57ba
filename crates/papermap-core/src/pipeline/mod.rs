//! The four-stage post-processing pipeline: root normalization, depth filtering, automatic
//! expansion and colorization, each a transform over [`DiagramDocument`].

mod colorize;
mod depth;
mod expand;
mod lineage;
mod normalize;


use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::config::{DetailLevel, PipelineConfig};
use crate::keywords::{HeuristicKeywords, KeywordExtractor};
use crate::mindmap::{
    DiagramDocument, DiagramNode, MINDMAP_HEADER, NodeShape, ParseReport, parse_mindmap,
    render_mindmap,
};
use crate::preprocess::clean_response;
use crate::{Error, Result};

pub use colorize::{ColorizeMode, ColorizeReport, colorize_document};
pub use depth::filter_document_by_depth;
pub use expand::expand_document;
pub use normalize::{NormalizeReport, normalize_root_document};

/// Placeholder children of the fallback diagram.
pub const FALLBACK_CHILDREN: [&str; 2] = ["Overview", "Key points"];

/// What happened during one [`Pipeline::try_process`] run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub detail_level: DetailLevel,
    pub max_depth: usize,
    pub parse: ParseReport,
    pub normalize: NormalizeReport,
    pub nodes_in: usize,
    pub nodes_pruned: usize,
    pub nodes_synthesized: usize,
    pub nodes_out: usize,
    pub colorize: ColorizeReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDiagram {
    pub text: String,
    pub stats: PipelineStats,
}

/// Runs the pipeline with a given config and keyword strategy.
///
/// Every method is synchronous and free of I/O; a `Pipeline` can be shared across threads.
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    extractor: Arc<dyn KeywordExtractor>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        let config = PipelineConfig::default();
        let extractor = Arc::new(HeuristicKeywords::new(
            config.expansion.max_keywords,
            config.expansion.min_keyword_len,
        ));
        Self { config, extractor }
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `config` (validated) with the default keyword heuristics sized from it.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let extractor = Arc::new(HeuristicKeywords::new(
            config.expansion.max_keywords,
            config.expansion.min_keyword_len,
        ));
        Ok(Self { config, extractor })
    }

    /// Swaps the keyword strategy used by the auto-expander.
    pub fn with_keyword_extractor(mut self, extractor: impl KeywordExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn parse(&self, text: &str) -> (DiagramDocument, ParseReport) {
        parse_mindmap(text, self.config.max_label_width)
    }

    pub fn normalize_root(&self, text: &str) -> String {
        let (mut doc, _) = self.parse(text);
        normalize_root_document(&mut doc, &self.config.default_root_label);
        render_mindmap(&doc)
    }

    pub fn filter_by_depth(&self, text: &str, max_depth: usize) -> String {
        let (mut doc, _) = self.parse(text);
        filter_document_by_depth(&mut doc, max_depth);
        render_mindmap(&doc)
    }

    pub fn auto_expand(&self, text: &str, level: DetailLevel) -> String {
        let (mut doc, _) = self.parse(text);
        expand_document(
            &mut doc,
            level,
            self.config.max_depth(level),
            &self.config.expansion,
            self.extractor.as_ref(),
        );
        render_mindmap(&doc)
    }

    pub fn colorize(&self, text: &str) -> String {
        let (mut doc, _) = self.parse(text);
        colorize_document(&mut doc);
        render_mindmap(&doc)
    }

    /// Runs every stage on an AI response and reports what each one did.
    pub fn try_process(&self, raw: &str, level: DetailLevel) -> Result<ProcessedDiagram> {
        let limit = self.config.max_input_bytes;
        if raw.len() > limit {
            return Err(Error::InputTooLarge {
                len: raw.len(),
                limit,
            });
        }
        let start = Instant::now();

        let cleaned = clean_response(raw);
        let (mut doc, parse) = self.parse(&cleaned);
        let nodes_in = doc.node_count();
        if nodes_in == 0 {
            return Err(Error::EmptyDiagram);
        }

        let max_depth = self.config.max_depth(level);
        let normalize = normalize_root_document(&mut doc, &self.config.default_root_label);
        let nodes_pruned = filter_document_by_depth(&mut doc, max_depth);
        let nodes_synthesized = expand_document(
            &mut doc,
            level,
            max_depth,
            &self.config.expansion,
            self.extractor.as_ref(),
        );
        let colorize = colorize_document(&mut doc);

        let stats = PipelineStats {
            detail_level: level,
            max_depth,
            parse,
            normalize,
            nodes_in,
            nodes_pruned,
            nodes_synthesized,
            nodes_out: doc.node_count(),
            colorize,
        };
        tracing::debug!(
            elapsed = ?start.elapsed(),
            nodes_in,
            nodes_out = stats.nodes_out,
            "processed diagram"
        );

        Ok(ProcessedDiagram {
            text: render_mindmap(&doc),
            stats,
        })
    }

    /// Like [`Pipeline::try_process`] but never fails: any error, or a panic inside a custom
    /// keyword extractor, yields [`Pipeline::fallback`].
    ///
    /// The panic itself is still reported by the process-wide panic hook (stderr by default)
    /// before the fallback is returned; callers that route all output through `tracing` should
    /// install their own hook with [`std::panic::set_hook`].
    pub fn process(&self, raw: &str, level: DetailLevel) -> String {
        match catch_unwind(AssertUnwindSafe(|| self.try_process(raw, level))) {
            Ok(Ok(processed)) => processed.text,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "diagram pipeline failed; using fallback diagram");
                self.fallback()
            }
            Err(_) => {
                tracing::warn!("diagram pipeline panicked; using fallback diagram");
                self.fallback()
            }
        }
    }

    /// A minimal colorized diagram: the default root plus two placeholder children.
    pub fn fallback(&self) -> String {
        fallback_diagram(&self.config.default_root_label)
    }
}

pub fn fallback_diagram(root_label: &str) -> String {
    let mut root = DiagramNode::new(NodeShape::root(root_label));
    root.children = FALLBACK_CHILDREN
        .iter()
        .map(|label| DiagramNode::synthetic(*label, None))
        .collect();
    let mut doc = DiagramDocument {
        header: Some(MINDMAP_HEADER.to_string()),
        nodes: vec![root],
        ..Default::default()
    };
    colorize_document(&mut doc);
    render_mindmap(&doc)
}

pub fn normalize_root(text: &str) -> String {
    Pipeline::default().normalize_root(text)
}

pub fn filter_by_depth(text: &str, max_depth: usize) -> String {
    Pipeline::default().filter_by_depth(text, max_depth)
}

pub fn auto_expand(text: &str, level: DetailLevel) -> String {
    Pipeline::default().auto_expand(text, level)
}

pub fn colorize(text: &str) -> String {
    Pipeline::default().colorize(text)
}

/// Composed entry point with the default config. Never fails.
pub fn process_diagram(raw: &str, level: DetailLevel) -> String {
    Pipeline::default().process(raw, level)
}
