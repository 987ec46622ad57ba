#![forbid(unsafe_code)]

//! Post-processing for AI-generated Mermaid mindmaps (headless).
//!
//! Design goals:
//! - every stage is a pure tree transform: parse, normalize the root, filter by depth,
//!   expand bare leaves, colorize, render
//! - deterministic output for a given input, detail level and config
//! - the composed entry point never fails; it falls back to a minimal diagram instead

pub mod config;
pub mod error;
pub mod keywords;
pub mod mindmap;
pub mod pipeline;
pub mod preprocess;
pub mod prompt;
mod theme;

pub use config::{DepthLimits, DetailLevel, ExpansionConfig, PipelineConfig};
pub use error::{Error, Result};
pub use keywords::{HeuristicKeywords, KeywordExtractor};
pub use mindmap::{DiagramDocument, DiagramNode, parse_mindmap, render_mindmap};
pub use pipeline::{
    Pipeline, PipelineStats, ProcessedDiagram, auto_expand, colorize, fallback_diagram,
    filter_by_depth, normalize_root, process_diagram,
};
pub use preprocess::clean_response;
pub use prompt::{DiagramPrompt, build_prompt};
