//! Mindmap text model: parse into a tree, render back to canonical text.

mod model;
mod parse;
mod render;
mod utils;

#[cfg(test)]
mod tests;

pub use model::{
    DiagramDocument, DiagramNode, Delimiters, Directive, LabelQuote, MINDMAP_HEADER, NodeShape,
};
pub use parse::{ParseReport, parse_mindmap};
pub use render::{INDENT, render_mindmap};

pub(crate) use utils::repair_plain_label;
