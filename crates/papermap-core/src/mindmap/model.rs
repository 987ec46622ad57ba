use serde::Serialize;
use std::fmt;

/// Opening and closing markers of a shaped node, e.g. `((` / `))` for a circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Delimiters {
    pub open: &'static str,
    pub close: &'static str,
}

impl Delimiters {
    pub const CIRCLE: Self = Self::new("((", "))");
    pub const ROUNDED: Self = Self::new("(", ")");

    pub const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelQuote {
    #[default]
    None,
    /// `"text"`
    Plain,
    /// `` "`text`" ``
    Markdown,
}

/// The text of a node line without indentation and class suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeShape {
    pub id: Option<String>,
    pub descr: String,
    pub delimiters: Option<Delimiters>,
    pub quote: LabelQuote,
}

impl NodeShape {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            id: None,
            descr: text.into(),
            delimiters: None,
            quote: LabelQuote::None,
        }
    }

    /// `root((label))`
    pub fn root(label: impl Into<String>) -> Self {
        Self {
            id: Some("root".to_string()),
            descr: label.into(),
            delimiters: Some(Delimiters::CIRCLE),
            quote: LabelQuote::None,
        }
    }

    pub fn is_root_marked(&self) -> bool {
        self.delimiters == Some(Delimiters::CIRCLE)
    }

    /// Turns a root-marked shape into a plain rounded node: `x((y))` becomes `x(y)` and the
    /// conventional `root` id is dropped along with the marker.
    pub fn demote(&mut self) {
        if !self.is_root_marked() {
            return;
        }
        self.delimiters = Some(Delimiters::ROUNDED);
        if self
            .id
            .as_deref()
            .is_some_and(|id| id.eq_ignore_ascii_case("root"))
        {
            self.id = None;
        }
    }

    /// The human readable label.
    pub fn text(&self) -> &str {
        &self.descr
    }
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.id {
            f.write_str(id)?;
        }
        let (open, close) = match self.delimiters {
            Some(d) => (d.open, d.close),
            None => ("", ""),
        };
        let (q_open, q_close) = match self.quote {
            LabelQuote::None => ("", ""),
            LabelQuote::Plain => ("\"", "\""),
            LabelQuote::Markdown => ("\"`", "`\""),
        };
        write!(f, "{open}{q_open}{}{q_close}{close}", self.descr)
    }
}

/// A non-node line. Passed through by the tree-shaping stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum Directive {
    /// `%% ...`
    Comment(String),
    /// `classDef <name> <props>`
    ClassDef(String),
    Other(String),
}

impl Directive {
    pub fn text(&self) -> &str {
        match self {
            Self::Comment(t) | Self::ClassDef(t) | Self::Other(t) => t,
        }
    }

    pub fn is_class_def(&self) -> bool {
        matches!(self, Self::ClassDef(_))
    }

    /// Classifies one trimmed line; `None` means it is a node (or decoration) line.
    pub fn classify(trimmed: &str) -> Option<Self> {
        if trimmed.starts_with("%%{") {
            return Some(Self::Other(trimmed.to_string()));
        }
        if trimmed.starts_with("%%") {
            return Some(Self::Comment(trimmed.to_string()));
        }
        if is_class_def_line(trimmed) {
            return Some(Self::ClassDef(trimmed.to_string()));
        }
        None
    }
}

pub(crate) fn is_class_def_line(trimmed: &str) -> bool {
    trimmed
        .strip_prefix("classDef")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    pub shape: NodeShape,
    pub class: Option<String>,
    pub icon: Option<String>,
    /// Created by the pipeline rather than parsed from the input.
    pub synthetic: bool,
    /// Directive lines that appeared directly before this node.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub leading: Vec<Directive>,
    pub children: Vec<DiagramNode>,
}

impl DiagramNode {
    pub fn new(shape: NodeShape) -> Self {
        Self {
            shape,
            class: None,
            icon: None,
            synthetic: false,
            leading: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn synthetic(label: impl Into<String>, class: Option<String>) -> Self {
        Self {
            class,
            synthetic: true,
            ..Self::new(NodeShape::plain(label))
        }
    }

    pub fn has_class(&self) -> bool {
        self.class.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    /// Levels below this node; a leaf has height 0.
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order walk; the callback receives the level relative to `self` (0).
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a DiagramNode, usize)) {
        fn go<'a>(n: &'a DiagramNode, level: usize, f: &mut impl FnMut(&'a DiagramNode, usize)) {
            f(n, level);
            for c in &n.children {
                go(c, level + 1, f);
            }
        }
        go(self, 0, f);
    }
}

/// A parsed mindmap: the tree plus every directive line around it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    /// Lines preceding the diagram-kind header (front matter and the like), verbatim.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preamble: Vec<String>,
    pub header: Option<String>,
    /// Top-level nodes. After root normalization this holds exactly one node.
    pub nodes: Vec<DiagramNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trailer: Vec<Directive>,
}

pub const MINDMAP_HEADER: &str = "mindmap";

impl DiagramDocument {
    pub fn root(&self) -> Option<&DiagramNode> {
        self.nodes.first()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(DiagramNode::subtree_len).sum()
    }

    /// Rendered depth of the deepest node (root = 1), 0 for an empty document.
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.height() + 1).max().unwrap_or(0)
    }

    /// Pre-order walk over every node with its level (top-level nodes are level 0).
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a DiagramNode, usize)) {
        for n in &self.nodes {
            n.walk(f);
        }
    }

    /// Every directive in document order, including those attached to nodes.
    pub fn directives(&self) -> Vec<&Directive> {
        let mut out = Vec::new();
        self.walk(&mut |n, _| out.extend(n.leading.iter()));
        out.extend(self.trailer.iter());
        out
    }

    pub fn has_class_defs(&self) -> bool {
        self.directives().into_iter().any(Directive::is_class_def)
    }

    /// Mutable access to every directive, used to rewrite definitions in place.
    pub fn for_each_directive_mut(&mut self, f: &mut impl FnMut(&mut Directive)) {
        fn go(n: &mut DiagramNode, f: &mut impl FnMut(&mut Directive)) {
            n.leading.iter_mut().for_each(&mut *f);
            for c in &mut n.children {
                go(c, f);
            }
        }
        for n in &mut self.nodes {
            go(n, f);
        }
        self.trailer.iter_mut().for_each(f);
    }
}
