//! Static style-class table used by the colorizer.

/// Visual properties of one style class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClassStyle {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub color: &'static str,
    /// Extra comma separated properties (font, stroke width), possibly empty.
    pub extra: &'static str,
}

impl ClassStyle {
    const fn new(
        fill: &'static str,
        stroke: &'static str,
        color: &'static str,
        extra: &'static str,
    ) -> Self {
        Self {
            fill,
            stroke,
            color,
            extra,
        }
    }

    pub fn definition(&self, name: &str) -> String {
        let mut line = format!(
            "classDef {name} fill:{},stroke:{},color:{}",
            self.fill, self.stroke, self.color
        );
        if !self.extra.is_empty() {
            line.push(',');
            line.push_str(self.extra);
        }
        line
    }
}

const ROOT: ClassStyle = ClassStyle::new(
    "#1e293b",
    "#0f172a",
    "#ffffff",
    "stroke-width:3px,font-weight:bold,font-size:18px",
);
const SUMMARY: ClassStyle = ClassStyle::new(
    "#0369a1",
    "#075985",
    "#ffffff",
    "stroke-width:2px,font-weight:bold",
);
const SUMMARY_DETAIL: ClassStyle = ClassStyle::new("#e0f2fe", "#0369a1", "#0c4a6e", "");
const NEUTRAL: ClassStyle = ClassStyle::new("#f8fafc", "#94a3b8", "#334155", "");

/// One hue family per branch: `[strong, medium, light, pale, dark text]`.
const BRANCH_HUES: [[&str; 5]; 8] = [
    ["#7c3aed", "#a78bfa", "#ede9fe", "#f5f3ff", "#4c1d95"],
    ["#059669", "#34d399", "#d1fae5", "#ecfdf5", "#064e3b"],
    ["#ea580c", "#fb923c", "#ffedd5", "#fff7ed", "#7c2d12"],
    ["#db2777", "#f472b6", "#fce7f3", "#fdf2f8", "#831843"],
    ["#2563eb", "#60a5fa", "#dbeafe", "#eff6ff", "#1e3a8a"],
    ["#ca8a04", "#facc15", "#fef9c3", "#fefce8", "#713f12"],
    ["#0d9488", "#2dd4bf", "#ccfbf1", "#f0fdfa", "#134e4a"],
    ["#dc2626", "#f87171", "#fee2e2", "#fef2f2", "#7f1d1d"],
];

/// Per-branch class families, most specific prefix first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BranchFamily {
    SubSubDetail,
    SubDetail,
    SubBranch,
    Detail,
    Branch,
}

impl BranchFamily {
    pub const ALL: [BranchFamily; 5] = [
        Self::Branch,
        Self::SubBranch,
        Self::Detail,
        Self::SubDetail,
        Self::SubSubDetail,
    ];

    const BY_PREFIX: [BranchFamily; 5] = [
        Self::SubSubDetail,
        Self::SubDetail,
        Self::SubBranch,
        Self::Detail,
        Self::Branch,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::SubSubDetail => "subsubdetail",
            Self::SubDetail => "subdetail",
            Self::SubBranch => "subbranch",
            Self::Detail => "detail",
            Self::Branch => "branch",
        }
    }

    pub fn class_name(self, branch: usize) -> String {
        format!("{}{branch}", self.prefix())
    }

    fn style(self, branch: usize) -> ClassStyle {
        let [strong, medium, light, pale, dark] =
            BRANCH_HUES[branch.saturating_sub(1) % BRANCH_HUES.len()];
        match self {
            Self::Branch => ClassStyle::new(
                strong,
                dark,
                "#ffffff",
                "stroke-width:2px,font-weight:bold",
            ),
            Self::SubBranch => ClassStyle::new(light, strong, dark, "font-weight:bold"),
            Self::Detail => ClassStyle::new(pale, medium, dark, ""),
            Self::SubDetail => ClassStyle::new("#ffffff", medium, dark, ""),
            Self::SubSubDetail => {
                ClassStyle::new("#ffffff", light, dark, "stroke-dasharray:3 3,font-size:12px")
            }
        }
    }
}

/// Splits `subdetail3` into its family and branch number.
pub(crate) fn parse_branch_class(name: &str) -> Option<(BranchFamily, usize)> {
    BranchFamily::BY_PREFIX.into_iter().find_map(|family| {
        let digits = name.strip_prefix(family.prefix())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n = digits.parse::<usize>().ok().filter(|n| *n > 0)?;
        Some((family, n))
    })
}

/// Content classes keyed by label stems. Order decides ties.
pub(crate) const SEMANTIC_CLASSES: &[(&str, &[&str], ClassStyle)] = &[
    (
        "intro",
        &["introduc", "intro"],
        ClassStyle::new("#fef3c7", "#d97706", "#78350f", "font-weight:bold"),
    ),
    (
        "background",
        &["background", "context", "motivation"],
        ClassStyle::new("#f1f5f9", "#64748b", "#1e293b", "font-weight:bold"),
    ),
    (
        "method",
        &["method", "approach", "procedure"],
        ClassStyle::new("#dbeafe", "#2563eb", "#1e3a8a", "font-weight:bold"),
    ),
    (
        "experiment",
        &["experiment", "setup", "dataset"],
        ClassStyle::new("#e0e7ff", "#4f46e5", "#312e81", "font-weight:bold"),
    ),
    (
        "result",
        &["result", "finding", "outcome"],
        ClassStyle::new("#dcfce7", "#16a34a", "#14532d", "font-weight:bold"),
    ),
    (
        "discussion",
        &["discuss", "interpretation"],
        ClassStyle::new("#fae8ff", "#c026d3", "#701a75", "font-weight:bold"),
    ),
    (
        "conclusion",
        &["conclu", "takeaway"],
        ClassStyle::new("#ccfbf1", "#0d9488", "#134e4a", "font-weight:bold"),
    ),
    (
        "reference",
        &["reference", "bibliograph", "citation"],
        ClassStyle::new("#f5f5f4", "#78716c", "#292524", ""),
    ),
    (
        "limitation",
        &["limitation", "weakness", "caveat"],
        ClassStyle::new("#fee2e2", "#dc2626", "#7f1d1d", "font-weight:bold"),
    ),
    (
        "future",
        &["future", "outlook", "next step"],
        ClassStyle::new("#ecfccb", "#65a30d", "#365314", "font-weight:bold"),
    ),
    (
        "theory",
        &["theor", "framework", "concept"],
        ClassStyle::new("#ede9fe", "#7c3aed", "#4c1d95", "font-weight:bold"),
    ),
    (
        "analysis",
        &["analys", "analyz", "analyt"],
        ClassStyle::new("#cffafe", "#0891b2", "#164e63", "font-weight:bold"),
    ),
    (
        "synthesis",
        &["synthes", "integration"],
        ClassStyle::new("#ffe4e6", "#e11d48", "#881337", "font-weight:bold"),
    ),
    (
        "evaluation",
        &["evaluat", "assessment", "benchmark"],
        ClassStyle::new("#fef9c3", "#ca8a04", "#713f12", "font-weight:bold"),
    ),
];

const SUMMARY_STEMS: &[&str] = &["summar", "abstract", "overview", "tldr", "tl;dr"];

fn label_words(label: &str) -> Vec<String> {
    label
        .split(|c: char| !(c.is_alphanumeric() || c == ';'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches_stems(words: &[String], lowered: &str, stems: &[&str]) -> bool {
    stems.iter().any(|stem| {
        if stem.contains(' ') {
            lowered.contains(stem)
        } else {
            words.iter().any(|w| w.starts_with(stem))
        }
    })
}

pub(crate) fn is_summary_label(label: &str) -> bool {
    let lowered = label.to_lowercase();
    matches_stems(&label_words(label), &lowered, SUMMARY_STEMS)
}

/// The content class a branch label maps to, if any.
pub(crate) fn semantic_class_for(label: &str) -> Option<&'static str> {
    let words = label_words(label);
    let lowered = label.to_lowercase();
    SEMANTIC_CLASSES
        .iter()
        .find(|(_, stems, _)| matches_stems(&words, &lowered, stems))
        .map(|(name, _, _)| *name)
}

pub(crate) fn style_for(name: &str) -> ClassStyle {
    match name {
        "root" => return ROOT,
        "summary" => return SUMMARY,
        "summaryDetail" => return SUMMARY_DETAIL,
        _ => {}
    }
    if let Some((_, _, style)) = SEMANTIC_CLASSES.iter().find(|(n, _, _)| *n == name) {
        return *style;
    }
    match parse_branch_class(name) {
        Some((family, n)) => family.style(n),
        None => NEUTRAL,
    }
}

/// Grayscale tier used when re-theming existing definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MonoTier {
    Root,
    Top,
    Middle,
    Low,
}

impl MonoTier {
    pub fn of(name: &str) -> Self {
        let name = name.split(',').next().unwrap_or(name).trim();
        match name {
            "root" => return Self::Root,
            "summary" => return Self::Top,
            "summaryDetail" => return Self::Middle,
            _ => {}
        }
        if SEMANTIC_CLASSES.iter().any(|(n, _, _)| *n == name) {
            return Self::Top;
        }
        match parse_branch_class(name) {
            Some((BranchFamily::Branch, _)) => Self::Top,
            Some((BranchFamily::SubBranch, _)) => Self::Middle,
            _ => Self::Low,
        }
    }

    /// `(fill, stroke, color)`
    pub fn colors(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Root => ("#000000", "#000000", "#ffffff"),
            Self::Top => ("#333333", "#000000", "#ffffff"),
            Self::Middle => ("#d9d9d9", "#333333", "#000000"),
            Self::Low => ("#ffffff", "#666666", "#000000"),
        }
    }
}
