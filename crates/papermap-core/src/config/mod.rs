use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

/// How much of the generated hierarchy survives, and how aggressively leaves are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Simple,
    #[default]
    Detailed,
    Advanced,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [Self::Simple, Self::Detailed, Self::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "detailed" => Ok(Self::Detailed),
            "advanced" => Ok(Self::Advanced),
            _ => Err(Error::UnknownDetailLevel {
                value: s.to_string(),
            }),
        }
    }
}

/// Maximum rendered depth per detail level.
///
/// Depth is counted the way the rendered text indents it: the root is depth 1, its children
/// depth 2, and so on. A limit of 3 keeps the root and two levels beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepthLimits {
    pub simple: usize,
    pub detailed: usize,
    pub advanced: usize,
}

impl Default for DepthLimits {
    fn default() -> Self {
        Self {
            simple: 3,
            detailed: 5,
            advanced: 10,
        }
    }
}

impl DepthLimits {
    pub fn for_level(&self, level: DetailLevel) -> usize {
        match level {
            DetailLevel::Simple => self.simple,
            DetailLevel::Detailed => self.detailed,
            DetailLevel::Advanced => self.advanced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpansionConfig {
    /// Children synthesized under each bare leaf at the `detailed` level.
    pub detailed_children: usize,
    /// Children synthesized under each bare leaf at the `advanced` level.
    pub advanced_children: usize,
    /// Grandchildren synthesized under the first synthesized child at the `advanced` level.
    pub advanced_grandchildren: usize,
    pub max_keywords: usize,
    pub min_keyword_len: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            detailed_children: 2,
            advanced_children: 3,
            advanced_grandchildren: 2,
            max_keywords: 4,
            min_keyword_len: 3,
        }
    }
}

impl ExpansionConfig {
    /// Returns `(children, grandchildren)` for a detail level.
    pub fn counts_for(&self, level: DetailLevel) -> (usize, usize) {
        match level {
            DetailLevel::Simple => (0, 0),
            DetailLevel::Detailed => (self.detailed_children, 0),
            DetailLevel::Advanced => (self.advanced_children, self.advanced_grandchildren),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub depth: DepthLimits,
    pub expansion: ExpansionConfig,
    /// Label of the root synthesized when the input has none, and of the fallback diagram.
    pub default_root_label: String,
    /// Labels wider than this (in terminal columns) are truncated with an ellipsis.
    pub max_label_width: usize,
    pub max_input_bytes: usize,
    /// Characters of document text embedded in generation prompts.
    pub prompt_char_budget: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            depth: DepthLimits::default(),
            expansion: ExpansionConfig::default(),
            default_root_label: "Document".to_string(),
            max_label_width: 80,
            max_input_bytes: 1024 * 1024,
            prompt_char_budget: 12_000,
        }
    }
}

impl PipelineConfig {
    pub fn max_depth(&self, level: DetailLevel) -> usize {
        self.depth.for_level(level)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.depth;
        if d.simple == 0 || d.detailed == 0 || d.advanced == 0 {
            return Err(invalid("depth limits must be at least 1"));
        }
        if d.simple > d.detailed || d.detailed > d.advanced {
            return Err(invalid(
                "depth limits must not decrease from simple to detailed to advanced",
            ));
        }
        let e = &self.expansion;
        if e.detailed_children == 0 || e.advanced_children == 0 {
            return Err(invalid("expansion child counts must be at least 1"));
        }
        if e.max_keywords == 0 {
            return Err(invalid("expansion.max_keywords must be at least 1"));
        }
        if self.default_root_label.trim().is_empty() {
            return Err(invalid("default_root_label must not be empty"));
        }
        if self.max_label_width < 8 {
            return Err(invalid("max_label_width must be at least 8"));
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| Error::InvalidConfigJson {
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json5_str(text: &str) -> Result<Self> {
        let cfg: Self = json5::from_str(text).map_err(|e| Error::InvalidConfigJson {
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text).map_err(|e| Error::InvalidConfigYaml {
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads a config file, picking the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let parse: fn(&str) -> Result<Self> = match ext.as_deref() {
            Some("json") => Self::from_json_str,
            Some("json5") => Self::from_json5_str,
            Some("yaml" | "yml") => Self::from_yaml_str,
            _ => return Err(Error::UnsupportedConfigFormat { path: display }),
        };
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: display,
            source,
        })?;
        parse(&text)
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfig {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_detail_levels_to_depths() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.max_depth(DetailLevel::Simple), 3);
        assert_eq!(cfg.max_depth(DetailLevel::Detailed), 5);
        assert_eq!(cfg.max_depth(DetailLevel::Advanced), 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn expansion_counts_follow_detail_level() {
        let e = ExpansionConfig::default();
        assert_eq!(e.counts_for(DetailLevel::Simple), (0, 0));
        assert_eq!(e.counts_for(DetailLevel::Detailed), (2, 0));
        assert_eq!(e.counts_for(DetailLevel::Advanced), (3, 2));
    }

    #[test]
    fn detail_level_parses_case_insensitively() {
        assert_eq!(
            "Advanced".parse::<DetailLevel>().unwrap(),
            DetailLevel::Advanced
        );
        assert_eq!(" simple ".parse::<DetailLevel>().unwrap(), DetailLevel::Simple);
        let err = "verbose".parse::<DetailLevel>().unwrap_err();
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = PipelineConfig::from_yaml_str("depth:\n  simple: 2\ndefault_root_label: Paper\n")
            .unwrap();
        assert_eq!(cfg.depth.simple, 2);
        assert_eq!(cfg.depth.detailed, 5);
        assert_eq!(cfg.default_root_label, "Paper");
        assert_eq!(cfg.expansion, ExpansionConfig::default());
    }

    #[test]
    fn json_and_json5_loaders_agree() {
        let a = PipelineConfig::from_json_str(r#"{"expansion": {"detailed_children": 4}}"#)
            .unwrap();
        let b = PipelineConfig::from_json5_str("{expansion: {detailed_children: 4,},}").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.expansion.detailed_children, 4);
    }

    #[test]
    fn zero_depth_limit_is_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"depth": {"simple": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn decreasing_depth_limits_are_rejected() {
        let err = PipelineConfig::from_yaml_str("depth:\n  detailed: 12\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"colour": "red"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigJson { .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let err = PipelineConfig::from_path("does-not-exist.toml").unwrap_err();
        assert!(matches!(err, Error::UnsupportedConfigFormat { .. }));
    }
}
