//! Keyword extraction for synthesized detail nodes.

use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashMap;

/// Picks the words of a node label that synthesized children should talk about.
///
/// Implementations must be deterministic: the same label always yields the same keywords.
pub trait KeywordExtractor: Send + Sync {
    fn extract_keywords(&self, label: &str) -> Vec<String>;
}

impl<F> KeywordExtractor for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn extract_keywords(&self, label: &str) -> Vec<String> {
        self(label)
    }
}

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "among", "and", "any", "are",
    "based", "been", "before", "being", "between", "both", "but", "can", "could", "does",
    "during", "each", "for", "from", "further", "had", "has", "have", "her", "his", "how",
    "into", "its", "key", "main", "may", "more", "most", "not", "onto", "other", "our", "over",
    "own", "part", "per", "same", "should", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "under", "upon",
    "using", "very", "via", "was", "were", "what", "when", "where", "which", "while", "who",
    "why", "will", "with", "within", "without", "would", "yet", "you", "your",
];

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Alphabetic}+(?:['’-]\p{Alphabetic}+)*").expect("valid regex"))
}

/// Regex tokenizer with stop-word filtering.
///
/// Ranking: more frequent words first, then capitalized words, then earlier words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicKeywords {
    pub max_keywords: usize,
    pub min_len: usize,
}

impl Default for HeuristicKeywords {
    fn default() -> Self {
        Self {
            max_keywords: 4,
            min_len: 3,
        }
    }
}

impl HeuristicKeywords {
    pub fn new(max_keywords: usize, min_len: usize) -> Self {
        Self {
            max_keywords,
            min_len,
        }
    }
}

struct Candidate<'a> {
    word: &'a str,
    count: usize,
    capitalized: bool,
    first: usize,
}

impl KeywordExtractor for HeuristicKeywords {
    fn extract_keywords(&self, label: &str) -> Vec<String> {
        let mut candidates: Vec<Candidate<'_>> = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();

        for (pos, m) in word_re().find_iter(label).enumerate() {
            let word = m.as_str();
            if word.chars().count() < self.min_len {
                continue;
            }
            let lowered = word.to_lowercase();
            if STOP_WORDS.binary_search(&lowered.as_str()).is_ok() {
                continue;
            }
            match index.get(&lowered) {
                Some(&i) => candidates[i].count += 1,
                None => {
                    index.insert(lowered, candidates.len());
                    candidates.push(Candidate {
                        word,
                        count: 1,
                        capitalized: word.chars().next().is_some_and(char::is_uppercase),
                        first: pos,
                    });
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(b.capitalized.cmp(&a.capitalized))
                .then(a.first.cmp(&b.first))
        });
        candidates
            .into_iter()
            .take(self.max_keywords)
            .map(|c| c.word.to_string())
            .collect()
    }
}
