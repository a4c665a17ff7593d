//! Case-insensitive keyword filter over candidate titles.

use regex::{Regex, RegexBuilder};

use super::VideoCandidate;

/// Matches a title if it contains any keyword, ignoring case.
/// Built once per source from its keyword list; no keywords means match everything.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    pattern: Option<Regex>,
}

impl KeywordFilter {
    pub fn new(keywords: &[String]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn matches(&self, title: &str) -> bool {
        self.pattern.as_ref().map_or(true, |p| p.is_match(title))
    }

    /// Keep only matching candidates, preserving order.
    pub fn apply(&self, candidates: Vec<VideoCandidate>) -> Vec<VideoCandidate> {
        if self.is_empty() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|c| self.matches(&c.title))
            .collect()
    }
}
