// src/relevance.rs
//! Keyword scoring and blacklist rules for digest candidates.

use crate::config::RelevanceSection;

/// Compiled form of the `[relevance]` config section: terms lowercased once
/// so per-entry checks stay allocation-light.
#[derive(Debug, Clone)]
pub struct RelevanceRules {
    weight: u32,
    keywords: Vec<String>,
    blacklist: Vec<String>,
}

impl RelevanceRules {
    pub fn new(weight: u32, keywords: &[String], blacklist: &[String]) -> Self {
        Self {
            weight,
            keywords: lower_nonempty(keywords),
            blacklist: lower_nonempty(blacklist),
        }
    }

    pub fn from_config(cfg: &RelevanceSection) -> Self {
        Self::new(cfg.keyword_weight, &cfg.keywords, &cfg.blacklist)
    }

    /// `weight × number of keywords contained in the lowercased title`.
    ///
    /// Matching is plain substring containment, each keyword counted
    /// independently ("ai" matches inside "again"). Deterministic for a
    /// given title and keyword set.
    pub fn score(&self, title: &str) -> u32 {
        let lower = title.to_lowercase();
        let hits = self.keywords.iter().filter(|k| lower.contains(k.as_str())).count();
        self.weight * hits as u32
    }

    /// Case-insensitive substring test against both the title and the link.
    pub fn is_blacklisted(&self, title: &str, link: &str) -> bool {
        if self.blacklist.is_empty() {
            return false;
        }
        let title = title.to_lowercase();
        let link = link.to_lowercase();
        self.blacklist
            .iter()
            .any(|term| title.contains(term.as_str()) || link.contains(term.as_str()))
    }
}

fn lower_nonempty(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
