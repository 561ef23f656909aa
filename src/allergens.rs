// ABOUTME: Allergen detection for parsed meals against the user's allergy list
// ABOUTME: Keyword (direct) and contextual matches from a JSON allergen map, deduplicated by trigger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Allergen warnings.
//!
//! The allergen map associates each allergen with `keywords` (foods that
//! directly contain it) and `also_check` terms (dishes that commonly
//! contain it). Parsed food mentions are checked against keywords; the raw
//! meal text is checked against the contextual terms. Warnings are
//! deduplicated per (allergen, trigger) pair and sorted most severe first.
//!
//! This check is advisory: it annotates an analysis result. The hard
//! allergen *filter* in the meal planner is separate and never relaxed.

use crate::models::FoodMention;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Severity of an allergen warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Anaphylaxis-grade allergens
    High,
    /// Typical intolerance triggers
    #[default]
    Moderate,
    /// Trace or unlikely triggers
    Low,
}

/// One allergen's trigger terms in the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergenEntry {
    /// Foods that directly contain the allergen
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Dishes that commonly contain the allergen (contextual match)
    #[serde(default)]
    pub also_check: Vec<String>,
    /// Warning severity
    #[serde(default)]
    pub severity: Severity,
}

/// How a warning was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// A parsed food name contained a keyword
    Keyword,
    /// The raw meal text contained an `also_check` term
    Contextual,
}

/// One allergen warning attached to an analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergenWarning {
    /// Allergen from the user's profile (lowercased)
    pub allergen: String,
    /// Term that triggered the warning
    pub trigger: String,
    /// Direct or contextual match
    pub match_kind: MatchKind,
    /// Warning severity
    pub severity: Severity,
    /// Renderable message
    pub message: String,
}

/// Allergen map keyed by lowercased allergen name
#[derive(Debug, Clone, Default)]
pub struct AllergenMap {
    entries: HashMap<String, AllergenEntry>,
}

impl AllergenMap {
    /// Build from explicit entries
    #[must_use]
    pub fn new(entries: HashMap<String, AllergenEntry>) -> Self {
        Self { entries }
    }

    /// Load from a JSON file; missing or malformed files yield an empty map
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let entries = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { entries }
    }

    /// Whether the map has any entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check parsed mentions and the raw meal text against the user's
    /// allergies. Returns warnings sorted most severe first; empty when the
    /// user has no allergies or nothing matches.
    #[must_use]
    pub fn check_meal(
        &self,
        mentions: &[FoodMention],
        raw_text: &str,
        user_allergies: &[String],
    ) -> Vec<AllergenWarning> {
        if user_allergies.is_empty() || self.entries.is_empty() {
            return Vec::new();
        }

        let raw_lower = raw_text.to_lowercase();
        let mut warnings = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for allergen in user_allergies {
            let allergen_lower = allergen.to_lowercase();
            let Some(entry) = self.entries.get(&allergen_lower) else {
                continue;
            };

            for keyword in &entry.keywords {
                let keyword_lower = keyword.to_lowercase();
                let hit = mentions
                    .iter()
                    .any(|m| m.name.to_lowercase().contains(&keyword_lower));
                if hit && seen.insert((allergen_lower.clone(), keyword_lower.clone())) {
                    warnings.push(AllergenWarning {
                        allergen: allergen_lower.clone(),
                        trigger: keyword.clone(),
                        match_kind: MatchKind::Keyword,
                        severity: entry.severity,
                        message: format!("ALLERGY WARNING: {keyword} contains {allergen_lower}"),
                    });
                }
            }

            for term in &entry.also_check {
                let term_lower = term.to_lowercase();
                if raw_lower.contains(&term_lower)
                    && seen.insert((allergen_lower.clone(), term_lower.clone()))
                {
                    warnings.push(AllergenWarning {
                        allergen: allergen_lower.clone(),
                        trigger: term.clone(),
                        match_kind: MatchKind::Contextual,
                        severity: entry.severity,
                        message: format!(
                            "ALLERGY WARNING: {term} may contain {allergen_lower}"
                        ),
                    });
                }
            }
        }

        warnings.sort_by_key(|w| w.severity);
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuantityUnit;

    fn map() -> AllergenMap {
        let mut entries = HashMap::new();
        entries.insert(
            "peanut".to_owned(),
            AllergenEntry {
                keywords: vec!["peanut".to_owned(), "peanut butter".to_owned()],
                also_check: vec!["pad thai".to_owned()],
                severity: Severity::High,
            },
        );
        entries.insert(
            "dairy".to_owned(),
            AllergenEntry {
                keywords: vec!["milk".to_owned(), "cheese".to_owned()],
                also_check: Vec::new(),
                severity: Severity::Moderate,
            },
        );
        AllergenMap::new(entries)
    }

    fn mention(name: &str) -> FoodMention {
        FoodMention::new(name, 1.0, QuantityUnit::Servings)
    }

    #[test]
    fn test_keyword_match_on_mentions() {
        let warnings = map().check_meal(
            &[mention("peanut butter")],
            "toast with peanut butter",
            &["peanut".to_owned()],
        );
        assert!(!warnings.is_empty());
        assert_eq!(warnings[0].match_kind, MatchKind::Keyword);
        assert_eq!(warnings[0].allergen, "peanut");
    }

    #[test]
    fn test_contextual_match_on_raw_text() {
        let warnings = map().check_meal(&[], "pad thai for dinner", &["peanut".to_owned()]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].match_kind, MatchKind::Contextual);
        assert!(warnings[0].message.contains("may contain"));
    }

    #[test]
    fn test_no_allergies_no_warnings() {
        assert!(map().check_meal(&[mention("peanut")], "peanut", &[]).is_empty());
    }

    #[test]
    fn test_duplicate_triggers_deduplicated() {
        let warnings = map().check_meal(
            &[mention("peanut"), mention("peanut")],
            "peanut peanut",
            &["peanut".to_owned()],
        );
        let peanut_keyword_hits = warnings
            .iter()
            .filter(|w| w.trigger == "peanut" && w.match_kind == MatchKind::Keyword)
            .count();
        assert_eq!(peanut_keyword_hits, 1);
    }

    #[test]
    fn test_sorted_most_severe_first() {
        let warnings = map().check_meal(
            &[mention("cheese"), mention("peanut")],
            "cheese and peanut",
            &["dairy".to_owned(), "peanut".to_owned()],
        );
        assert!(warnings.len() >= 2);
        assert_eq!(warnings[0].severity, Severity::High);
    }
}
