// ABOUTME: Free-text food parser producing ordered, non-overlapping food mentions
// ABOUTME: Two-pass phrase/keyword scan with a bounded-window quantity/unit pattern cascade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Food-text parsing.
//!
//! [`MealTextParser`] turns free text ("200g chicken breast and a cup of
//! rice for lunch") into structured [`FoodMention`]s. Matching runs in two
//! passes over the lowercased text, multi-word phrases first and single
//! keywords second, so a phrase match always pre-empts a keyword it
//! overlaps.
//! Every accepted match claims its span; later matches overlapping a
//! claimed span are rejected, which keeps mention spans pairwise disjoint.
//!
//! Quantity extraction looks only at a bounded trailing window of the text
//! preceding a match, so a quantity attached to an earlier, unrelated food
//! ("200g chicken breast and ... rice") never bleeds into a later one.
//!
//! Parsing never fails: unknown foods are silently omitted and unmatched
//! input yields an empty vector.

use crate::lexicon::{self, FoodLexicon, WORD_NUMBERS};
use crate::models::{FoodMention, MealSlot, QuantityUnit};
use regex::Regex;

/// How many characters of preceding text quantity extraction may inspect
const QUANTITY_WINDOW_CHARS: usize = 40;

/// Compiled quantity/unit extraction patterns, ordered by priority
struct QuantityPatterns {
    /// "200g" / "200 grams" trailing the window
    number_grams: Regex,
    /// "3 oz " trailing the window
    number_ounces: Regex,
    /// "2 cups of " / "3 slices of " trailing the window
    number_pieces: Regex,
    /// "2 servings of " trailing the window
    number_servings: Regex,
    /// Number with gram unit attached to the food token itself
    attached_grams: Regex,
    /// "a cup of " / "two slices of ": word-number plus unit phrase
    word_with_unit: Regex,
    /// Bare trailing number: "2 "
    bare_number: Regex,
    /// Bare trailing word-number: "two ", "half an "
    bare_word: Regex,
}

impl QuantityPatterns {
    #[allow(clippy::expect_used)] // Safe: patterns are static literals exercised by unit tests
    fn compile() -> Self {
        // Longest-first so e.g. "an" is never shadowed by "a".
        let mut words: Vec<&str> = WORD_NUMBERS.iter().map(|(w, _)| *w).collect();
        words.sort_by_key(|w| std::cmp::Reverse(w.len()));
        let word_alt = words.join("|");

        let compile = |pattern: &str| Regex::new(pattern).expect("static pattern");
        Self {
            number_grams: compile(r"(\d+(?:\.\d+)?)\s*(?:grams?|g)\s*$"),
            number_ounces: compile(r"(\d+(?:\.\d+)?)\s*(?:ounces?|oz)\s+$"),
            number_pieces: compile(
                r"(\d+(?:\.\d+)?)\s*(?:pieces?|slices?|cups?|bowls?|glasses?|tablespoons?|tbsp)\s+(?:of\s+)?$",
            ),
            number_servings: compile(r"(\d+(?:\.\d+)?)\s*(?:servings?)\s+(?:of\s+)?$"),
            attached_grams: compile(r"^(\d+(?:\.\d+)?)\s*(?:grams?|g)\b"),
            word_with_unit: compile(&format!(
                r"(?:^|\s)({word_alt})\s+(?:an?\s+)?(pieces?|slices?|cups?|bowls?|glasses?|servings?)\s+(?:of\s+)?$"
            )),
            bare_number: compile(r"(\d+(?:\.\d+)?)\s*$"),
            bare_word: compile(&format!(r"(?:^|\s)({word_alt})\s+(?:an?\s+)?$")),
        }
    }
}

/// Parser converting free text into [`FoodMention`]s against a fixed,
/// curated vocabulary.
pub struct MealTextParser {
    lexicon: FoodLexicon,
    patterns: QuantityPatterns,
    meal_slot: Regex,
    clock_hm: Regex,
    clock_h: Regex,
}

impl Default for MealTextParser {
    fn default() -> Self {
        Self::new(FoodLexicon::curated())
    }
}

impl MealTextParser {
    /// Create a parser over the given vocabulary
    #[allow(clippy::expect_used)] // Safe: patterns are static literals exercised by unit tests
    #[must_use]
    pub fn new(lexicon: FoodLexicon) -> Self {
        Self {
            lexicon,
            patterns: QuantityPatterns::compile(),
            meal_slot: Regex::new(r"\b(breakfast|lunch|dinner|snack)\b").expect("static pattern"),
            clock_hm: Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(am|pm)").expect("static pattern"),
            clock_h: Regex::new(r"(?i)(\d{1,2})\s*(am|pm)").expect("static pattern"),
        }
    }

    /// The vocabulary this parser matches against
    #[must_use]
    pub fn lexicon(&self) -> &FoodLexicon {
        &self.lexicon
    }

    /// Parse free text into ordered, non-overlapping food mentions.
    ///
    /// Never fails; unknown foods are omitted and unmatched input yields
    /// an empty vector.
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<FoodMention> {
        let lowered = text.to_lowercase();
        let mut mentions = Vec::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        // Phrases first: a phrase match always wins over an overlapping
        // keyword found in the later pass.
        for entry in self.lexicon.phrases() {
            self.scan_entry(&lowered, entry, &mut mentions, &mut claimed);
        }
        for entry in self.lexicon.keywords() {
            self.scan_entry(&lowered, entry, &mut mentions, &mut claimed);
        }

        mentions
    }

    /// Extract the meal slot named in the text, defaulting to [`MealSlot::Meal`]
    #[must_use]
    pub fn meal_slot_of(&self, text: &str) -> MealSlot {
        let lowered = text.to_lowercase();
        let slot = self
            .meal_slot
            .captures(&lowered)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_owned());
        match slot.as_deref() {
            Some("breakfast") => MealSlot::Breakfast,
            Some("lunch") => MealSlot::Lunch,
            Some("dinner") => MealSlot::Dinner,
            Some("snack") => MealSlot::Snack,
            _ => MealSlot::Meal,
        }
    }

    /// Extract a clock time ("2:30 PM", "9 am") normalized to "H:MM AM/PM"
    #[must_use]
    pub fn time_of(&self, text: &str) -> Option<String> {
        if let Some(caps) = self.clock_hm.captures(text) {
            let hour = caps.get(1)?.as_str();
            let minute = caps.get(2)?.as_str();
            let period = caps.get(3)?.as_str().to_uppercase();
            return Some(format!("{hour}:{minute} {period}"));
        }
        if let Some(caps) = self.clock_h.captures(text) {
            let hour = caps.get(1)?.as_str();
            let period = caps.get(2)?.as_str().to_uppercase();
            return Some(format!("{hour}:00 {period}"));
        }
        None
    }

    /// Scan all occurrences of one vocabulary entry, accepting those whose
    /// span does not overlap an already-claimed span.
    fn scan_entry(
        &self,
        lowered: &str,
        entry: &str,
        mentions: &mut Vec<FoodMention>,
        claimed: &mut Vec<(usize, usize)>,
    ) {
        for (start, matched) in lowered.match_indices(entry) {
            let end = start + matched.len();
            if overlaps(claimed, start, end) {
                continue;
            }
            let (quantity, unit) = self.extract_quantity(&lowered[..start], entry);
            mentions.push(FoodMention::new(entry, quantity, unit));
            claimed.push((start, end));
        }
    }

    /// Apply the quantity/unit pattern cascade to the bounded trailing
    /// window of text preceding a food match.
    ///
    /// Priority order: explicit number + unit, digit-attached number on the
    /// food token, word-number + unit phrase, bare trailing number, bare
    /// trailing word-number; otherwise one serving.
    fn extract_quantity(&self, before: &str, food_text: &str) -> (f64, QuantityUnit) {
        let nearby = trailing_window(before, QUANTITY_WINDOW_CHARS);
        let p = &self.patterns;

        // 1. Explicit number + unit ("200g", "3 oz ", "2 cups of ")
        for (pattern, unit) in [
            (&p.number_grams, QuantityUnit::Grams),
            (&p.number_ounces, QuantityUnit::Ounces),
            (&p.number_pieces, QuantityUnit::Pieces),
            (&p.number_servings, QuantityUnit::Servings),
        ] {
            if let Some(qty) = capture_number(pattern, nearby) {
                return (qty, unit);
            }
        }

        // 2. Number with a gram unit attached to the food token itself
        if let Some(qty) = capture_number(&p.attached_grams, food_text) {
            return (qty, QuantityUnit::Grams);
        }

        // 3. Word-number + unit phrase ("a cup of", "two slices of")
        if let Some(caps) = p.word_with_unit.captures(nearby) {
            let value = caps
                .get(1)
                .and_then(|m| lexicon::word_number(m.as_str()))
                .unwrap_or(1.0);
            let unit = caps
                .get(2)
                .and_then(|m| lexicon::unit_for(m.as_str()))
                .unwrap_or(QuantityUnit::Servings);
            return (value, unit);
        }

        // 4. Bare trailing number ("2 eggs")
        if let Some(qty) = capture_number(&p.bare_number, nearby) {
            return (qty, QuantityUnit::Servings);
        }

        // 5. Bare trailing word-number ("two eggs", "half an avocado")
        if let Some(caps) = p.bare_word.captures(nearby) {
            if let Some(value) = caps.get(1).and_then(|m| lexicon::word_number(m.as_str())) {
                return (value, QuantityUnit::Servings);
            }
        }

        (1.0, QuantityUnit::Servings)
    }
}

/// Last `max_chars` characters of `text`, respecting char boundaries
fn trailing_window(text: &str, max_chars: usize) -> &str {
    let mut start = text.len().saturating_sub(max_chars);
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Whether `[start, end)` overlaps any claimed span
fn overlaps(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
    claimed.iter().any(|&(s, e)| start < e && end > s)
}

/// First capture group of `pattern` in `text`, parsed as f64
fn capture_number(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> MealTextParser {
        MealTextParser::default()
    }

    #[test]
    fn test_multi_word_phrase_wins_over_keyword() {
        let mentions = parser().parse("I had chicken breast for lunch");
        let names: Vec<_> = mentions.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"chicken breast"));
        // The bare "chicken" keyword must not also fire on the same span.
        assert!(!names.contains(&"chicken"));
    }

    #[test]
    fn test_quantity_grams() {
        let mentions = parser().parse("200g chicken breast");
        assert_eq!(mentions.len(), 1);
        assert!((mentions[0].quantity - 200.0).abs() < f64::EPSILON);
        assert_eq!(mentions[0].unit, QuantityUnit::Grams);
    }

    #[test]
    fn test_quantity_ounces() {
        let mentions = parser().parse("3 oz salmon fillet");
        assert_eq!(mentions.len(), 1);
        assert!((mentions[0].quantity - 3.0).abs() < f64::EPSILON);
        assert_eq!(mentions[0].unit, QuantityUnit::Ounces);
    }

    #[test]
    fn test_a_cup_of_rice() {
        let mentions = parser().parse("a cup of rice");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].name, "rice");
        assert!((mentions[0].quantity - 1.0).abs() < f64::EPSILON);
        assert_eq!(mentions[0].unit, QuantityUnit::Pieces);
    }

    #[test]
    fn test_half_an_avocado() {
        let mentions = parser().parse("half an avocado");
        assert_eq!(mentions.len(), 1);
        assert!((mentions[0].quantity - 0.5).abs() < f64::EPSILON);
        assert_eq!(mentions[0].unit, QuantityUnit::Servings);
    }

    #[test]
    fn test_bare_number() {
        let mentions = parser().parse("2 eggs and toast");
        let egg = mentions.iter().find(|m| m.name.starts_with("egg")).unwrap();
        assert!((egg.quantity - 2.0).abs() < f64::EPSILON);
        assert_eq!(egg.unit, QuantityUnit::Servings);
    }

    #[test]
    fn test_quantity_window_does_not_bleed_across_items() {
        // "200g" belongs to the chicken; rice gets the "a cup of".
        let mentions = parser().parse("200g chicken breast and a cup of rice");
        let rice = mentions.iter().find(|m| m.name == "rice").unwrap();
        assert!((rice.quantity - 1.0).abs() < f64::EPSILON);
        assert_eq!(rice.unit, QuantityUnit::Pieces);
    }

    #[test]
    fn test_unknown_input_yields_empty() {
        assert!(parser().parse("xylophone quartz").is_empty());
        assert!(parser().parse("").is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "two eggs, 200g chicken breast and a cup of rice for lunch";
        let p = parser();
        assert_eq!(p.parse(text), p.parse(text));
    }

    #[test]
    fn test_meal_slot_extraction() {
        let p = parser();
        assert_eq!(p.meal_slot_of("eggs for breakfast"), MealSlot::Breakfast);
        assert_eq!(p.meal_slot_of("LUNCH at noon"), MealSlot::Lunch);
        assert_eq!(p.meal_slot_of("dinner time"), MealSlot::Dinner);
        assert_eq!(p.meal_slot_of("a quick snack"), MealSlot::Snack);
        assert_eq!(p.meal_slot_of("just food"), MealSlot::Meal);
    }

    #[test]
    fn test_time_extraction() {
        let p = parser();
        assert_eq!(p.time_of("lunch at 2:30 PM"), Some("2:30 PM".to_owned()));
        assert_eq!(p.time_of("breakfast at 9 am"), Some("9:00 AM".to_owned()));
        assert_eq!(p.time_of("no time here"), None);
    }

    #[test]
    fn test_word_number_with_unit() {
        let mentions = parser().parse("two slices of bread");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].name, "bread");
        assert!((mentions[0].quantity - 2.0).abs() < f64::EPSILON);
        assert_eq!(mentions[0].unit, QuantityUnit::Pieces);
    }
}
