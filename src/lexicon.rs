// ABOUTME: Unit/quantity lexicon and curated food vocabulary for the text parser
// ABOUTME: Word-number table, unit synonyms, and phrase/keyword lists as an injected value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Static lexicon tables backing the food-text parser.
//!
//! The lexicon is an explicitly constructed value injected into
//! [`crate::parser::MealTextParser`]; there is no module-level singleton.
//! `FoodLexicon::curated()` builds the fixed vocabulary the engine ships
//! with; tests construct smaller lexicons directly.

use crate::models::QuantityUnit;

/// Spelled-out quantities recognized before a food token
pub const WORD_NUMBERS: &[(&str, f64)] = &[
    ("a", 1.0),
    ("an", 1.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("half", 0.5),
    ("quarter", 0.25),
    ("some", 1.0),
    ("couple", 2.0),
];

/// Unit words grouped by the [`QuantityUnit`] they map to.
///
/// Piece-equivalents cover counted items and household volumes; both scale
/// a record's per-serving values by the raw count.
pub const UNIT_SYNONYMS: &[(&str, QuantityUnit)] = &[
    ("g", QuantityUnit::Grams),
    ("gram", QuantityUnit::Grams),
    ("grams", QuantityUnit::Grams),
    ("oz", QuantityUnit::Ounces),
    ("ounce", QuantityUnit::Ounces),
    ("ounces", QuantityUnit::Ounces),
    ("piece", QuantityUnit::Pieces),
    ("pieces", QuantityUnit::Pieces),
    ("slice", QuantityUnit::Pieces),
    ("slices", QuantityUnit::Pieces),
    ("cup", QuantityUnit::Pieces),
    ("cups", QuantityUnit::Pieces),
    ("bowl", QuantityUnit::Pieces),
    ("bowls", QuantityUnit::Pieces),
    ("glass", QuantityUnit::Pieces),
    ("glasses", QuantityUnit::Pieces),
    ("tablespoon", QuantityUnit::Pieces),
    ("tablespoons", QuantityUnit::Pieces),
    ("tbsp", QuantityUnit::Pieces),
    ("serving", QuantityUnit::Servings),
    ("servings", QuantityUnit::Servings),
];

/// Beverage keywords counted for hydration tracking (whole-word match)
pub const BEVERAGE_KEYWORDS: &[&str] = &[
    "water",
    "coffee",
    "tea",
    "soda",
    "juice",
    "smoothie",
    "beer",
    "wine",
    "milk",
    "lemonade",
    "sparkling",
];

/// Curated multi-word food phrases, checked before single keywords so a
/// phrase match pre-empts any keyword it overlaps.
const FOOD_PHRASES: &[&str] = &[
    "chicken breast",
    "chicken nugget",
    "chicken tender",
    "chicken wing",
    "ground beef",
    "beef patty",
    "ribeye steak",
    "sirloin steak",
    "salmon fillet",
    "tuna steak",
    "white rice",
    "brown rice",
    "fried rice",
    "wheat bread",
    "whole wheat bread",
    "mashed potato",
    "french fries",
    "greek yogurt",
    "cottage cheese",
    "cheddar cheese",
    "blue cheese",
    "almond milk",
    "soy milk",
    "oat milk",
    "peanut butter",
    "almond butter",
    "apple pie",
    "fruit salad",
];

/// Curated single food keywords, checked after phrases
const FOOD_KEYWORDS: &[&str] = &[
    "chicken", "beef", "fish", "salmon", "tuna", "steak", "pork", "rice", "pasta", "bread",
    "potato", "fries", "pizza", "salad", "vegetables", "broccoli", "spinach", "peas", "corn",
    "egg", "eggs", "yogurt", "milk", "cheese", "butter", "avocado", "nuts", "almonds", "peanuts",
    "cashews", "burger", "sandwich", "taco", "wrap", "coffee", "tea", "soda", "juice", "nugget",
    "cake", "cookie", "chips", "apple", "banana", "orange", "berries", "fruit", "oatmeal",
];

/// The parser's food vocabulary: multi-word phrases plus single keywords.
#[derive(Debug, Clone)]
pub struct FoodLexicon {
    phrases: Vec<String>,
    keywords: Vec<String>,
}

impl FoodLexicon {
    /// Build a lexicon from explicit phrase and keyword lists.
    ///
    /// Entries are lowercased; empty entries are dropped. Which list an
    /// entry lands in decides its scan pass, not its word count; callers
    /// normally put multi-word entries in `phrases`.
    #[must_use]
    pub fn new<P, K>(phrases: P, keywords: K) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let normalize = |entry: &str| {
            let lowered = entry.trim().to_lowercase();
            (!lowered.is_empty()).then_some(lowered)
        };
        Self {
            phrases: phrases
                .into_iter()
                .filter_map(|p| normalize(p.as_ref()))
                .collect(),
            keywords: keywords
                .into_iter()
                .filter_map(|k| normalize(k.as_ref()))
                .collect(),
        }
    }

    /// The fixed vocabulary the engine ships with
    #[must_use]
    pub fn curated() -> Self {
        Self::new(FOOD_PHRASES.iter().copied(), FOOD_KEYWORDS.iter().copied())
    }

    /// Multi-word phrases, scanned in the first pass
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Single keywords, scanned in the second pass
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Total vocabulary size
    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len() + self.keywords.len()
    }

    /// Whether the vocabulary is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.keywords.is_empty()
    }
}

impl Default for FoodLexicon {
    fn default() -> Self {
        Self::curated()
    }
}

/// Look up a word-number, returning its numeric value
#[must_use]
pub fn word_number(word: &str) -> Option<f64> {
    WORD_NUMBERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, v)| *v)
}

/// Map a unit word to its [`QuantityUnit`]
#[must_use]
pub fn unit_for(word: &str) -> Option<QuantityUnit> {
    UNIT_SYNONYMS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, u)| *u)
}

/// Whether a resolved food name refers to a beverage (whole-word match)
#[must_use]
pub fn is_beverage(name: &str) -> bool {
    let lowered = name.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| BEVERAGE_KEYWORDS.contains(&token))
}
