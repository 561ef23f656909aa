// ABOUTME: Core domain models for food mentions, nutrient records, macro totals, and meal templates
// ABOUTME: All types are serde-derived and read-only once constructed; no global state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Shared domain models.
//!
//! The types here flow between the parser, the nutrient resolver, the macro
//! aggregator, and the meal planner. They carry no behavior beyond small
//! constructors and conversions; the algorithms live in their own modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grams in one ounce, used for serving-size conversion
pub const GRAMS_PER_OUNCE: f64 = 28.35;

/// Serving size assumed when a catalog does not report one
pub const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// Unit attached to a parsed food quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    /// Weight in grams; scaled against the record's serving size
    Grams,
    /// Weight in ounces; converted to grams, then scaled
    Ounces,
    /// Piece-equivalents: pieces, slices, cups, bowls, glasses, tablespoons.
    /// Multiplies the record's per-serving values by the raw count.
    Pieces,
    /// Whole servings. Multiplies per-serving values by the raw count even
    /// when the record's serving corresponds to more than one unit.
    #[default]
    Servings,
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grams => write!(f, "g"),
            Self::Ounces => write!(f, "oz"),
            Self::Pieces => write!(f, "pieces"),
            Self::Servings => write!(f, "servings"),
        }
    }
}

/// One recognized food occurrence extracted from free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodMention {
    /// Matched vocabulary entry (lowercased)
    pub name: String,
    /// Quantity in the given unit; never negative
    pub quantity: f64,
    /// Unit the quantity was expressed in
    pub unit: QuantityUnit,
}

impl FoodMention {
    /// Create a mention, clamping negative quantities to zero
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: f64, unit: QuantityUnit) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.max(0.0),
            unit,
        }
    }
}

/// Identifies which catalog produced a nutrient record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Local embedded catalog, generic foods table
    Generic,
    /// Local embedded catalog, branded foods table
    Branded,
    /// Local embedded catalog, restaurant items table
    Restaurant,
    /// Community-maintained embedded catalog
    Community,
    /// Remote USDA FoodData Central lookup
    Remote,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Branded => write!(f, "branded"),
            Self::Restaurant => write!(f, "restaurant"),
            Self::Community => write!(f, "community"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// One catalog entry's nutrient values plus its serving size in grams.
///
/// Ephemeral: produced per adapter match and consumed by the aggregator,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientRecord {
    /// Catalog description of the food
    pub description: String,
    /// Energy per serving (kcal)
    pub calories: f64,
    /// Protein per serving (g)
    pub protein_g: f64,
    /// Carbohydrates per serving (g)
    pub carbs_g: f64,
    /// Fat per serving (g)
    pub fat_g: f64,
    /// Sodium per serving (mg)
    pub sodium_mg: f64,
    /// Dietary fiber per serving (g)
    pub fiber_g: f64,
    /// Catalog that produced this record
    pub source: SourceId,
    /// Reference serving size in grams; always positive (100 when unknown)
    pub serving_grams: f64,
}

impl NutrientRecord {
    /// Normalize the serving size, falling back to the 100 g default for
    /// zero, negative, or non-finite values.
    #[must_use]
    pub fn normalized_serving(serving_grams: Option<f64>) -> f64 {
        match serving_grams {
            Some(g) if g.is_finite() && g > 0.0 => g,
            _ => DEFAULT_SERVING_GRAMS,
        }
    }
}

/// One resolved line item inside [`MacroTotals`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedItem {
    /// Catalog description the mention resolved to
    pub description: String,
    /// Quantity from the original mention
    pub quantity: f64,
    /// Unit from the original mention
    pub unit: QuantityUnit,
    /// Catalog that supplied the nutrient data
    pub source: SourceId,
}

/// Accumulated macro totals for one analysis call.
///
/// Built once per call and append-only: resolved mentions add to the
/// nutrient fields and `resolved_items`; unresolved mentions contribute
/// nothing beyond their name in `unresolved_names`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacroTotals {
    /// Total energy (kcal)
    pub calories: f64,
    /// Total protein (g)
    pub protein_g: f64,
    /// Total carbohydrates (g)
    pub carbs_g: f64,
    /// Total fat (g)
    pub fat_g: f64,
    /// Total sodium (mg)
    pub sodium_mg: f64,
    /// Total dietary fiber (g)
    pub fiber_g: f64,
    /// Mentions that resolved against a catalog
    pub resolved_items: Vec<ResolvedItem>,
    /// Raw names of mentions no catalog could resolve
    pub unresolved_names: Vec<String>,
    /// Count of resolved items recognized as beverages (hydration tracking)
    pub beverages: usize,
}

/// Meal slot a template or log entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Between-meal snack
    Snack,
    /// Unclassified meal
    Meal,
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Breakfast => write!(f, "breakfast"),
            Self::Lunch => write!(f, "lunch"),
            Self::Dinner => write!(f, "dinner"),
            Self::Snack => write!(f, "snack"),
            Self::Meal => write!(f, "meal"),
        }
    }
}

/// Recipe difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Minimal preparation
    #[default]
    Easy,
    /// Moderate preparation
    Medium,
    /// Involved preparation
    Hard,
}

/// Cooking skill tier, ordered from least to most capable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    /// Can follow simple recipes
    #[default]
    Basic,
    /// Comfortable with multi-step recipes
    Intermediate,
    /// Comfortable with any technique
    Advanced,
}

/// Budget tier, ordered from cheapest to most expensive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    /// Inexpensive ingredients
    #[default]
    Budget,
    /// Mid-range ingredients
    Moderate,
    /// Premium ingredients
    Premium,
}

/// Season a template is appropriate for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// December through February
    Winter,
    /// March through May
    Spring,
    /// June through August
    Summer,
    /// September through November
    Fall,
    /// Appropriate year-round
    All,
}

impl Season {
    /// Season for a calendar month (1-12); out-of-range months map to `All`
    #[must_use]
    pub fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::All,
        }
    }
}

/// Variety mode selecting a scoring weight profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VarietyMode {
    /// Favor novelty and cuisine diversity
    #[serde(alias = "explore")]
    Exploratory,
    /// Balance novelty against familiarity
    #[default]
    Balanced,
    /// Favor familiar foods and established patterns
    #[serde(alias = "consistent", alias = "consistency-seeking")]
    ConsistencySeeking,
}

/// One candidate meal in the template catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealTemplate {
    /// Display name
    pub name: String,
    /// Energy per serving (kcal)
    pub calories: f64,
    /// Protein per serving (g)
    #[serde(default)]
    pub protein_g: f64,
    /// Carbohydrates per serving (g)
    #[serde(default)]
    pub carbs_g: f64,
    /// Fat per serving (g)
    #[serde(default)]
    pub fat_g: f64,
    /// Sodium per serving (mg)
    #[serde(default)]
    pub sodium_mg: f64,
    /// Allergens present in the meal (lowercased tags)
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Dietary suitability tags (e.g. "vegetarian", "gluten_free")
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    /// Meal slots this template suits
    #[serde(default)]
    pub meal_types: Vec<MealSlot>,
    /// Ingredient names (lowercased)
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Cuisine tags (lowercased)
    #[serde(default)]
    pub cuisines: Vec<String>,
    /// Preparation difficulty
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Skill required to cook this meal
    #[serde(default)]
    pub cooking_skill: SkillLevel,
    /// Cost tier of the ingredients
    #[serde(default)]
    pub budget_tier: BudgetTier,
    /// Seasons the meal suits; empty means year-round
    #[serde(default)]
    pub seasons: Vec<Season>,
    /// Preparation time in minutes, when known
    #[serde(default)]
    pub prep_time_min: Option<u32>,
}

/// User dietary profile consumed by the meal planner.
///
/// All fields default to unrestricted; a missing or malformed profile file
/// yields `UserProfile::default()` rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Allergens to exclude; never relaxed
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Dietary restrictions mapped to required template tags; never relaxed
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// Disliked ingredients (soft filter)
    #[serde(default)]
    pub dislikes: Vec<String>,
    /// Preferred cuisines (scoring bonus)
    #[serde(default)]
    pub cuisine_preferences: Vec<String>,
    /// Cooking skill; `None` disables the skill filter
    #[serde(default)]
    pub cooking_skill: Option<SkillLevel>,
    /// Budget tier; `None` disables the budget filter
    #[serde(default)]
    pub budget: Option<BudgetTier>,
    /// Variety mode selecting the scoring weight profile
    #[serde(default)]
    pub variety_mode: VarietyMode,
}

/// Macro totals already consumed today, supplied by the daily-log collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumedTotals {
    /// Energy consumed (kcal)
    pub calories: f64,
    /// Protein consumed (g)
    pub protein_g: f64,
    /// Carbohydrates consumed (g)
    pub carbs_g: f64,
    /// Fat consumed (g)
    pub fat_g: f64,
    /// Sodium consumed (mg)
    pub sodium_mg: f64,
}

/// Daily macro targets derived from goals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    /// Daily energy target (kcal)
    pub calories: f64,
    /// Daily protein target (g)
    pub protein_g: f64,
    /// Daily carbohydrate target (g)
    pub carbs_g: f64,
    /// Daily fat target (g)
    pub fat_g: f64,
    /// Daily sodium ceiling (mg)
    pub sodium_limit_mg: f64,
}

/// Remaining macro budget for the rest of the day, derived per call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemainingBudget {
    /// Energy remaining (kcal), floored at zero
    pub calories: f64,
    /// Protein remaining (g), floored at zero
    pub protein_g: f64,
    /// Carbohydrates remaining (g), floored at zero
    pub carbs_g: f64,
    /// Fat remaining (g), floored at zero
    pub fat_g: f64,
    /// Sodium headroom (mg), floored at zero
    pub sodium_mg: f64,
    /// Meals expected before the day ends
    pub meals_remaining: u32,
    /// Targets the remainder was derived from
    pub targets: MacroTargets,
    /// Consumption the remainder was derived from
    pub consumed: ConsumedTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_clamps_negative_quantity() {
        let mention = FoodMention::new("rice", -2.0, QuantityUnit::Servings);
        assert!((mention.quantity - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalized_serving_defaults() {
        assert!((NutrientRecord::normalized_serving(None) - 100.0).abs() < f64::EPSILON);
        assert!((NutrientRecord::normalized_serving(Some(0.0)) - 100.0).abs() < f64::EPSILON);
        assert!((NutrientRecord::normalized_serving(Some(-5.0)) - 100.0).abs() < f64::EPSILON);
        assert!(
            (NutrientRecord::normalized_serving(Some(f64::NAN)) - 100.0).abs() < f64::EPSILON
        );
        assert!((NutrientRecord::normalized_serving(Some(85.0)) - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skill_and_budget_ordering() {
        assert!(SkillLevel::Basic < SkillLevel::Intermediate);
        assert!(SkillLevel::Intermediate < SkillLevel::Advanced);
        assert!(BudgetTier::Budget < BudgetTier::Moderate);
        assert!(BudgetTier::Moderate < BudgetTier::Premium);
    }

    #[test]
    fn test_variety_mode_aliases() {
        let explore: VarietyMode = serde_json::from_str("\"explore\"").unwrap();
        assert_eq!(explore, VarietyMode::Exploratory);
        let consistent: VarietyMode = serde_json::from_str("\"consistent\"").unwrap();
        assert_eq!(consistent, VarietyMode::ConsistencySeeking);
    }

    #[test]
    fn test_template_deserializes_with_defaults() {
        let json = r#"{"name": "Oatmeal", "calories": 300}"#;
        let template: MealTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.difficulty, Difficulty::Easy);
        assert_eq!(template.cooking_skill, SkillLevel::Basic);
        assert_eq!(template.budget_tier, BudgetTier::Budget);
        assert!(template.seasons.is_empty());
    }
}
