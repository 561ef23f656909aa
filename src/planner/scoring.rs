// ABOUTME: Ten-factor weighted template scorer parameterized by variety-mode weight profiles
// ABOUTME: Weight vectors are validated to sum to 1.0; malformed custom weights fall back to balanced
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Suggestion scoring.
//!
//! Each template is scored by ten independent factors, all in `[0, 1]`:
//! calorie fit, protein fit, sodium headroom, cuisine preference, cuisine
//! diversity, ingredient novelty, same-day repetition, ingredient
//! familiarity, meal-type calorie-pattern match, and a pseudo-random
//! tie-break. The variety mode picks one of three fixed weight vectors and
//! the final score is the weighted sum.
//!
//! The tie-break factor draws from a caller-supplied RNG so tests can seed
//! a deterministic generator.

use crate::history::MealHistory;
use crate::models::{MealTemplate, RemainingBudget, UserProfile, VarietyMode};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tolerance for the sum-to-one weight invariant
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Calorie ceiling under which a template still half-fits a spent budget
const LIGHT_MEAL_CALORIES: f64 = 300.0;

/// Named weights for the ten scoring factors.
///
/// Invariant: the weights sum to 1.0 within [`WEIGHT_SUM_TOLERANCE`].
/// [`ScoringWeights::validated`] enforces this, replacing malformed
/// vectors with the balanced profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Closeness to the per-remaining-meal calorie share
    pub calorie_fit: f64,
    /// Closeness to the per-remaining-meal protein share
    pub protein_fit: f64,
    /// Binary: sodium fits the remaining headroom
    pub sodium_headroom: f64,
    /// Binary: template cuisine matches a preference
    pub cuisine_preference: f64,
    /// Binary: template cuisine absent from recently detected cuisines
    pub cuisine_diversity: f64,
    /// Fraction of ingredients absent from recent food history
    pub ingredient_novelty: f64,
    /// One minus the overlap fraction with today's foods
    pub repetition_penalty: f64,
    /// Fraction of ingredients present in recent food history
    pub ingredient_familiarity: f64,
    /// Closeness to the historical typical calories for the meal slot
    pub pattern_match: f64,
    /// Pseudo-random tie-break in [0, 1)
    pub random_tiebreak: f64,
}

impl ScoringWeights {
    /// Fixed weight vector for a variety mode; each sums to exactly 1.0
    #[must_use]
    pub fn for_mode(mode: VarietyMode) -> Self {
        match mode {
            VarietyMode::Exploratory => Self {
                calorie_fit: 0.25,
                protein_fit: 0.20,
                sodium_headroom: 0.05,
                cuisine_preference: 0.05,
                cuisine_diversity: 0.15,
                ingredient_novelty: 0.15,
                repetition_penalty: 0.05,
                ingredient_familiarity: 0.00,
                pattern_match: 0.00,
                random_tiebreak: 0.10,
            },
            VarietyMode::Balanced => Self {
                calorie_fit: 0.25,
                protein_fit: 0.20,
                sodium_headroom: 0.08,
                cuisine_preference: 0.10,
                cuisine_diversity: 0.08,
                ingredient_novelty: 0.07,
                repetition_penalty: 0.05,
                ingredient_familiarity: 0.05,
                pattern_match: 0.05,
                random_tiebreak: 0.07,
            },
            VarietyMode::ConsistencySeeking => Self {
                calorie_fit: 0.25,
                protein_fit: 0.20,
                sodium_headroom: 0.08,
                cuisine_preference: 0.15,
                cuisine_diversity: 0.00,
                ingredient_novelty: 0.00,
                repetition_penalty: 0.02,
                ingredient_familiarity: 0.15,
                pattern_match: 0.10,
                random_tiebreak: 0.05,
            },
        }
    }

    /// Sum of all ten weights
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.calorie_fit
            + self.protein_fit
            + self.sodium_headroom
            + self.cuisine_preference
            + self.cuisine_diversity
            + self.ingredient_novelty
            + self.repetition_penalty
            + self.ingredient_familiarity
            + self.pattern_match
            + self.random_tiebreak
    }

    /// Whether the sum-to-one invariant holds
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }

    /// Enforce the invariant, falling back to the balanced profile for
    /// malformed weight vectors
    #[must_use]
    pub fn validated(self) -> Self {
        if self.is_normalized() {
            self
        } else {
            Self::for_mode(VarietyMode::Balanced)
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::for_mode(VarietyMode::Balanced)
    }
}

/// Inputs one scoring call evaluates against
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    /// Remaining macro budget for the day
    pub remaining: &'a RemainingBudget,
    /// User profile supplying cuisine preferences
    pub profile: &'a UserProfile,
    /// Recent-history analysis
    pub history: &'a MealHistory,
}

/// Score one template: the weighted sum of the ten factors.
/// Higher is better; the result stays in `[0, 1]`.
#[must_use]
pub fn score_template<R: Rng + ?Sized>(
    template: &MealTemplate,
    ctx: &ScoreContext<'_>,
    weights: &ScoringWeights,
    rng: &mut R,
) -> f64 {
    let remaining = ctx.remaining;
    let meals = f64::from(remaining.meals_remaining.max(1));
    let per_meal_calories = remaining.calories / meals;
    let per_meal_protein = remaining.protein_g / meals;

    // 1. Calorie fit: relative distance from the per-meal share. With no
    // budget left, light meals keep half credit.
    let calorie_fit = if per_meal_calories > 0.0 {
        (1.0 - (template.calories - per_meal_calories).abs() / per_meal_calories).max(0.0)
    } else if template.calories < LIGHT_MEAL_CALORIES {
        0.5
    } else {
        0.0
    };

    // 2. Protein fit
    let protein_fit = if per_meal_protein > 0.0 {
        (1.0 - (template.protein_g - per_meal_protein).abs() / per_meal_protein).max(0.0)
    } else {
        0.5
    };

    // 3. Sodium headroom (binary)
    let sodium_headroom = if template.sodium_mg <= remaining.sodium_mg {
        1.0
    } else {
        0.0
    };

    let template_cuisines: Vec<String> =
        template.cuisines.iter().map(|c| c.to_lowercase()).collect();

    // 4. Cuisine preference (binary)
    let cuisine_preference = {
        let prefs: Vec<String> = ctx
            .profile
            .cuisine_preferences
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        if !prefs.is_empty() && template_cuisines.iter().any(|c| prefs.contains(c)) {
            1.0
        } else {
            0.0
        }
    };

    // 5. Cuisine diversity: 1 when the template's cuisines avoid everything
    // recently detected; no history means everything is diverse.
    let detected = &ctx.history.detected_cuisines;
    let cuisine_diversity = if template_cuisines.is_empty() {
        0.0
    } else if detected.is_empty() {
        1.0
    } else if template_cuisines.iter().any(|c| detected.contains_key(c)) {
        0.0
    } else {
        1.0
    };

    let ingredients: Vec<String> = template
        .ingredients
        .iter()
        .map(|i| i.to_lowercase())
        .collect();
    let recent = &ctx.history.recent_food_names;

    // 6. Ingredient novelty: fraction of ingredients absent from recent
    // foods; no history means everything is novel.
    let ingredient_novelty = if ingredients.is_empty() {
        0.0
    } else if recent.is_empty() {
        1.0
    } else {
        let novel = ingredients
            .iter()
            .filter(|ing| !recent.iter().any(|food| food.contains(ing.as_str())))
            .count();
        novel as f64 / ingredients.len() as f64
    };

    // 7. Same-day repetition: full credit shrinks with overlap against
    // today's already-eaten foods.
    let today = &ctx.history.today_food_names;
    let repetition_penalty = if today.is_empty() || ingredients.is_empty() {
        1.0
    } else {
        let overlap = today
            .iter()
            .filter(|food| ingredients.iter().any(|ing| ing.contains(food.as_str())))
            .count();
        if overlap == 0 {
            1.0
        } else {
            (1.0 - overlap as f64 / ingredients.len() as f64).max(0.0)
        }
    };

    // 8. Ingredient familiarity: fraction of ingredients seen recently
    let ingredient_familiarity = if ingredients.is_empty() || recent.is_empty() {
        0.0
    } else {
        let familiar = ingredients
            .iter()
            .filter(|ing| recent.iter().any(|food| food.contains(ing.as_str())))
            .count();
        familiar as f64 / ingredients.len() as f64
    };

    // 9. Meal-type calorie-pattern match against the historical typical
    // calories for the template's primary slot; 0 when unavailable.
    let pattern_match = template
        .meal_types
        .first()
        .and_then(|slot| ctx.history.typical_calories.get(slot))
        .map_or(0.0, |&typical| {
            if typical > 0.0 {
                (1.0 - (template.calories - typical).abs() / typical).max(0.0)
            } else {
                0.0
            }
        });

    // 10. Pseudo-random tie-break in [0, 1)
    let random_tiebreak: f64 = rng.gen();

    weights.calorie_fit * calorie_fit
        + weights.protein_fit * protein_fit
        + weights.sodium_headroom * sodium_headroom
        + weights.cuisine_preference * cuisine_preference
        + weights.cuisine_diversity * cuisine_diversity
        + weights.ingredient_novelty * ingredient_novelty
        + weights.repetition_penalty * repetition_penalty
        + weights.ingredient_familiarity * ingredient_familiarity
        + weights.pattern_match * pattern_match
        + weights.random_tiebreak * random_tiebreak
}
