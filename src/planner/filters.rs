// ABOUTME: Hard and soft template filters with progressive soft-filter relaxation
// ABOUTME: Pure function over (templates, profile, context) returning survivors and relaxed categories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Constraint filtering.
//!
//! Two tiers of predicates run over the template catalog:
//!
//! - **Hard** filters are safety constraints and are never relaxed:
//!   allergen exclusion, dietary-restriction tag requirements, and
//!   meal-type membership.
//! - **Soft** filters encode preferences and relax progressively, in the
//!   fixed order budget → cooking skill → season → difficulty → dislikes,
//!   while fewer than [`MIN_RESULTS`] templates survive. Hard filters are
//!   re-applied unchanged on every pass.
//!
//! Filtering is a pure function: each pass recomputes from the full
//! catalog, and the result carries the names of every relaxed category.

use crate::models::{Difficulty, MealSlot, MealTemplate, Season, UserProfile};
use std::fmt;

/// Minimum surviving templates before relaxation stops
pub const MIN_RESULTS: usize = 3;

/// Soft filter categories, in relaxation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftFilter {
    /// Template budget tier within the user's tier
    Budget,
    /// Template skill requirement within the user's skill
    CookingSkill,
    /// Template in season for the current date
    Season,
    /// Template difficulty allowed for the meal slot
    Difficulty,
    /// No disliked ingredient present
    Dislikes,
}

impl fmt::Display for SoftFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Budget => write!(f, "budget"),
            Self::CookingSkill => write!(f, "cooking_skill"),
            Self::Season => write!(f, "season"),
            Self::Difficulty => write!(f, "difficulty"),
            Self::Dislikes => write!(f, "dislikes"),
        }
    }
}

/// Fixed relaxation order
pub const RELAXATION_ORDER: [SoftFilter; 5] = [
    SoftFilter::Budget,
    SoftFilter::CookingSkill,
    SoftFilter::Season,
    SoftFilter::Difficulty,
    SoftFilter::Dislikes,
];

/// Inputs the filter pipeline evaluates against
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// User profile supplying allergies, restrictions, and preferences
    pub profile: &'a UserProfile,
    /// Meal slot being filled; `None` disables the meal-type filter
    pub meal_type: Option<MealSlot>,
    /// Season of the suggestion date
    pub season: Season,
}

/// Outcome of the filter pipeline
#[derive(Debug)]
pub struct FilterOutcome<'t> {
    /// Surviving templates, in catalog order
    pub templates: Vec<&'t MealTemplate>,
    /// Soft categories that had to be relaxed, in relaxation order
    pub relaxed: Vec<SoftFilter>,
}

/// Apply hard and soft filters with progressive relaxation.
///
/// Relaxation never touches hard filters: a template carrying a user
/// allergen is excluded in every relaxation state. An empty survivor set
/// after full relaxation is a valid outcome, not an error.
#[must_use]
pub fn filter_templates<'t>(
    templates: &'t [MealTemplate],
    ctx: &FilterContext<'_>,
) -> FilterOutcome<'t> {
    let mut relaxed: Vec<SoftFilter> = Vec::new();

    let run = |relaxed: &[SoftFilter]| {
        templates
            .iter()
            .filter(|t| passes_hard_filters(t, ctx) && passes_soft_filters(t, ctx, relaxed))
            .collect::<Vec<_>>()
    };

    let mut survivors = run(&relaxed);
    for category in RELAXATION_ORDER {
        if survivors.len() >= MIN_RESULTS {
            break;
        }
        relaxed.push(category);
        survivors = run(&relaxed);
    }

    FilterOutcome {
        templates: survivors,
        relaxed,
    }
}

/// Map a dietary restriction to the template tag it requires.
///
/// Unknown restrictions map to nothing and filter nothing.
#[must_use]
pub fn required_tag(restriction: &str) -> Option<&'static str> {
    match restriction.trim().to_lowercase().as_str() {
        "vegetarian" => Some("vegetarian"),
        "vegan" => Some("vegan"),
        "gluten-free" | "gluten_free" => Some("gluten_free"),
        "dairy-free" | "dairy_free" => Some("dairy_free"),
        "keto" => Some("keto"),
        "low-sodium" | "low_sodium" => Some("low_sodium"),
        _ => None,
    }
}

/// Difficulties allowed for a meal slot: quick slots stay easy, dinner
/// allows anything
#[must_use]
pub fn allowed_difficulties(slot: Option<MealSlot>) -> &'static [Difficulty] {
    match slot {
        Some(MealSlot::Breakfast | MealSlot::Snack) => &[Difficulty::Easy],
        Some(MealSlot::Lunch) => &[Difficulty::Easy, Difficulty::Medium],
        Some(MealSlot::Dinner | MealSlot::Meal) | None => {
            &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        }
    }
}

/// Hard filters: allergens, dietary restrictions, meal type. Never relaxed.
fn passes_hard_filters(template: &MealTemplate, ctx: &FilterContext<'_>) -> bool {
    let profile = ctx.profile;

    if !profile.allergies.is_empty() {
        let template_allergens: Vec<String> = template
            .allergens
            .iter()
            .map(|a| a.to_lowercase())
            .collect();
        let hit = profile
            .allergies
            .iter()
            .any(|a| template_allergens.contains(&a.to_lowercase()));
        if hit {
            return false;
        }
    }

    if !profile.dietary_restrictions.is_empty() {
        let dietary_tags: Vec<String> = template
            .dietary_tags
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        for restriction in &profile.dietary_restrictions {
            if let Some(tag) = required_tag(restriction) {
                if !dietary_tags.iter().any(|t| t == tag) {
                    return false;
                }
            }
        }
    }

    if let Some(slot) = ctx.meal_type {
        if !template.meal_types.contains(&slot) {
            return false;
        }
    }

    true
}

/// Soft filters, each skipped once its category is relaxed
fn passes_soft_filters(
    template: &MealTemplate,
    ctx: &FilterContext<'_>,
    relaxed: &[SoftFilter],
) -> bool {
    let profile = ctx.profile;
    let active = |category: SoftFilter| !relaxed.contains(&category);

    if active(SoftFilter::Dislikes) && !profile.dislikes.is_empty() {
        let ingredients = template.ingredients.join(" ").to_lowercase();
        let disliked = profile
            .dislikes
            .iter()
            .any(|d| ingredients.contains(&d.to_lowercase()));
        if disliked {
            return false;
        }
    }

    if active(SoftFilter::Season) {
        let in_season = template.seasons.is_empty()
            || template
                .seasons
                .iter()
                .any(|s| *s == Season::All || *s == ctx.season);
        if !in_season {
            return false;
        }
    }

    if active(SoftFilter::Difficulty)
        && !allowed_difficulties(ctx.meal_type).contains(&template.difficulty)
    {
        return false;
    }

    if active(SoftFilter::CookingSkill) {
        if let Some(user_skill) = profile.cooking_skill {
            if template.cooking_skill > user_skill {
                return false;
            }
        }
    }

    if active(SoftFilter::Budget) {
        if let Some(user_budget) = profile.budget {
            if template.budget_tier > user_budget {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetTier, SkillLevel};

    fn template(name: &str) -> MealTemplate {
        MealTemplate {
            name: name.to_owned(),
            calories: 400.0,
            protein_g: 30.0,
            carbs_g: 40.0,
            fat_g: 12.0,
            sodium_mg: 400.0,
            allergens: Vec::new(),
            dietary_tags: Vec::new(),
            meal_types: vec![MealSlot::Dinner],
            ingredients: Vec::new(),
            cuisines: Vec::new(),
            difficulty: Difficulty::Easy,
            cooking_skill: SkillLevel::Basic,
            budget_tier: BudgetTier::Budget,
            seasons: Vec::new(),
            prep_time_min: None,
        }
    }

    fn ctx<'a>(profile: &'a UserProfile) -> FilterContext<'a> {
        FilterContext {
            profile,
            meal_type: Some(MealSlot::Dinner),
            season: Season::Summer,
        }
    }

    #[test]
    fn test_allergen_filter_never_relaxed() {
        let mut shellfish = template("Shrimp Pasta");
        shellfish.allergens = vec!["shellfish".to_owned()];
        let templates = vec![shellfish];

        let profile = UserProfile {
            allergies: vec!["shellfish".to_owned()],
            ..UserProfile::default()
        };
        let outcome = filter_templates(&templates, &ctx(&profile));

        // Even after relaxing every soft category, the allergen stays out.
        assert_eq!(outcome.relaxed.len(), RELAXATION_ORDER.len());
        assert!(outcome.templates.is_empty());
    }

    #[test]
    fn test_restriction_requires_tag() {
        let mut tagged = template("Lentil Curry");
        tagged.dietary_tags = vec!["vegetarian".to_owned()];
        let untagged = template("Beef Stew");
        let templates = vec![tagged, untagged];

        let profile = UserProfile {
            dietary_restrictions: vec!["vegetarian".to_owned()],
            ..UserProfile::default()
        };
        let outcome = filter_templates(&templates, &ctx(&profile));
        assert!(outcome.templates.iter().all(|t| t.name == "Lentil Curry"));
    }

    #[test]
    fn test_relaxation_monotonic_and_ordered() {
        // Premium-budget templates for a budget-tier user: the first pass
        // excludes them; relaxing budget (the first category) restores them.
        let mut premium: Vec<MealTemplate> = (0..4)
            .map(|i| template(&format!("Premium {i}")))
            .collect();
        for t in &mut premium {
            t.budget_tier = BudgetTier::Premium;
        }

        let profile = UserProfile {
            budget: Some(BudgetTier::Budget),
            ..UserProfile::default()
        };
        let outcome = filter_templates(&premium, &ctx(&profile));
        assert_eq!(outcome.relaxed, vec![SoftFilter::Budget]);
        assert_eq!(outcome.templates.len(), 4);
    }

    #[test]
    fn test_no_relaxation_when_enough_survive() {
        let templates: Vec<MealTemplate> =
            (0..3).map(|i| template(&format!("Meal {i}"))).collect();
        let profile = UserProfile::default();
        let outcome = filter_templates(&templates, &ctx(&profile));
        assert!(outcome.relaxed.is_empty());
        assert_eq!(outcome.templates.len(), 3);
    }

    #[test]
    fn test_difficulty_by_meal_slot() {
        assert_eq!(allowed_difficulties(Some(MealSlot::Breakfast)), &[Difficulty::Easy]);
        assert_eq!(
            allowed_difficulties(Some(MealSlot::Lunch)),
            &[Difficulty::Easy, Difficulty::Medium]
        );
        assert_eq!(allowed_difficulties(Some(MealSlot::Dinner)).len(), 3);
        assert_eq!(allowed_difficulties(Some(MealSlot::Snack)), &[Difficulty::Easy]);
    }

    #[test]
    fn test_unknown_restriction_filters_nothing() {
        assert_eq!(required_tag("pescatarian"), None);
        let templates = vec![template("Anything")];
        let profile = UserProfile {
            dietary_restrictions: vec!["pescatarian".to_owned()],
            ..UserProfile::default()
        };
        let outcome = filter_templates(&templates, &ctx(&profile));
        assert_eq!(outcome.templates.len(), 1);
    }

    #[test]
    fn test_dislikes_relax_last() {
        let mut disliked: Vec<MealTemplate> = (0..4)
            .map(|i| template(&format!("Mushroom Dish {i}")))
            .collect();
        for t in &mut disliked {
            t.ingredients = vec!["mushroom".to_owned(), "rice".to_owned()];
        }

        let profile = UserProfile {
            dislikes: vec!["mushroom".to_owned()],
            ..UserProfile::default()
        };
        let outcome = filter_templates(&disliked, &ctx(&profile));
        // Every category relaxes before dislikes finally yields results.
        assert_eq!(outcome.relaxed.last(), Some(&SoftFilter::Dislikes));
        assert_eq!(outcome.templates.len(), 4);
    }
}
