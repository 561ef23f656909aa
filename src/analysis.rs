// ABOUTME: Meal analysis facade: shortcut expansion, parsing, aggregation, allergen warnings
// ABOUTME: One call turns free text into macro totals plus meal metadata
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! End-to-end meal analysis.
//!
//! [`MealAnalyzer`] is the composition callers usually want: expand saved
//! shortcuts, parse the text into mentions, aggregate macros across the
//! nutrient catalogs, and annotate the result with meal metadata and
//! allergen warnings. Like every piece it composes, it never fails; the
//! worst outcome is an analysis full of unresolved names.

use crate::allergens::{AllergenMap, AllergenWarning};
use crate::models::{FoodMention, MacroTotals, MealSlot, UserProfile};
use crate::parser::MealTextParser;
use crate::shortcuts::ShortcutStore;
use crate::sources::NutrientResolver;

/// Result of analyzing one meal description
#[derive(Debug, Clone)]
pub struct MealAnalysis {
    /// Meal slot named in the text, or `Meal` when absent
    pub meal_type: MealSlot,
    /// Clock time named in the text, normalized to "H:MM AM/PM"
    pub meal_time: Option<String>,
    /// Parsed food mentions (after shortcut expansion)
    pub mentions: Vec<FoodMention>,
    /// Aggregated macro totals
    pub totals: MacroTotals,
    /// Allergen warnings against the user's profile, most severe first
    pub warnings: Vec<AllergenWarning>,
}

/// Composes the parser, resolver, shortcut store, and allergen map
pub struct MealAnalyzer<'r> {
    parser: MealTextParser,
    resolver: &'r NutrientResolver,
    shortcuts: ShortcutStore,
    allergens: AllergenMap,
}

impl<'r> MealAnalyzer<'r> {
    /// Create an analyzer
    #[must_use]
    pub fn new(
        parser: MealTextParser,
        resolver: &'r NutrientResolver,
        shortcuts: ShortcutStore,
        allergens: AllergenMap,
    ) -> Self {
        Self {
            parser,
            resolver,
            shortcuts,
            allergens,
        }
    }

    /// The underlying parser
    #[must_use]
    pub fn parser(&self) -> &MealTextParser {
        &self.parser
    }

    /// Analyze one meal description.
    ///
    /// Never errors; unrecognized text yields empty mentions and totals.
    pub async fn analyze(&self, text: &str, profile: &UserProfile) -> MealAnalysis {
        let meal_type = self.parser.meal_slot_of(text);
        let meal_time = self.parser.time_of(text);

        let expanded = self.shortcuts.expand(text);
        let mentions = self.parser.parse(&expanded);

        let aggregator = crate::aggregator::MacroAggregator::new(self.resolver);
        let totals = aggregator.aggregate(&mentions).await;

        let warnings = self
            .allergens
            .check_meal(&mentions, &expanded, &profile.allergies);

        MealAnalysis {
            meal_type,
            meal_time,
            mentions,
            totals,
            warnings,
        }
    }
}
