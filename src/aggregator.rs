// ABOUTME: Macro aggregation combining parsed mentions with resolved nutrient records
// ABOUTME: Serving-aware scaling into MacroTotals with unresolved-name tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Macro aggregation.
//!
//! For each mention the aggregator resolves the single best nutrient record
//! and scales its per-serving values by a unit-dependent multiplier:
//!
//! - grams: `quantity / serving_grams`
//! - ounces: `(quantity x 28.35) / serving_grams`
//! - pieces and servings: the raw quantity (no serving scaling)
//!
//! Mentions no catalog can resolve contribute nothing (no fabricated
//! estimate) and are reported in `unresolved_names`. A failure on one
//! mention never aborts the rest.

use crate::lexicon;
use crate::models::{FoodMention, MacroTotals, QuantityUnit, ResolvedItem, GRAMS_PER_OUNCE};
use crate::sources::NutrientResolver;
use tracing::debug;

/// Combines parser output with resolved nutrient records into totals
pub struct MacroAggregator<'r> {
    resolver: &'r NutrientResolver,
}

impl<'r> MacroAggregator<'r> {
    /// Create an aggregator over the given resolver
    #[must_use]
    pub fn new(resolver: &'r NutrientResolver) -> Self {
        Self { resolver }
    }

    /// Aggregate mentions into macro totals.
    ///
    /// Never errors; an empty mention list yields zeroed totals.
    pub async fn aggregate(&self, mentions: &[FoodMention]) -> MacroTotals {
        let mut totals = MacroTotals::default();

        for mention in mentions {
            let records = self.resolver.resolve(&mention.name, 1).await;
            let Some(record) = records.into_iter().next() else {
                debug!(name = %mention.name, "no nutrient record found");
                totals.unresolved_names.push(mention.name.clone());
                continue;
            };

            // serving_grams is always positive by the record invariant.
            let multiplier = match mention.unit {
                QuantityUnit::Grams => mention.quantity / record.serving_grams,
                QuantityUnit::Ounces => mention.quantity * GRAMS_PER_OUNCE / record.serving_grams,
                QuantityUnit::Pieces | QuantityUnit::Servings => mention.quantity,
            };

            totals.calories += record.calories * multiplier;
            totals.protein_g += record.protein_g * multiplier;
            totals.carbs_g += record.carbs_g * multiplier;
            totals.fat_g += record.fat_g * multiplier;
            totals.sodium_mg += record.sodium_mg * multiplier;
            totals.fiber_g += record.fiber_g * multiplier;

            if lexicon::is_beverage(&record.description) {
                totals.beverages += 1;
            }

            totals.resolved_items.push(ResolvedItem {
                description: record.description,
                quantity: mention.quantity,
                unit: mention.unit,
                source: record.source,
            });
        }

        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuantityUnit;

    #[tokio::test]
    async fn test_unresolved_mentions_tracked_without_contribution() {
        // Resolver with no sources resolves nothing.
        let resolver = NutrientResolver::new(Vec::new());
        let aggregator = MacroAggregator::new(&resolver);

        let mentions = vec![FoodMention::new("dragonfruit", 2.0, QuantityUnit::Servings)];
        let totals = aggregator.aggregate(&mentions).await;

        assert!((totals.calories - 0.0).abs() < f64::EPSILON);
        assert!(totals.resolved_items.is_empty());
        assert_eq!(totals.unresolved_names, ["dragonfruit"]);
    }

    #[tokio::test]
    async fn test_empty_mentions_yield_zero_totals() {
        let resolver = NutrientResolver::new(Vec::new());
        let aggregator = MacroAggregator::new(&resolver);
        let totals = aggregator.aggregate(&[]).await;
        assert!(totals.resolved_items.is_empty());
        assert!(totals.unresolved_names.is_empty());
        assert_eq!(totals.beverages, 0);
    }
}
