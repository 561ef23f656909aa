// ABOUTME: Integration tests for macro aggregation and serving-aware scaling
// ABOUTME: Covers the gram/ounce/servings multipliers, unresolved tracking, and the end-to-end flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors
//! Aggregator integration tests
//!
//! Exercises serving-aware scaling against a real in-memory catalog:
//! gram quantities scale by the record serving, ounces convert at
//! 28.35 g/oz, counted units bypass serving scaling, and unresolved
//! mentions contribute nothing but their name.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutriplan::aggregator::MacroAggregator;
use nutriplan::lexicon::FoodLexicon;
use nutriplan::models::{FoodMention, QuantityUnit};
use nutriplan::parser::MealTextParser;
use nutriplan::sources::{LocalCatalog, NutrientResolver, NutrientSource};
use sqlx::sqlite::SqlitePoolOptions;

/// Catalog: chicken breast 165 kcal / 100 g serving, rice 200 kcal /
/// 240 g "cup" serving, salmon 208 kcal / 85 g serving.
async fn resolver_fixture() -> NutrientResolver {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE generic_foods (
            description TEXT, calories REAL, protein_g REAL, carbs_g REAL,
            fat_g REAL, fiber_g REAL, serving_grams REAL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO generic_foods VALUES
            ('chicken breast', 165, 31, 0, 3.6, 0, 100),
            ('rice', 200, 4.2, 44, 0.4, 0.6, 240),
            ('salmon', 208, 20, 0, 13, 0, 85)",
    )
    .execute(&pool)
    .await
    .unwrap();

    NutrientResolver::new(vec![NutrientSource::Local(LocalCatalog::from_pool(pool))])
}

// ============================================================================
// SERVING-AWARE SCALING
// ============================================================================

#[tokio::test]
async fn test_gram_scaling_round_trip() {
    let resolver = resolver_fixture().await;
    let aggregator = MacroAggregator::new(&resolver);

    // 200 g of a 100 g serving doubles every nutrient field.
    let mentions = vec![FoodMention::new(
        "chicken breast",
        200.0,
        QuantityUnit::Grams,
    )];
    let totals = aggregator.aggregate(&mentions).await;

    assert!((totals.calories - 330.0).abs() < 1e-9);
    assert!((totals.protein_g - 62.0).abs() < 1e-9);
    assert!((totals.fat_g - 7.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_ounce_conversion() {
    let resolver = resolver_fixture().await;
    let aggregator = MacroAggregator::new(&resolver);

    // 3 oz against an 85 g serving: (3 x 28.35) / 85 ≈ 1.0006
    let mentions = vec![FoodMention::new("salmon", 3.0, QuantityUnit::Ounces)];
    let totals = aggregator.aggregate(&mentions).await;

    let multiplier: f64 = 3.0 * 28.35 / 85.0;
    assert!((multiplier - 1.0006).abs() < 1e-4);
    assert!((totals.calories - 208.0 * multiplier).abs() < 1e-9);
}

#[tokio::test]
async fn test_counted_units_bypass_serving_scaling() {
    let resolver = resolver_fixture().await;
    let aggregator = MacroAggregator::new(&resolver);

    // Two servings multiply the per-serving values directly, regardless
    // of the record's 240 g serving size.
    let mentions = vec![FoodMention::new("rice", 2.0, QuantityUnit::Servings)];
    let totals = aggregator.aggregate(&mentions).await;
    assert!((totals.calories - 400.0).abs() < 1e-9);

    let mentions = vec![FoodMention::new("rice", 2.0, QuantityUnit::Pieces)];
    let totals = aggregator.aggregate(&mentions).await;
    assert!((totals.calories - 400.0).abs() < 1e-9);
}

// ============================================================================
// UNRESOLVED TRACKING
// ============================================================================

#[tokio::test]
async fn test_unresolved_mention_changes_nothing_but_names() {
    let resolver = resolver_fixture().await;
    let aggregator = MacroAggregator::new(&resolver);

    let mentions = vec![
        FoodMention::new("chicken breast", 100.0, QuantityUnit::Grams),
        FoodMention::new("unobtainium stew", 1.0, QuantityUnit::Servings),
    ];
    let totals = aggregator.aggregate(&mentions).await;

    // The resolved mention contributes exactly its own values.
    assert!((totals.calories - 165.0).abs() < 1e-9);
    assert_eq!(totals.resolved_items.len(), 1);
    assert_eq!(totals.unresolved_names, ["unobtainium stew"]);
}

#[tokio::test]
async fn test_one_failure_never_aborts_the_rest() {
    let resolver = resolver_fixture().await;
    let aggregator = MacroAggregator::new(&resolver);

    let mentions = vec![
        FoodMention::new("nothing-1", 1.0, QuantityUnit::Servings),
        FoodMention::new("rice", 1.0, QuantityUnit::Servings),
        FoodMention::new("nothing-2", 1.0, QuantityUnit::Servings),
    ];
    let totals = aggregator.aggregate(&mentions).await;

    assert_eq!(totals.resolved_items.len(), 1);
    assert_eq!(totals.unresolved_names.len(), 2);
    assert!((totals.calories - 200.0).abs() < 1e-9);
}

// ============================================================================
// END TO END
// ============================================================================

#[tokio::test]
async fn test_end_to_end_parse_and_aggregate() {
    let resolver = resolver_fixture().await;
    let parser = MealTextParser::new(FoodLexicon::curated());
    let aggregator = MacroAggregator::new(&resolver);

    let mentions = parser.parse("200g chicken breast and a cup of rice");
    let totals = aggregator.aggregate(&mentions).await;

    // Chicken: 200/100 x 165 = 330. Rice: one cup (counted unit) = 200.
    assert!((totals.calories - 530.0).abs() < 1.0);
    assert_eq!(totals.resolved_items.len(), 2);
    assert!(totals.unresolved_names.is_empty());
}

#[tokio::test]
async fn test_resolution_uses_best_match() {
    let resolver = resolver_fixture().await;
    let records = resolver.resolve("chicken breast", 1).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].description, "chicken breast");
}
