// ABOUTME: Integration tests for the nutrient source adapters and the concurrent resolver
// ABOUTME: In-memory SQLite fixtures exercise per-table mapping, degradation, and relevance merge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors
//! Resolver integration tests
//!
//! Builds in-memory SQLite catalogs in the shapes the adapters expect and
//! verifies the uniform query contract: matching rows map to records,
//! malformed rows are skipped, missing stores degrade to empty, and the
//! resolver merges multi-source results by relevance.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutriplan::models::SourceId;
use nutriplan::sources::{
    CommunityCatalog, LocalCatalog, NutrientResolver, NutrientSource, RemoteCatalog, RemoteConfig,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn memory_pool() -> SqlitePool {
    // One connection keeps every query on the same in-memory database.
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn local_fixture() -> LocalCatalog {
    let pool = memory_pool().await;

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
        "CREATE TABLE branded_foods (
            description TEXT, calories REAL, protein_g REAL, carbs_g REAL,
            fat_g REAL, sodium_mg REAL, fiber_g REAL,
            serving_size REAL, serving_size_unit TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TABLE restaurant_items (
            description TEXT, calories REAL, protein_g REAL, carbs_g REAL,
            fat_g REAL, sodium_mg REAL, fiber_g REAL,
            serving_size REAL, serving_size_unit TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO generic_foods VALUES
            ('Chicken Breast', 165, 31, 0, 3.6, 0, 100),
            ('Roasted Chicken Breast', 190, 29, 0, 7.7, 0, 100),
            ('Rice, white, cooked', 200, 4.2, 44, 0.4, 0.6, 240),
            (NULL, 100, 1, 1, 1, 1, 100),
            ('Zero Calorie Row', 0, 1, 1, 1, 1, 100)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO branded_foods VALUES
            ('Protein Bar, chocolate', 210, 20, 23, 7, 180, 1, 60, 'g'),
            ('Canned Tuna', 90, 20, 0, 1, 250, 0, 3, 'oz')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO restaurant_items VALUES
            ('BBQ Chicken Breast Sandwich', 540, 35, 48, 21, 1100, 3, 280, 'g')",
    )
    .execute(&pool)
    .await
    .unwrap();

    LocalCatalog::from_pool(pool)
}

async fn community_fixture() -> CommunityCatalog {
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE community_foods (
            name TEXT, calories REAL, protein REAL, carbohydrates REAL,
            total_fat REAL, sodium REAL, dietary_fiber REAL, serving TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        r#"INSERT INTO community_foods VALUES
            ('Chicken Breast, grilled', 160, 30, 0, 3.2, 70, 0,
             '{"metric": {"quantity": 85, "unit": "g"}}'),
            ('Brown Rice', 215, 5, 45, 1.8, 10, 3.5, '195 g'),
            ('Mystery Stew', 300, 12, 20, 18, 500, 2, 'one ladle')"#,
    )
    .execute(&pool)
    .await
    .unwrap();
    CommunityCatalog::from_pool(pool)
}

// ============================================================================
// LOCAL ADAPTER
// ============================================================================

#[tokio::test]
async fn test_local_queries_all_three_tables() {
    let catalog = local_fixture().await;
    let records = catalog.query("Chicken Breast", 20).await;

    let sources: Vec<SourceId> = records.iter().map(|r| r.source).collect();
    assert!(sources.contains(&SourceId::Generic));
    assert!(sources.contains(&SourceId::Restaurant));
}

#[tokio::test]
async fn test_local_skips_malformed_rows() {
    let catalog = local_fixture().await;
    // The NULL-description and zero-calorie rows never surface.
    let records = catalog.query("", 50).await;
    assert!(records.iter().all(|r| !r.description.is_empty()));
    assert!(records.iter().all(|r| r.calories > 0.0));
}

#[tokio::test]
async fn test_local_branded_ounce_serving_converted() {
    let catalog = local_fixture().await;
    let records = catalog.query("Canned Tuna", 5).await;
    assert_eq!(records.len(), 1);
    // 3 oz * 28.35 g/oz
    assert!((records[0].serving_grams - 85.05).abs() < 1e-9);
}

#[tokio::test]
async fn test_local_generic_serving_already_grams() {
    let catalog = local_fixture().await;
    let records = catalog.query("Rice, white", 5).await;
    assert_eq!(records.len(), 1);
    assert!((records[0].serving_grams - 240.0).abs() < f64::EPSILON);
    // Generic table has no sodium column.
    assert!((records[0].sodium_mg - 0.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_local_missing_tables_degrade_per_table() {
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE generic_foods (
            description TEXT, calories REAL, protein_g REAL, carbs_g REAL,
            fat_g REAL, fiber_g REAL, serving_grams REAL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO generic_foods VALUES ('Oatmeal', 150, 5, 27, 2.5, 4, 40)")
        .execute(&pool)
        .await
        .unwrap();

    // branded_foods and restaurant_items do not exist; the generic rows
    // still come back.
    let catalog = LocalCatalog::from_pool(pool);
    let records = catalog.query("Oatmeal", 5).await;
    assert_eq!(records.len(), 1);
}

// ============================================================================
// COMMUNITY ADAPTER
// ============================================================================

#[tokio::test]
async fn test_community_parses_json_serving() {
    let catalog = community_fixture().await;
    let records = catalog.query("Chicken Breast, grilled", 5).await;
    assert_eq!(records.len(), 1);
    assert!((records[0].serving_grams - 85.0).abs() < f64::EPSILON);
    assert_eq!(records[0].source, SourceId::Community);
}

#[tokio::test]
async fn test_community_parses_text_serving() {
    let catalog = community_fixture().await;
    let records = catalog.query("Brown Rice", 5).await;
    assert!((records[0].serving_grams - 195.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_community_unparseable_serving_defaults_100g() {
    let catalog = community_fixture().await;
    let records = catalog.query("Mystery Stew", 5).await;
    assert!((records[0].serving_grams - 100.0).abs() < f64::EPSILON);
}

// ============================================================================
// REMOTE ADAPTER
// ============================================================================

#[tokio::test]
async fn test_remote_without_key_contributes_nothing() {
    let catalog = RemoteCatalog::new(RemoteConfig::default());
    assert!(catalog.query("apple", 5).await.is_empty());
}

#[tokio::test]
async fn test_remote_network_failure_degrades_to_empty() {
    // A key is configured but the endpoint is unreachable.
    let catalog = RemoteCatalog::new(RemoteConfig {
        api_key: Some("test-key".to_owned()),
        base_url: "http://127.0.0.1:1/fdc/v1".to_owned(),
        timeout: std::time::Duration::from_millis(200),
    });
    assert!(catalog.query("apple", 5).await.is_empty());
}

// ============================================================================
// RESOLVER MERGE
// ============================================================================

#[tokio::test]
async fn test_merge_ranks_exact_match_first() {
    let resolver = NutrientResolver::new(vec![NutrientSource::Local(local_fixture().await)]);
    let records = resolver.resolve("Chicken Breast", 10).await;

    assert!(records.len() >= 3);
    assert_eq!(records[0].description, "Chicken Breast");
    // Offset 4 beats offset 8 regardless of description length.
    assert_eq!(records[1].description, "BBQ Chicken Breast Sandwich");
    assert_eq!(records[2].description, "Roasted Chicken Breast");
}

#[tokio::test]
async fn test_merge_spans_multiple_sources() {
    let resolver = NutrientResolver::new(vec![
        NutrientSource::Local(local_fixture().await),
        NutrientSource::Community(community_fixture().await),
    ]);
    let records = resolver.resolve("Chicken Breast", 10).await;

    let sources: Vec<SourceId> = records.iter().map(|r| r.source).collect();
    assert!(sources.contains(&SourceId::Generic));
    assert!(sources.contains(&SourceId::Community));
}

#[tokio::test]
async fn test_resolver_truncates_to_limit() {
    let resolver = NutrientResolver::new(vec![
        NutrientSource::Local(local_fixture().await),
        NutrientSource::Community(community_fixture().await),
    ]);
    let records = resolver.resolve("Chicken", 2).await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_resolver_with_failed_sources_still_answers() {
    let resolver = NutrientResolver::new(vec![
        NutrientSource::Local(LocalCatalog::unavailable()),
        NutrientSource::Community(community_fixture().await),
        NutrientSource::Remote(RemoteCatalog::new(RemoteConfig::default())),
    ]);
    let records = resolver.resolve("Brown Rice", 5).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, SourceId::Community);
}

#[tokio::test]
async fn test_unmatched_term_resolves_empty() {
    let resolver = NutrientResolver::new(vec![NutrientSource::Local(local_fixture().await)]);
    assert!(resolver.resolve("xylophone", 5).await.is_empty());
}
