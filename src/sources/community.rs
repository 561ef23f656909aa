// ABOUTME: Community embedded SQLite nutrient catalog adapter
// ABOUTME: Parses compact structured serving strings, defaulting to 100 g on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Community catalog adapter.
//!
//! A second embedded SQLite catalog with a single `community_foods` table.
//! Unlike the local catalog, its serving size is stored as a compact
//! structured string, either JSON like
//! `{"metric": {"quantity": 85, "unit": "g"}}` or plain text like
//! `"85 g"`. Anything unparseable falls back to the 100 g default serving.

use crate::models::{NutrientRecord, SourceId, DEFAULT_SERVING_GRAMS};
use regex::Regex;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, warn};

/// Adapter over the community embedded catalog
pub struct CommunityCatalog {
    pool: Option<SqlitePool>,
    serving_text: Regex,
}

impl CommunityCatalog {
    /// Open the catalog file read-only.
    ///
    /// Never fails: a missing or unopenable file yields a catalog that
    /// answers every query with no results.
    pub async fn open(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "community nutrient catalog not found");
            return Self::from_optional_pool(None);
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);
        match SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
        {
            Ok(pool) => Self::from_optional_pool(Some(pool)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open community nutrient catalog");
                Self::from_optional_pool(None)
            }
        }
    }

    /// Wrap an existing pool (test fixtures)
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::from_optional_pool(Some(pool))
    }

    /// A catalog with no backing store, contributing nothing
    #[must_use]
    pub fn unavailable() -> Self {
        Self::from_optional_pool(None)
    }

    #[allow(clippy::expect_used)] // Safe: pattern is a static literal exercised by unit tests
    fn from_optional_pool(pool: Option<SqlitePool>) -> Self {
        Self {
            pool,
            serving_text: Regex::new(r"(\d+(?:\.\d+)?)\s*g\b").expect("static pattern"),
        }
    }

    /// Search the catalog for names containing `term`.
    ///
    /// Degrades to empty on any failure; never errors.
    pub async fn query(&self, term: &str, limit: u32) -> Vec<NutrientRecord> {
        let Some(pool) = &self.pool else {
            return Vec::new();
        };

        let pattern = format!("%{term}%");
        let rows = match sqlx::query(
            "SELECT name, calories, protein, carbohydrates, total_fat, sodium, \
             dietary_fiber, serving \
             FROM community_foods WHERE name LIKE ? LIMIT ?",
        )
        .bind(&pattern)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await
        {
            Ok(rows) => rows,
            Err(err) => {
                debug!(error = %err, "community catalog query failed");
                return Vec::new();
            }
        };

        rows.iter()
            .filter_map(|row| self.row_to_record(row))
            .collect()
    }

    fn row_to_record(&self, row: &sqlx::sqlite::SqliteRow) -> Option<NutrientRecord> {
        let name: String = row.try_get::<Option<String>, _>("name").ok()??;
        if name.is_empty() {
            return None;
        }
        let calories = numeric(row, "calories")?;

        let serving: Option<String> = row.try_get::<Option<String>, _>("serving").ok().flatten();
        let serving_grams = self.parse_serving_grams(serving.as_deref());

        Some(NutrientRecord {
            description: name,
            calories,
            protein_g: numeric(row, "protein").unwrap_or(0.0),
            carbs_g: numeric(row, "carbohydrates").unwrap_or(0.0),
            fat_g: numeric(row, "total_fat").unwrap_or(0.0),
            sodium_mg: numeric(row, "sodium").unwrap_or(0.0),
            fiber_g: numeric(row, "dietary_fiber").unwrap_or(0.0),
            source: SourceId::Community,
            serving_grams,
        })
    }

    /// Parse the compact serving encoding to grams.
    ///
    /// JSON form first (`{"metric": {"quantity": 85, "unit": "g"}}`), then
    /// plain "85 g" text; 100 g when neither parses.
    fn parse_serving_grams(&self, serving: Option<&str>) -> f64 {
        let Some(text) = serving else {
            return DEFAULT_SERVING_GRAMS;
        };

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
            if let Some(quantity) = value
                .get("metric")
                .and_then(|metric| metric.get("quantity"))
                .and_then(serde_json::Value::as_f64)
            {
                return NutrientRecord::normalized_serving(Some(quantity));
            }
        }

        if let Some(grams) = self
            .serving_text
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            return NutrientRecord::normalized_serving(Some(grams));
        }

        DEFAULT_SERVING_GRAMS
    }
}

/// Fetch a numeric column leniently (REAL preferred, TEXT parsed)
fn numeric(row: &sqlx::sqlite::SqliteRow, column: &str) -> Option<f64> {
    if let Ok(Some(value)) = row.try_get::<Option<f64>, _>(column) {
        return Some(value);
    }
    row.try_get::<Option<String>, _>(column)
        .ok()
        .flatten()
        .and_then(|text| text.trim().parse::<f64>().ok())
}
