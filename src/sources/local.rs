// ABOUTME: Local embedded SQLite nutrient catalog spanning generic, branded, and restaurant tables
// ABOUTME: Each table carries its own serving-unit normalization to grams; degrades to empty on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Local embedded catalog adapter.
//!
//! The local catalog is a read-only SQLite file with three differently
//! shaped tables:
//!
//! - `generic_foods`: unbranded staples; serving size already in grams,
//!   no sodium column.
//! - `branded_foods`: packaged products; serving size plus a unit column.
//! - `restaurant_items`: menu items; serving size plus a unit column.
//!
//! A missing database file, a failed connection, a missing table, or a
//! malformed row each degrade to an empty contribution. Per-table failures
//! are independent: a corrupt `branded_foods` still leaves generic and
//! restaurant results intact.

use crate::models::{NutrientRecord, SourceId, GRAMS_PER_OUNCE};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, warn};

/// Per-table shape of the local catalog
#[derive(Debug, Clone, Copy)]
enum TableShape {
    /// Serving size already in grams; no sodium column
    GramsOnly,
    /// Serving size paired with a unit column
    SizeWithUnit,
}

/// Tables queried, in order, with their source tag and shape
const TABLES: &[(&str, SourceId, TableShape)] = &[
    ("generic_foods", SourceId::Generic, TableShape::GramsOnly),
    ("branded_foods", SourceId::Branded, TableShape::SizeWithUnit),
    (
        "restaurant_items",
        SourceId::Restaurant,
        TableShape::SizeWithUnit,
    ),
];

/// Adapter over the local embedded SQLite catalog
pub struct LocalCatalog {
    pool: Option<SqlitePool>,
}

impl LocalCatalog {
    /// Open the catalog file read-only.
    ///
    /// Never fails: a missing or unopenable file yields a catalog that
    /// answers every query with no results.
    pub async fn open(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "local nutrient catalog not found");
            return Self { pool: None };
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);
        match SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
        {
            Ok(pool) => Self { pool: Some(pool) },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open local nutrient catalog");
                Self { pool: None }
            }
        }
    }

    /// Wrap an existing pool (test fixtures)
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool: Some(pool) }
    }

    /// A catalog with no backing store, contributing nothing
    #[must_use]
    pub fn unavailable() -> Self {
        Self { pool: None }
    }

    /// Search all three tables for descriptions containing `term`.
    ///
    /// Returns up to `limit` rows per table. Degrades to empty on any
    /// failure; never errors.
    pub async fn query(&self, term: &str, limit: u32) -> Vec<NutrientRecord> {
        let Some(pool) = &self.pool else {
            return Vec::new();
        };

        let pattern = format!("%{term}%");
        let mut records = Vec::new();

        for &(table, source, shape) in TABLES {
            let sql = match shape {
                TableShape::GramsOnly => format!(
                    "SELECT description, calories, protein_g, carbs_g, fat_g, fiber_g, \
                     serving_grams \
                     FROM {table} WHERE description LIKE ? LIMIT ?"
                ),
                TableShape::SizeWithUnit => format!(
                    "SELECT description, calories, protein_g, carbs_g, fat_g, sodium_mg, \
                     fiber_g, serving_size, serving_size_unit \
                     FROM {table} WHERE description LIKE ? LIMIT ?"
                ),
            };

            let rows = match sqlx::query(&sql)
                .bind(&pattern)
                .bind(i64::from(limit))
                .fetch_all(pool)
                .await
            {
                Ok(rows) => rows,
                Err(err) => {
                    debug!(table, error = %err, "local catalog table query failed");
                    continue;
                }
            };

            for row in rows {
                if let Some(record) = row_to_record(&row, source, shape) {
                    records.push(record);
                }
            }
        }

        records
    }
}

/// Map one row to a record, skipping rows with no description or calories
fn row_to_record(
    row: &sqlx::sqlite::SqliteRow,
    source: SourceId,
    shape: TableShape,
) -> Option<NutrientRecord> {
    let description: String = row.try_get::<Option<String>, _>("description").ok()??;
    if description.is_empty() {
        return None;
    }
    let calories = numeric(row, "calories")?;
    if calories <= 0.0 {
        return None;
    }

    let serving_grams = match shape {
        TableShape::GramsOnly => NutrientRecord::normalized_serving(numeric(row, "serving_grams")),
        TableShape::SizeWithUnit => {
            let size = numeric(row, "serving_size");
            let unit: Option<String> = row
                .try_get::<Option<String>, _>("serving_size_unit")
                .ok()
                .flatten();
            normalize_serving(size, unit.as_deref())
        }
    };

    let sodium_mg = match shape {
        TableShape::GramsOnly => 0.0,
        TableShape::SizeWithUnit => numeric(row, "sodium_mg").unwrap_or(0.0),
    };

    Some(NutrientRecord {
        description,
        calories,
        protein_g: numeric(row, "protein_g").unwrap_or(0.0),
        carbs_g: numeric(row, "carbs_g").unwrap_or(0.0),
        fat_g: numeric(row, "fat_g").unwrap_or(0.0),
        sodium_mg,
        fiber_g: numeric(row, "fiber_g").unwrap_or(0.0),
        source,
        serving_grams,
    })
}

/// Fetch a numeric column leniently: REAL preferred, TEXT parsed as a
/// fallback (imported catalogs are not always consistently typed)
fn numeric(row: &sqlx::sqlite::SqliteRow, column: &str) -> Option<f64> {
    if let Ok(Some(value)) = row.try_get::<Option<f64>, _>(column) {
        return Some(value);
    }
    row.try_get::<Option<String>, _>(column)
        .ok()
        .flatten()
        .and_then(|text| text.trim().parse::<f64>().ok())
}

/// Convert a serving size + unit pair to grams.
///
/// ml and gram variants pass through; ounces convert at 28.35 g/oz; any
/// other unit is treated as grams. Missing sizes fall back to 100 g.
fn normalize_serving(size: Option<f64>, unit: Option<&str>) -> f64 {
    let raw = NutrientRecord::normalized_serving(size);
    match unit.map(|u| u.trim().to_lowercase()) {
        Some(u) if matches!(u.as_str(), "oz" | "ounce" | "ounces") => raw * GRAMS_PER_OUNCE,
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_serving_units() {
        assert!((normalize_serving(Some(240.0), Some("ml")) - 240.0).abs() < f64::EPSILON);
        assert!((normalize_serving(Some(100.0), Some("g")) - 100.0).abs() < f64::EPSILON);
        assert!((normalize_serving(Some(3.0), Some("oz")) - 85.05).abs() < 1e-9);
        // Unknown units are assumed grams
        assert!((normalize_serving(Some(50.0), Some("packet")) - 50.0).abs() < f64::EPSILON);
        // Missing size falls back to the default serving
        assert!((normalize_serving(None, Some("g")) - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_database_yields_empty() {
        let catalog = LocalCatalog::open(Path::new("/nonexistent/food.sqlite")).await;
        assert!(catalog.query("chicken", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_catalog_yields_empty() {
        let catalog = LocalCatalog::unavailable();
        assert!(catalog.query("anything", 5).await.is_empty());
    }
}
