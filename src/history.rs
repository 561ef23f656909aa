// ABOUTME: Meal history analysis with cuisine detection and typical-calorie patterns
// ABOUTME: Day-scoped JSON cache written with atomic replace so readers never see partial files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Meal history analysis.
//!
//! [`HistoryAnalyzer`] turns the daily-log collaborator's entries into the
//! inputs the suggestion scorer needs: recent food names, today's foods,
//! cuisines detected from ingredient substrings, and the typical calories
//! per meal slot. The whole analysis is recomputed from the logs and
//! cached per day; concurrent refreshes may race harmlessly because
//! recomputation is idempotent, and the cache file is replaced atomically
//! (write to a temporary path, then rename) so readers never observe a
//! partially written file.

use crate::daylog::DailyLogSource;
use crate::models::MealSlot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Days of logs analyzed for recent foods and cuisines
pub const DEFAULT_HISTORY_DAYS: u32 = 3;

/// Days of logs analyzed for typical per-meal-type calories
const TYPICAL_CALORIE_DAYS: u32 = 7;

/// Minimum data points before a typical-calorie figure is reported
const MIN_TYPICAL_SAMPLES: usize = 2;

/// One ingredient's cuisine association in the cuisine map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuisineHint {
    /// Cuisine the ingredient suggests
    pub cuisine: String,
    /// Confidence contributed by one occurrence, in (0, 1]
    pub confidence: f64,
}

/// Ingredient-substring to cuisine mapping
#[derive(Debug, Clone, Default)]
pub struct CuisineMap {
    hints: HashMap<String, CuisineHint>,
}

impl CuisineMap {
    /// Build from explicit entries
    #[must_use]
    pub fn new(hints: HashMap<String, CuisineHint>) -> Self {
        Self { hints }
    }

    /// Load from a JSON file mapping ingredient to `{cuisine, confidence}`.
    ///
    /// A missing or malformed file yields an empty map.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let hints = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { hints }
    }

    /// Detect cuisines from food names by ingredient substring matching.
    ///
    /// Confidence accumulates per cuisine across matched ingredients,
    /// capped at 1.0.
    #[must_use]
    pub fn detect(&self, food_names: &[String]) -> HashMap<String, f64> {
        if self.hints.is_empty() || food_names.is_empty() {
            return HashMap::new();
        }

        let haystack = food_names.join(" ").to_lowercase();
        let mut detected: HashMap<String, f64> = HashMap::new();
        for (ingredient, hint) in &self.hints {
            if haystack.contains(&ingredient.to_lowercase()) {
                let entry = detected.entry(hint.cuisine.clone()).or_insert(0.0);
                *entry = (*entry + hint.confidence).min(1.0);
            }
        }
        detected
    }

    /// Whether the map has any entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

/// History inputs consumed by the suggestion scorer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealHistory {
    /// Food names logged in the analyzed window (lowercased)
    pub recent_food_names: Vec<String>,
    /// Food names logged today (lowercased)
    pub today_food_names: Vec<String>,
    /// Cuisines detected from recent foods, with confidence
    pub detected_cuisines: HashMap<String, f64>,
    /// Average calories per meal slot, where enough data exists
    pub typical_calories: HashMap<MealSlot, f64>,
    /// Days of logs analyzed
    pub days_analyzed: u32,
    /// Date the analysis was built for (cache key)
    pub built_date: NaiveDate,
}

/// Builds and caches [`MealHistory`] from a daily-log source
pub struct HistoryAnalyzer<L: DailyLogSource> {
    log: L,
    cuisine_map: CuisineMap,
    cache_path: Option<PathBuf>,
    days: u32,
}

impl<L: DailyLogSource> HistoryAnalyzer<L> {
    /// Create an analyzer over the given log source and cuisine map
    #[must_use]
    pub fn new(log: L, cuisine_map: CuisineMap) -> Self {
        Self {
            log,
            cuisine_map,
            cache_path: None,
            days: DEFAULT_HISTORY_DAYS,
        }
    }

    /// Enable the day-scoped cache at the given path
    #[must_use]
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Override the analysis window
    #[must_use]
    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days.max(1);
        self
    }

    /// The underlying daily-log source
    #[must_use]
    pub fn log(&self) -> &L {
        &self.log
    }

    /// History for `today`, from cache when fresh, rebuilt otherwise.
    ///
    /// Never errors; cache read/write failures fall back to a fresh build.
    #[must_use]
    pub fn history(&self, today: NaiveDate) -> MealHistory {
        if let Some(cached) = self.load_cache(today) {
            return cached;
        }
        let history = self.build(today);
        self.store_cache(&history);
        history
    }

    /// Rebuild the analysis from the logs, bypassing the cache
    #[must_use]
    pub fn build(&self, today: NaiveDate) -> MealHistory {
        let mut recent_food_names = Vec::new();
        let mut today_food_names = Vec::new();

        for offset in 0..self.days {
            let date = today - chrono::Duration::days(i64::from(offset));
            for entry in self.log.food_entries(date) {
                if offset == 0 {
                    today_food_names.push(entry.name.clone());
                }
                recent_food_names.push(entry.name);
            }
        }

        let detected_cuisines = self.cuisine_map.detect(&recent_food_names);
        let typical_calories = self.typical_calories(today);

        MealHistory {
            recent_food_names,
            today_food_names,
            detected_cuisines,
            typical_calories,
            days_analyzed: self.days,
            built_date: today,
        }
    }

    /// Average calories per meal slot over the typical-calorie window.
    ///
    /// A slot is reported only with at least two days of data.
    fn typical_calories(&self, today: NaiveDate) -> HashMap<MealSlot, f64> {
        let slots = [
            MealSlot::Breakfast,
            MealSlot::Lunch,
            MealSlot::Dinner,
            MealSlot::Snack,
        ];
        let mut samples: HashMap<MealSlot, Vec<f64>> = HashMap::new();

        for offset in 0..TYPICAL_CALORIE_DAYS {
            let date = today - chrono::Duration::days(i64::from(offset));
            let entries = self.log.food_entries(date);
            for slot in slots {
                let day_total: f64 = entries
                    .iter()
                    .filter(|e| e.meal_type == slot)
                    .filter_map(|e| e.calories)
                    .sum();
                if day_total > 0.0 {
                    samples.entry(slot).or_default().push(day_total);
                }
            }
        }

        samples
            .into_iter()
            .filter(|(_, values)| values.len() >= MIN_TYPICAL_SAMPLES)
            .map(|(slot, values)| {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                (slot, mean)
            })
            .collect()
    }

    fn load_cache(&self, today: NaiveDate) -> Option<MealHistory> {
        let path = self.cache_path.as_ref()?;
        let content = std::fs::read_to_string(path).ok()?;
        let cached: MealHistory = serde_json::from_str(&content).ok()?;
        (cached.built_date == today && cached.days_analyzed == self.days).then_some(cached)
    }

    /// Write the cache with atomic replace-on-write: serialize to a
    /// sibling temporary file, then rename over the final path.
    fn store_cache(&self, history: &MealHistory) {
        let Some(path) = self.cache_path.as_ref() else {
            return;
        };
        let Ok(serialized) = serde_json::to_string_pretty(history) else {
            return;
        };

        let tmp = path.with_extension("json.tmp");
        if let Err(err) = std::fs::write(&tmp, serialized) {
            debug!(error = %err, "history cache write failed");
            return;
        }
        if let Err(err) = std::fs::rename(&tmp, path) {
            debug!(error = %err, "history cache rename failed");
        }
    }
}
