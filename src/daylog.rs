// ABOUTME: Daily-log collaborator interface supplying consumed totals and logged foods
// ABOUTME: Markdown diet-log reader plus in-memory and empty implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Daily-log collaborator boundary.
//!
//! The engine never writes meal logs; it only reads what the logging
//! collaborator recorded. [`DailyLogSource`] is the seam: it supplies
//! today's already-consumed macro totals (feeding the remaining budget)
//! and per-day food entries (feeding history analysis). Both default to
//! "no history"; a missing log file is an ordinary state, not an error.
//!
//! [`MarkdownDietLog`] reads the collaborator's on-disk format: one
//! markdown file per day with `### Breakfast`-style meal headers,
//! unindented `- food name (qty)` entries, indented metadata lines, and
//! a `## Daily Totals` section.

use crate::models::{ConsumedTotals, MealSlot};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One logged food occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct FoodEntry {
    /// Logged food name (lowercased)
    pub name: String,
    /// Meal the food was logged under
    pub meal_type: MealSlot,
    /// Estimated calories of the meal this entry closed, when recorded
    pub calories: Option<f64>,
}

/// Supplies logged consumption per day.
///
/// Implementations must treat missing data as empty, never as an error.
pub trait DailyLogSource: Send + Sync {
    /// Macro totals already consumed on `date`
    fn consumed_totals(&self, date: NaiveDate) -> ConsumedTotals;

    /// Foods logged on `date`, in log order
    fn food_entries(&self, date: NaiveDate) -> Vec<FoodEntry>;
}

/// A log source with no data, the "no history" default
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyLog;

impl DailyLogSource for EmptyLog {
    fn consumed_totals(&self, _date: NaiveDate) -> ConsumedTotals {
        ConsumedTotals::default()
    }

    fn food_entries(&self, _date: NaiveDate) -> Vec<FoodEntry> {
        Vec::new()
    }
}

/// In-memory log source for tests and embedding callers
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    totals: HashMap<NaiveDate, ConsumedTotals>,
    entries: HashMap<NaiveDate, Vec<FoodEntry>>,
}

impl MemoryLog {
    /// Create an empty in-memory log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record consumed totals for a date
    pub fn set_totals(&mut self, date: NaiveDate, totals: ConsumedTotals) {
        self.totals.insert(date, totals);
    }

    /// Append a food entry for a date
    pub fn push_entry(&mut self, date: NaiveDate, entry: FoodEntry) {
        self.entries.entry(date).or_default().push(entry);
    }
}

impl DailyLogSource for MemoryLog {
    fn consumed_totals(&self, date: NaiveDate) -> ConsumedTotals {
        self.totals.get(&date).copied().unwrap_or_default()
    }

    fn food_entries(&self, date: NaiveDate) -> Vec<FoodEntry> {
        self.entries.get(&date).cloned().unwrap_or_default()
    }
}

/// Reads the markdown diet-log format (one `YYYY-MM-DD.md` file per day)
pub struct MarkdownDietLog {
    dir: PathBuf,
    meal_header: Regex,
    food_line: Regex,
    meal_calories: Regex,
    totals_line: Regex,
}

impl MarkdownDietLog {
    /// Create a reader over the given log directory
    #[allow(clippy::expect_used)] // Safe: patterns are static literals exercised by unit tests
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            meal_header: Regex::new(r"(?i)^### (Breakfast|Lunch|Dinner|Snack|Meal)")
                .expect("static pattern"),
            food_line: Regex::new(r"^- ([^(]+?)(?:\s*\(.*\))?\s*$").expect("static pattern"),
            meal_calories: Regex::new(r"(?i)Est\.\s*calories?:\s*~?([\d,]+)")
                .expect("static pattern"),
            totals_line: Regex::new(r"(?i)[-–—]\s*(Calories|Protein|Carbs|Fat|Sodium|Fiber):\s*~?\s*([\d.,]+)")
                .expect("static pattern"),
        }
    }

    /// Log directory this reader points at
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_day(&self, date: NaiveDate) -> Option<String> {
        let path = self.dir.join(format!("{}.md", date.format("%Y-%m-%d")));
        let content = std::fs::read_to_string(path).ok()?;
        // Ignore any previously appended health summary sections.
        let cutoff = content
            .find("## Daily Health Summary")
            .unwrap_or(content.len());
        Some(content[..cutoff].to_owned())
    }
}

impl DailyLogSource for MarkdownDietLog {
    fn consumed_totals(&self, date: NaiveDate) -> ConsumedTotals {
        let Some(content) = self.read_day(date) else {
            return ConsumedTotals::default();
        };
        let Some(totals_idx) = content.find("## Daily Totals") else {
            return ConsumedTotals::default();
        };
        let section = &content[totals_idx..];

        let mut totals = ConsumedTotals::default();
        for caps in self.totals_line.captures_iter(section) {
            let value = caps
                .get(2)
                .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
                .unwrap_or(0.0);
            match caps.get(1).map(|m| m.as_str().to_lowercase()).as_deref() {
                Some("calories") => totals.calories = value,
                Some("protein") => totals.protein_g = value,
                Some("carbs") => totals.carbs_g = value,
                Some("fat") => totals.fat_g = value,
                Some("sodium") => totals.sodium_mg = value,
                _ => {}
            }
        }
        totals
    }

    fn food_entries(&self, date: NaiveDate) -> Vec<FoodEntry> {
        let Some(content) = self.read_day(date) else {
            return Vec::new();
        };

        let mut entries: Vec<FoodEntry> = Vec::new();
        let mut current_meal = MealSlot::Meal;
        let mut in_meal_section = false;

        for line in content.lines() {
            if let Some(caps) = self.meal_header.captures(line) {
                current_meal = match caps
                    .get(1)
                    .map(|m| m.as_str().to_lowercase())
                    .as_deref()
                {
                    Some("breakfast") => MealSlot::Breakfast,
                    Some("lunch") => MealSlot::Lunch,
                    Some("dinner") => MealSlot::Dinner,
                    Some("snack") => MealSlot::Snack,
                    _ => MealSlot::Meal,
                };
                in_meal_section = true;
                continue;
            }

            // Indented lines are per-meal metadata; attach the estimated
            // calories to the entry that closed the meal.
            if line.starts_with("  ") {
                if let Some(caps) = self.meal_calories.captures(line) {
                    if let Some(last) = entries.last_mut() {
                        last.calories = caps
                            .get(1)
                            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok());
                    }
                }
                continue;
            }

            if line.starts_with("## ") {
                // Daily Totals or another non-meal section: its list items
                // are not foods.
                in_meal_section = false;
                continue;
            }

            if !in_meal_section {
                continue;
            }

            if let Some(caps) = self.food_line.captures(line) {
                let name = caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_lowercase())
                    .unwrap_or_default();
                if !name.is_empty() {
                    entries.push(FoodEntry {
                        name,
                        meal_type: current_meal,
                        calories: None,
                    });
                }
            }
        }

        entries
    }
}
