// ABOUTME: Library entry point for the nutriplan nutrition and meal-recommendation engine
// ABOUTME: Exposes parsing, nutrient resolution, macro aggregation, and meal suggestion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

#![deny(unsafe_code)]

//! # Nutriplan
//!
//! A nutrition-resolution and meal-recommendation engine. Free-text food
//! descriptions become structured quantities, get reconciled against
//! several heterogeneous nutrient catalogs into one macro total, and meal
//! candidates are recommended under hard safety constraints and soft,
//! progressively-relaxable preference constraints with a multi-factor
//! weighted score.
//!
//! ## Architecture
//!
//! - **Lexicon + Parser**: a fixed curated vocabulary and a two-pass span
//!   scanner turning text into non-overlapping [`models::FoodMention`]s.
//! - **Sources + Resolver**: three catalog adapters (local SQLite,
//!   community SQLite, remote USDA) behind one degrade-to-empty contract,
//!   fanned out concurrently and merged by relevance.
//! - **Aggregator**: serving-aware scaling of resolved records into
//!   [`models::MacroTotals`], tracking unresolved names.
//! - **Planner**: hard/soft constraint filtering with progressive
//!   relaxation, a ten-factor variety-mode scorer, and top-N ranking.
//!
//! Nothing in this engine is fatal to the caller: unparseable text,
//! unavailable catalogs, unsatisfiable constraints, and malformed
//! configuration all degrade to renderable results.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutriplan::lexicon::FoodLexicon;
//! use nutriplan::parser::MealTextParser;
//!
//! let parser = MealTextParser::new(FoodLexicon::curated());
//! let mentions = parser.parse("200g chicken breast and a cup of rice");
//! assert_eq!(mentions.len(), 2);
//! ```

/// Macro aggregation combining mentions with resolved nutrient records
pub mod aggregator;

/// Allergen detection against the user's allergy list
pub mod allergens;

/// End-to-end meal analysis facade
pub mod analysis;

/// Environment-first engine configuration
pub mod config;

/// Daily-log collaborator interface and implementations
pub mod daylog;

/// Unified error handling
pub mod errors;

/// Daily macro targets and remaining-budget derivation
pub mod goals;

/// Meal history analysis with day-scoped caching
pub mod history;

/// Unit/quantity lexicon and curated food vocabulary
pub mod lexicon;

/// Structured logging configuration
pub mod logging;

/// Shared domain models
pub mod models;

/// Free-text food parsing
pub mod parser;

/// Meal suggestion engine (filtering, scoring, orchestration)
pub mod planner;

/// Saved-meal shortcut store
pub mod shortcuts;

/// Nutrient catalogs and the concurrent resolver
pub mod sources;

/// Meal template store
pub mod templates;

pub use aggregator::MacroAggregator;
pub use analysis::{MealAnalysis, MealAnalyzer};
pub use errors::{AppError, AppResult, ErrorCode};
pub use models::{FoodMention, MacroTotals, MealTemplate, NutrientRecord, UserProfile};
pub use parser::MealTextParser;
pub use planner::{MealPlanner, Suggestion};
pub use sources::NutrientResolver;
