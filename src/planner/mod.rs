// ABOUTME: Meal suggestion orchestrator composing filter, score, and rank into top-N results
// ABOUTME: Stateless per call; empty catalogs and unsatisfiable constraints yield empty lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Meal suggestion engine.
//!
//! [`MealPlanner`] composes the pieces: derive the remaining macro budget
//! from goals and today's log, filter the template catalog (hard filters
//! fixed, soft filters progressively relaxed), score every survivor with
//! the variety-mode weight profile, and return the top N sorted by score
//! with catalog order breaking ties.
//!
//! Every call is stateless. An empty catalog or a post-filter set that is
//! empty even after full relaxation yields an empty list, never an error.

pub mod filters;
pub mod scoring;

pub use filters::{filter_templates, FilterContext, FilterOutcome, SoftFilter, MIN_RESULTS};
pub use scoring::{score_template, ScoreContext, ScoringWeights, WEIGHT_SUM_TOLERANCE};

use crate::daylog::DailyLogSource;
use crate::goals::Goals;
use crate::history::HistoryAnalyzer;
use crate::models::{MealSlot, MealTemplate, RemainingBudget, Season, UserProfile};
use crate::templates::TemplateStore;
use chrono::{Local, NaiveDate, Timelike};
use rand::Rng;
use std::cmp::Ordering;
use tracing::debug;

/// One ranked suggestion
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggested template
    pub template: MealTemplate,
    /// Weighted score in [0, 1]; higher is better
    pub score: f64,
    /// Soft categories relaxed to produce this result set
    pub relaxed_filters: Vec<SoftFilter>,
    /// The remaining-budget snapshot the scores were computed against
    pub remaining: RemainingBudget,
}

/// Meal suggestion engine over a template catalog, user profile, goals,
/// and the history/daily-log collaborators
pub struct MealPlanner<L: DailyLogSource> {
    templates: TemplateStore,
    profile: UserProfile,
    goals: Goals,
    history: HistoryAnalyzer<L>,
}

impl<L: DailyLogSource> MealPlanner<L> {
    /// Create a planner
    #[must_use]
    pub fn new(
        templates: TemplateStore,
        profile: UserProfile,
        goals: Goals,
        history: HistoryAnalyzer<L>,
    ) -> Self {
        Self {
            templates,
            profile,
            goals,
            history,
        }
    }

    /// The template catalog
    #[must_use]
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Remaining macro budget for `date` at the current hour
    #[must_use]
    pub fn remaining(&self, date: Option<NaiveDate>) -> RemainingBudget {
        let now = Local::now();
        let date = date.unwrap_or_else(|| now.date_naive());
        self.remaining_at(date, now.hour())
    }

    /// Remaining macro budget for `date` at an explicit hour
    #[must_use]
    pub fn remaining_at(&self, date: NaiveDate, hour: u32) -> RemainingBudget {
        let consumed = self.history.log().consumed_totals(date);
        self.goals.remaining(consumed, hour)
    }

    /// Suggest meals for the current moment.
    ///
    /// `meal_type` defaults to the slot implied by the hour of day and
    /// `date` to today. Uses the thread-local RNG for the tie-break
    /// factor; [`Self::suggest_at`] gives tests full control.
    #[must_use]
    pub fn suggest(
        &self,
        meal_type: Option<MealSlot>,
        count: usize,
        date: Option<NaiveDate>,
    ) -> Vec<Suggestion> {
        let now = Local::now();
        let date = date.unwrap_or_else(|| now.date_naive());
        self.suggest_at(meal_type, count, date, now.hour(), &mut rand::thread_rng())
    }

    /// Suggest meals with explicit date, hour, and RNG.
    ///
    /// Never errors: an empty catalog or an unsatisfiable constraint set
    /// yields an empty list carrying no suggestions.
    #[must_use]
    pub fn suggest_at<R: Rng + ?Sized>(
        &self,
        meal_type: Option<MealSlot>,
        count: usize,
        date: NaiveDate,
        hour: u32,
        rng: &mut R,
    ) -> Vec<Suggestion> {
        if self.templates.is_empty() || count == 0 {
            return Vec::new();
        }

        let slot = meal_type.unwrap_or_else(|| slot_for_hour(hour));
        let remaining = self.remaining_at(date, hour);
        let history = self.history.history(date);

        use chrono::Datelike;
        let outcome = filter_templates(
            self.templates.templates(),
            &FilterContext {
                profile: &self.profile,
                meal_type: Some(slot),
                season: Season::for_month(date.month()),
            },
        );
        if outcome.templates.is_empty() {
            debug!(%slot, "no templates survive filtering, even fully relaxed");
            return Vec::new();
        }

        let weights = ScoringWeights::for_mode(self.profile.variety_mode).validated();
        let ctx = ScoreContext {
            remaining: &remaining,
            profile: &self.profile,
            history: &history,
        };

        let mut scored: Vec<(&MealTemplate, f64)> = outcome
            .templates
            .iter()
            .map(|template| (*template, score_template(template, &ctx, &weights, rng)))
            .collect();

        // Descending by score; the stable sort keeps catalog order on ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(count)
            .map(|(template, score)| Suggestion {
                template: template.clone(),
                score,
                relaxed_filters: outcome.relaxed.clone(),
                remaining,
            })
            .collect()
    }
}

/// Meal slot implied by the hour of day
#[must_use]
pub fn slot_for_hour(hour: u32) -> MealSlot {
    match hour {
        0..=9 => MealSlot::Breakfast,
        10..=13 => MealSlot::Lunch,
        14..=17 => MealSlot::Dinner,
        _ => MealSlot::Snack,
    }
}
