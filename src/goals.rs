// ABOUTME: Daily macro targets from user goals and remaining-budget derivation
// ABOUTME: Mifflin-St Jeor BMR with activity factors, goal adjustments, and hour-based meal inference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Goals and remaining macro budget.
//!
//! The calorie target comes from an explicit override when configured,
//! otherwise from the Mifflin-St Jeor equation (1990) scaled by an
//! activity factor and adjusted for the goal type. Protein scales with
//! body weight; carbs and fat take a fixed 40%/30% share of the calorie
//! target. When biometrics are missing, documented fallbacks apply
//! (2000 kcal, 75 g protein, 2300 mg sodium).

use crate::models::{ConsumedTotals, MacroTargets, RemainingBudget};
use serde::{Deserialize, Serialize};

/// Calorie target assumed when no goal data is configured
pub const DEFAULT_CALORIE_TARGET: f64 = 2000.0;

/// Protein target (g) assumed when body weight is unknown
pub const DEFAULT_PROTEIN_TARGET: f64 = 75.0;

/// Daily sodium ceiling (mg) per dietary guidelines
pub const DEFAULT_SODIUM_LIMIT: f64 = 2300.0;

/// Default protein intake per kilogram of body weight (DRI minimum)
pub const DEFAULT_PROTEIN_PER_KG: f64 = 0.8;

/// Biological sex for BMR calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// BMR constant +5
    #[default]
    Male,
    /// BMR constant -161
    Female,
}

/// Activity level for the TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise (x1.2)
    Sedentary,
    /// 1-3 days/week (x1.375)
    Light,
    /// 3-5 days/week (x1.55)
    #[default]
    Moderate,
    /// 6-7 days/week (x1.725)
    Active,
    /// Hard training twice daily (x1.9)
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier for this activity level
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

/// Goal type adjusting the calorie target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    /// Hold at TDEE
    #[default]
    Maintenance,
    /// 500 kcal deficit
    WeightLoss,
    /// 300 kcal surplus
    MuscleGain,
}

/// User goal configuration.
///
/// Every field has a workable default; a missing goals section yields
/// `Goals::default()` rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goals {
    /// Goal type adjusting the calorie target
    #[serde(default)]
    pub goal_type: GoalType,
    /// Body weight in kilograms
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Height in centimeters
    #[serde(default)]
    pub height_cm: Option<f64>,
    /// Age in years
    #[serde(default)]
    pub age: Option<u32>,
    /// Biological sex for the BMR formula
    #[serde(default)]
    pub sex: Sex,
    /// Activity level for the TDEE multiplier
    #[serde(default)]
    pub activity_level: ActivityLevel,
    /// Protein intake per kilogram of body weight
    #[serde(default = "default_protein_per_kg")]
    pub protein_per_kg: f64,
    /// Explicit calorie target, overriding the computed one
    #[serde(default)]
    pub calorie_target: Option<f64>,
    /// Daily sodium ceiling (mg)
    #[serde(default = "default_sodium_limit")]
    pub sodium_limit_mg: f64,
}

fn default_protein_per_kg() -> f64 {
    DEFAULT_PROTEIN_PER_KG
}

fn default_sodium_limit() -> f64 {
    DEFAULT_SODIUM_LIMIT
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            goal_type: GoalType::default(),
            weight_kg: None,
            height_cm: None,
            age: None,
            sex: Sex::default(),
            activity_level: ActivityLevel::default(),
            protein_per_kg: DEFAULT_PROTEIN_PER_KG,
            calorie_target: None,
            sodium_limit_mg: DEFAULT_SODIUM_LIMIT,
        }
    }
}

impl Goals {
    /// Daily calorie target.
    ///
    /// Explicit override wins; otherwise Mifflin-St Jeor BMR x activity
    /// factor, minus 500 kcal for weight loss or plus 300 kcal for muscle
    /// gain. `None` when biometrics are incomplete and no override is set.
    #[must_use]
    pub fn calorie_target(&self) -> Option<f64> {
        if let Some(explicit) = self.calorie_target {
            return Some(explicit);
        }

        let (weight, height, age) = (self.weight_kg?, self.height_cm?, self.age?);

        // Mifflin-St Jeor (1990): 10w + 6.25h - 5a + sex constant
        let sex_constant = match self.sex {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        };
        let bmr = 10.0_f64.mul_add(weight, 6.25 * height) - 5.0 * f64::from(age) + sex_constant;
        let tdee = bmr * self.activity_level.multiplier();

        let adjusted = match self.goal_type {
            GoalType::Maintenance => tdee,
            GoalType::WeightLoss => tdee - 500.0,
            GoalType::MuscleGain => tdee + 300.0,
        };
        Some(adjusted)
    }

    /// Daily macro targets with documented fallbacks.
    ///
    /// Carbs take 40% of calories at 4 kcal/g; fat 30% at 9 kcal/g.
    #[must_use]
    pub fn macro_targets(&self) -> MacroTargets {
        let calories = self.calorie_target().unwrap_or(DEFAULT_CALORIE_TARGET);
        let protein_g = self
            .weight_kg
            .map_or(DEFAULT_PROTEIN_TARGET, |weight| weight * self.protein_per_kg);

        MacroTargets {
            calories,
            protein_g,
            carbs_g: calories * 0.40 / 4.0,
            fat_g: calories * 0.30 / 9.0,
            sodium_limit_mg: self.sodium_limit_mg,
        }
    }

    /// Remaining macro budget after today's consumption, floored at zero
    #[must_use]
    pub fn remaining(&self, consumed: ConsumedTotals, hour: u32) -> RemainingBudget {
        let targets = self.macro_targets();
        RemainingBudget {
            calories: (targets.calories - consumed.calories).max(0.0),
            protein_g: (targets.protein_g - consumed.protein_g).max(0.0),
            carbs_g: (targets.carbs_g - consumed.carbs_g).max(0.0),
            fat_g: (targets.fat_g - consumed.fat_g).max(0.0),
            sodium_mg: (targets.sodium_limit_mg - consumed.sodium_mg).max(0.0),
            meals_remaining: meals_remaining(hour),
            targets,
            consumed,
        }
    }
}

/// Meals expected before the day ends, inferred from the hour of day:
/// before 10 all three main meals remain, before 14 two, after that one.
#[must_use]
pub fn meals_remaining(hour: u32) -> u32 {
    match hour {
        0..=9 => 3,
        10..=13 => 2,
        _ => 1,
    }
}
