// ABOUTME: Nutriplan CLI - analyze meals, search catalogs, and get meal suggestions
// ABOUTME: Thin driver over the library engine; all behavior lives in the library
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Usage:
//! ```bash
//! # Analyze a meal description
//! nutriplan analyze "200g chicken breast and a cup of rice for lunch"
//!
//! # Search the nutrient catalogs
//! nutriplan search "chicken breast" --limit 5
//!
//! # Suggest meals for the next slot
//! nutriplan suggest --meal-type dinner --count 5
//!
//! # Show the remaining macro budget
//! nutriplan remaining
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nutriplan::allergens::AllergenMap;
use nutriplan::config::EngineConfig;
use nutriplan::daylog::MarkdownDietLog;
use nutriplan::errors::{AppError, AppResult};
use nutriplan::history::{CuisineMap, HistoryAnalyzer};
use nutriplan::lexicon::FoodLexicon;
use nutriplan::logging::{self, LoggingConfig};
use nutriplan::models::{MealSlot, QuantityUnit, RemainingBudget};
use nutriplan::parser::MealTextParser;
use nutriplan::planner::MealPlanner;
use nutriplan::shortcuts::ShortcutStore;
use nutriplan::sources::NutrientResolver;
use nutriplan::templates::TemplateStore;
use nutriplan::MealAnalyzer;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "nutriplan",
    about = "Nutrition resolution and meal recommendation engine",
    long_about = "Parses free-text meal descriptions into macro totals and suggests meals \
                  against remaining daily targets."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Analyze a meal description into macro totals
    Analyze {
        /// Meal description, e.g. "200g chicken breast and a cup of rice"
        text: Vec<String>,

        /// Save the description as a named shortcut instead of analyzing
        #[arg(long)]
        save: Option<String>,
    },

    /// Search the nutrient catalogs for a food
    Search {
        /// Food term, e.g. "chicken breast"
        term: Vec<String>,

        /// Maximum results
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Suggest meals against the remaining macro budget
    Suggest {
        /// Meal type (breakfast, lunch, dinner, snack); inferred from the
        /// hour of day when omitted
        #[arg(long, value_name = "TYPE")]
        meal_type: Option<String>,

        /// Number of suggestions
        #[arg(long, default_value_t = 5)]
        count: usize,

        /// Date (YYYY-MM-DD); today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the remaining macro budget for today
    Remaining {
        /// Date (YYYY-MM-DD); today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(&LoggingConfig::from_env());
    let config = EngineConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { text, save } => analyze(&config, &text.join(" "), save).await,
        Command::Search { term, limit } => search(&config, &term.join(" "), limit).await,
        Command::Suggest {
            meal_type,
            count,
            date,
        } => suggest(&config, meal_type.as_deref(), count, date),
        Command::Remaining { date } => remaining(&config, date),
    }
}

async fn analyze(config: &EngineConfig, text: &str, save: Option<String>) -> Result<()> {
    if text.is_empty() {
        return Err(AppError::invalid_input("no meal description given"));
    }

    let mut shortcuts = ShortcutStore::load(&config.shortcuts_path);
    if let Some(name) = save {
        shortcuts.save(&name, text);
        println!("Saved '{name}' -> '{text}'");
        return Ok(());
    }

    let resolver = NutrientResolver::from_config(config).await;
    let analyzer = MealAnalyzer::new(
        MealTextParser::new(FoodLexicon::curated()),
        &resolver,
        shortcuts,
        AllergenMap::load(&config.allergen_map_path),
    );

    let analysis = analyzer.analyze(text, &config.profile).await;

    println!("Meal type: {}", analysis.meal_type);
    if let Some(time) = &analysis.meal_time {
        println!("Time: {time}");
    }

    if analysis.mentions.is_empty() {
        println!("No foods recognized");
        return Ok(());
    }

    println!("\nFoods detected:");
    for mention in &analysis.mentions {
        match mention.unit {
            QuantityUnit::Grams => println!("  - {} ({:.0}g)", mention.name, mention.quantity),
            QuantityUnit::Ounces => println!("  - {} ({:.0}oz)", mention.name, mention.quantity),
            _ => println!("  - {} (x{})", mention.name, mention.quantity),
        }
    }

    let totals = &analysis.totals;
    println!(
        "\nTotal: ~{:.0} kcal | ~{:.0}g protein | ~{:.0}g carbs | ~{:.0}g fat",
        totals.calories, totals.protein_g, totals.carbs_g, totals.fat_g
    );
    if totals.sodium_mg > 0.0 {
        println!("Sodium: ~{:.0}mg", totals.sodium_mg);
    }
    if totals.fiber_g > 0.0 {
        println!("Fiber: ~{:.0}g", totals.fiber_g);
    }
    if totals.beverages > 0 {
        println!("Hydration: {} beverage(s)", totals.beverages);
    }
    if !totals.unresolved_names.is_empty() {
        println!("Not found: {}", totals.unresolved_names.join(", "));
    }
    for warning in &analysis.warnings {
        println!("  !! {}", warning.message);
    }

    Ok(())
}

async fn search(config: &EngineConfig, term: &str, limit: usize) -> Result<()> {
    if term.is_empty() {
        return Err(AppError::invalid_input("no search term given"));
    }

    let resolver = NutrientResolver::from_config(config).await;
    let records = resolver.resolve(term, limit).await;

    if records.is_empty() {
        println!("No foods found for '{term}'");
        return Ok(());
    }

    for (i, record) in records.iter().enumerate() {
        println!(
            "{}. {} ({}, serving: {:.0}g)",
            i + 1,
            record.description,
            record.source,
            record.serving_grams
        );
        println!(
            "   {:.0} kcal | P: {:.0}g | C: {:.0}g | F: {:.0}g | Na: {:.0}mg",
            record.calories, record.protein_g, record.carbs_g, record.fat_g, record.sodium_mg
        );
    }

    Ok(())
}

fn build_planner(config: &EngineConfig) -> MealPlanner<MarkdownDietLog> {
    let history = HistoryAnalyzer::new(
        MarkdownDietLog::new(&config.diet_log_dir),
        CuisineMap::load(&config.cuisine_map_path),
    )
    .with_cache(&config.history_cache_path);

    MealPlanner::new(
        TemplateStore::load(&config.templates_path),
        config.profile.clone(),
        config.goals.clone(),
        history,
    )
}

fn parse_meal_slot(raw: &str) -> Option<MealSlot> {
    match raw.to_lowercase().as_str() {
        "breakfast" => Some(MealSlot::Breakfast),
        "lunch" => Some(MealSlot::Lunch),
        "dinner" => Some(MealSlot::Dinner),
        "snack" => Some(MealSlot::Snack),
        _ => None,
    }
}

fn suggest(
    config: &EngineConfig,
    meal_type: Option<&str>,
    count: usize,
    date: Option<NaiveDate>,
) -> Result<()> {
    let slot = match meal_type {
        Some(raw) => Some(parse_meal_slot(raw).ok_or_else(|| {
            AppError::invalid_input(format!(
                "unknown meal type '{raw}' (expected breakfast, lunch, dinner, or snack)"
            ))
        })?),
        None => None,
    };

    let planner = build_planner(config);
    let suggestions = planner.suggest(slot, count, date);

    if suggestions.is_empty() {
        println!("No meal suggestions available matching your preferences.");
        return Ok(());
    }

    print_budget(&suggestions[0].remaining);
    println!();

    for (i, suggestion) in suggestions.iter().enumerate() {
        let t = &suggestion.template;
        println!("{}. {} (score {:.3})", i + 1, t.name, suggestion.score);
        println!(
            "   ~{:.0} cal | {:.0}g protein | {:.0}g carbs | {:.0}g fat",
            t.calories, t.protein_g, t.carbs_g, t.fat_g
        );
        if let Some(prep) = t.prep_time_min {
            println!("   Prep: {prep} min");
        }
    }

    let relaxed = &suggestions[0].relaxed_filters;
    if !relaxed.is_empty() {
        let names: Vec<String> = relaxed.iter().map(ToString::to_string).collect();
        println!(
            "\nNote: some filters were relaxed ({}) to provide suggestions.",
            names.join(", ")
        );
    }

    Ok(())
}

fn remaining(config: &EngineConfig, date: Option<NaiveDate>) -> Result<()> {
    let planner = build_planner(config);
    print_budget(&planner.remaining(date));
    Ok(())
}

fn print_budget(budget: &RemainingBudget) {
    println!(
        "Remaining today: ~{:.0} cal, {:.0}g protein, {:.0}g carbs, {:.0}g fat",
        budget.calories, budget.protein_g, budget.carbs_g, budget.fat_g
    );
    println!(
        "Targets: {:.0} cal, {:.0}g protein, {:.0}mg sodium limit",
        budget.targets.calories, budget.targets.protein_g, budget.targets.sodium_limit_mg
    );
    println!("Meals remaining: {}", budget.meals_remaining);
    if budget.calories <= 0.0 {
        println!("Note: you've reached your calorie target for today.");
    }
}
