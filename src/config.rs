// ABOUTME: Environment-first engine configuration with JSON file merge and documented defaults
// ABOUTME: Malformed configuration never propagates; every field falls back to a workable default
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Engine configuration.
//!
//! Resolution order for each setting: environment variable, then the JSON
//! config file, then the built-in default. Malformed values fall back to
//! defaults with a warning; configuration problems degrade the engine,
//! they never crash it.

use crate::goals::Goals;
use crate::models::UserProfile;
use crate::sources::SourceKind;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Default enabled sources, in resolution order
const DEFAULT_SOURCES: [SourceKind; 3] =
    [SourceKind::Local, SourceKind::Community, SourceKind::Remote];

/// JSON config file sections
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    goals: Option<Goals>,
    #[serde(default)]
    profile: Option<UserProfile>,
    #[serde(default)]
    food_sources: Option<Vec<String>>,
    #[serde(default)]
    usda_api_key: Option<String>,
}

/// Fully resolved engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory for catalogs, maps, and caches
    pub data_dir: PathBuf,
    /// Local embedded catalog SQLite file
    pub local_catalog_path: PathBuf,
    /// Community embedded catalog SQLite file
    pub community_catalog_path: PathBuf,
    /// Meal template catalog JSON file
    pub templates_path: PathBuf,
    /// Ingredient-to-cuisine map JSON file
    pub cuisine_map_path: PathBuf,
    /// Allergen map JSON file
    pub allergen_map_path: PathBuf,
    /// Saved-meal shortcuts JSON file
    pub shortcuts_path: PathBuf,
    /// History cache JSON file (atomic replace-on-write)
    pub history_cache_path: PathBuf,
    /// Directory of daily markdown diet logs
    pub diet_log_dir: PathBuf,
    /// Enabled nutrient sources, in resolution order
    pub sources: Vec<SourceKind>,
    /// USDA FoodData Central API key; remote source is a no-op without it
    pub usda_api_key: Option<String>,
    /// Timeout applied to the remote source only
    pub remote_timeout: Duration,
    /// User goals (calorie/protein/sodium targets)
    pub goals: Goals,
    /// User dietary profile
    pub profile: UserProfile,
}

impl EngineConfig {
    /// Resolve configuration from the environment and the optional JSON
    /// config file (`NUTRIPLAN_CONFIG`, default `<data_dir>/config.json`).
    ///
    /// Never fails: every setting has a documented default and malformed
    /// values are replaced by it.
    #[must_use]
    pub fn from_env() -> Self {
        let data_dir = env::var("NUTRIPLAN_DATA_DIR").map_or_else(
            |_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("nutriplan")
            },
            PathBuf::from,
        );

        let config_path = env::var("NUTRIPLAN_CONFIG")
            .map_or_else(|_| data_dir.join("config.json"), PathBuf::from);
        let file = load_config_file(&config_path);

        let sources = env::var("NUTRIPLAN_FOOD_SOURCES")
            .ok()
            .map(|raw| parse_sources(raw.split(',')))
            .or_else(|| {
                file.food_sources
                    .as_ref()
                    .map(|tokens| parse_sources(tokens.iter().map(String::as_str)))
            })
            .filter(|parsed| !parsed.is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCES.to_vec());

        let usda_api_key = env::var("USDA_API_KEY")
            .ok()
            .or(file.usda_api_key)
            .filter(|key| !key.is_empty());

        let remote_timeout = env::var("NUTRIPLAN_REMOTE_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map_or(crate::sources::DEFAULT_REMOTE_TIMEOUT, Duration::from_secs);

        let diet_log_dir = env::var("NUTRIPLAN_DIET_DIR")
            .map_or_else(|_| data_dir.join("diet"), PathBuf::from);

        let local_catalog_path = env::var("NUTRIPLAN_LOCAL_DB")
            .map_or_else(|_| data_dir.join("food_catalog.sqlite"), PathBuf::from);
        let community_catalog_path = env::var("NUTRIPLAN_COMMUNITY_DB")
            .map_or_else(|_| data_dir.join("community_catalog.sqlite"), PathBuf::from);

        Self {
            local_catalog_path,
            community_catalog_path,
            templates_path: data_dir.join("meal_templates.json"),
            cuisine_map_path: data_dir.join("ingredient_cuisine_map.json"),
            allergen_map_path: data_dir.join("allergen_map.json"),
            shortcuts_path: data_dir.join("saved_meals.json"),
            history_cache_path: data_dir.join("meal_history_cache.json"),
            diet_log_dir,
            sources,
            usda_api_key,
            remote_timeout,
            goals: file.goals.unwrap_or_default(),
            profile: file.profile.unwrap_or_default(),
            data_dir,
        }
    }
}

fn load_config_file(path: &Path) -> ConfigFile {
    let Ok(content) = std::fs::read_to_string(path) else {
        return ConfigFile::default();
    };
    match serde_json::from_str(&content) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config file malformed, using defaults");
            ConfigFile::default()
        }
    }
}

/// Parse source tokens, dropping unknown names with a warning
fn parse_sources<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<SourceKind> {
    let mut parsed = Vec::new();
    for token in tokens {
        if token.trim().is_empty() {
            continue;
        }
        match SourceKind::parse(token) {
            Some(kind) if !parsed.contains(&kind) => parsed.push(kind),
            Some(_) => {}
            None => warn!(token, "unknown nutrient source in configuration, skipping"),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources_drops_unknown_and_duplicates() {
        let parsed = parse_sources("local, community, mystery, local".split(','));
        assert_eq!(parsed, vec![SourceKind::Local, SourceKind::Community]);
    }

    #[test]
    fn test_parse_sources_accepts_legacy_names() {
        let parsed = parse_sources("local_db,opennutrition,usda_api".split(','));
        assert_eq!(
            parsed,
            vec![SourceKind::Local, SourceKind::Community, SourceKind::Remote]
        );
    }

    #[test]
    fn test_config_file_missing_yields_defaults() {
        let file = load_config_file(Path::new("/nonexistent/config.json"));
        assert!(file.goals.is_none());
        assert!(file.profile.is_none());
    }

    #[test]
    fn test_config_file_malformed_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{broken").unwrap();
        let file = load_config_file(&path);
        assert!(file.goals.is_none());
    }

    #[test]
    fn test_config_file_sections_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "goals": {"calorie_target": 1800, "sodium_limit_mg": 2000},
                "profile": {"allergies": ["peanut"], "variety_mode": "explore"},
                "food_sources": ["local", "remote"]
            }"#,
        )
        .unwrap();
        let file = load_config_file(&path);
        let goals = file.goals.unwrap();
        assert_eq!(goals.calorie_target, Some(1800.0));
        let profile = file.profile.unwrap();
        assert_eq!(profile.allergies, ["peanut"]);
    }
}
