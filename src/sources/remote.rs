// ABOUTME: Remote USDA FoodData Central catalog adapter gated by an optional API key
// ABOUTME: Maps numeric nutrient codes to record fields; a missing key makes it a no-op
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Remote networked catalog adapter.
//!
//! Queries the USDA `FoodData` Central search endpoint. The adapter is a
//! no-op when no API key is configured. Nutrient values arrive as a flat
//! list keyed by numeric nutrient IDs; the subset this engine cares about
//! is mapped to record fields and everything else is ignored. Network
//! failures, non-success statuses, and malformed payloads all degrade to
//! an empty contribution; the resolver additionally bounds this adapter
//! with a timeout.
//!
//! API reference: <https://fdc.nal.usda.gov/api-guide.html>

use crate::models::{NutrientRecord, SourceId};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// USDA nutrient IDs for the fields this engine tracks
const NUTRIENT_ENERGY: u32 = 1008;
const NUTRIENT_PROTEIN: u32 = 1003;
const NUTRIENT_CARBS: u32 = 1005;
const NUTRIENT_FAT: u32 = 1004;
const NUTRIENT_SODIUM: u32 = 1093;
const NUTRIENT_FIBER: u32 = 1079;

/// Remote adapter configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API key; the adapter is a no-op when `None`
    pub api_key: Option<String>,
    /// Base URL for the `FoodData` Central API
    pub base_url: String,
    /// Request timeout applied to the HTTP client
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.nal.usda.gov/fdc/v1".to_owned(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Search response payload (fields we consume)
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodItem>,
}

#[derive(Debug, Deserialize)]
struct FoodItem {
    #[serde(default)]
    description: String,
    #[serde(rename = "servingSize")]
    serving_size: Option<f64>,
    #[serde(rename = "foodNutrients", default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrient {
    #[serde(rename = "nutrientId")]
    nutrient_id: Option<u32>,
    value: Option<f64>,
}

/// Adapter over the remote networked catalog
pub struct RemoteCatalog {
    config: RemoteConfig,
    http_client: reqwest::Client,
}

impl RemoteCatalog {
    /// Create the adapter. With no API key configured it answers every
    /// query with no results without touching the network.
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self {
            config,
            http_client,
        }
    }

    /// Whether a credential is configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config
            .api_key
            .as_ref()
            .is_some_and(|key| !key.is_empty())
    }

    /// Search the remote catalog for foods matching `term`.
    ///
    /// Degrades to empty on a missing credential, network failure, error
    /// status, or malformed payload; never errors.
    pub async fn query(&self, term: &str, limit: u32) -> Vec<NutrientRecord> {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            debug!("remote nutrient catalog disabled: no API key configured");
            return Vec::new();
        };

        let url = format!("{}/foods/search", self.config.base_url);
        let response = match self
            .http_client
            .get(&url)
            .query(&[
                ("query", term),
                ("pageSize", &limit.to_string()),
                ("api_key", api_key),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "remote nutrient lookup failed");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "remote nutrient lookup returned error status");
            return Vec::new();
        }

        let payload: SearchResponse = match response.json().await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "remote nutrient payload malformed");
                return Vec::new();
            }
        };

        payload
            .foods
            .into_iter()
            .filter_map(food_to_record)
            .collect()
    }
}

/// Convert one API food item to a record, skipping entries without a
/// description or with zero energy
fn food_to_record(food: FoodItem) -> Option<NutrientRecord> {
    if food.description.is_empty() {
        return None;
    }

    let mut calories = 0.0;
    let mut protein_g = 0.0;
    let mut carbs_g = 0.0;
    let mut fat_g = 0.0;
    let mut sodium_mg = 0.0;
    let mut fiber_g = 0.0;

    for nutrient in &food.food_nutrients {
        let value = nutrient.value.unwrap_or(0.0);
        match nutrient.nutrient_id {
            Some(NUTRIENT_ENERGY) => calories = value,
            Some(NUTRIENT_PROTEIN) => protein_g = value,
            Some(NUTRIENT_CARBS) => carbs_g = value,
            Some(NUTRIENT_FAT) => fat_g = value,
            Some(NUTRIENT_SODIUM) => sodium_mg = value,
            Some(NUTRIENT_FIBER) => fiber_g = value,
            _ => {}
        }
    }

    if calories <= 0.0 {
        return None;
    }

    Some(NutrientRecord {
        description: food.description,
        calories,
        protein_g,
        carbs_g,
        fat_g,
        sodium_mg,
        fiber_g,
        source: SourceId::Remote,
        serving_grams: NutrientRecord::normalized_serving(food.serving_size),
    })
}
