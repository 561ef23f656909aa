// ABOUTME: Meal template catalog loaded once from JSON and read-only per run
// ABOUTME: Missing or malformed catalogs yield an empty store, never an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Meal template store.
//!
//! The catalog file is a JSON document with a top-level `meals` array of
//! [`MealTemplate`] objects. It is owned and persisted by a collaborator;
//! the engine only reads it. Catalog order is meaningful: the suggestion
//! engine breaks score ties by it.

use crate::models::MealTemplate;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize, Default)]
struct CatalogFile {
    #[serde(default)]
    meals: Vec<MealTemplate>,
}

/// Read-only store of candidate meal templates
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: Vec<MealTemplate>,
}

impl TemplateStore {
    /// Build from explicit templates (tests, embedding callers)
    #[must_use]
    pub fn new(templates: Vec<MealTemplate>) -> Self {
        Self { templates }
    }

    /// Load the catalog from a JSON file.
    ///
    /// A missing or malformed file yields an empty store; the suggestion
    /// engine treats an empty catalog as "no suggestions", not an error.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let catalog = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<CatalogFile>(&content) {
                Ok(catalog) => catalog,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "meal template catalog malformed");
                    CatalogFile::default()
                }
            },
            Err(_) => {
                warn!(path = %path.display(), "meal template catalog not found");
                CatalogFile::default()
            }
        };
        Self {
            templates: catalog.meals,
        }
    }

    /// All templates, in catalog order
    #[must_use]
    pub fn templates(&self) -> &[MealTemplate] {
        &self.templates
    }

    /// Number of templates in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
