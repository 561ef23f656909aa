// ABOUTME: Saved-meal shortcut store expanding named meals into full descriptions
// ABOUTME: Whole-word, case-insensitive expansion applied before parsing; first match wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Saved-meal shortcuts.
//!
//! Users name recurring meals ("my usual lunch") and the analyzer expands
//! the name into its saved description before parsing. Matching is
//! case-insensitive on whole words; only the first matching shortcut
//! expands, so one expansion cannot trigger another.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name-to-description shortcut store
#[derive(Debug, Clone, Default)]
pub struct ShortcutStore {
    shortcuts: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl ShortcutStore {
    /// Build from explicit entries (names lowercased)
    #[must_use]
    pub fn new(shortcuts: BTreeMap<String, String>) -> Self {
        let shortcuts = shortcuts
            .into_iter()
            .map(|(name, expansion)| (name.to_lowercase(), expansion))
            .collect();
        Self {
            shortcuts,
            path: None,
        }
    }

    /// Load from a JSON file; missing or malformed files yield an empty store
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let shortcuts: BTreeMap<String, String> = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            shortcuts: shortcuts
                .into_iter()
                .map(|(name, expansion)| (name.to_lowercase(), expansion))
                .collect(),
            path: Some(path.to_path_buf()),
        }
    }

    /// Number of saved shortcuts
    #[must_use]
    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    /// Save a shortcut and persist the store when file-backed
    pub fn save(&mut self, name: &str, description: &str) {
        self.shortcuts
            .insert(name.to_lowercase(), description.to_owned());
        self.persist();
    }

    /// Expand the first shortcut whose name appears as a whole word in
    /// `text` (case-insensitive). Returns the text unchanged when nothing
    /// matches.
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        for (name, expansion) in &self.shortcuts {
            if let Some(range) = find_whole_word(&lowered, name) {
                let mut expanded = String::with_capacity(text.len() + expansion.len());
                expanded.push_str(&text[..range.0]);
                expanded.push_str(expansion);
                expanded.push_str(&text[range.1..]);
                return expanded;
            }
        }
        text.to_owned()
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let Ok(serialized) = serde_json::to_string_pretty(&self.shortcuts) else {
            return;
        };
        if let Err(err) = std::fs::write(path, serialized) {
            debug!(error = %err, "failed to persist meal shortcuts");
        }
    }
}

/// Locate `needle` in `haystack` as a whole word (both lowercased).
///
/// Returns the byte range of the match.
fn find_whole_word(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let mut search_from = 0;
    while let Some(offset) = haystack[search_from..].find(needle) {
        let start = search_from + offset;
        let end = start + needle.len();
        let before_ok = start == 0
            || haystack[..start]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = end == haystack.len()
            || haystack[end..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return Some((start, end));
        }
        search_from = end;
    }
    None
}
