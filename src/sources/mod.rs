// ABOUTME: Nutrient source adapters and the concurrent resolver/merger over them
// ABOUTME: Closed adapter set (Local, Community, Remote) with uniform degrade-to-empty contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutriplan Contributors

//! Nutrient catalogs and resolution.
//!
//! Three adapters share one contract: `query(term, limit)` returns matching
//! [`NutrientRecord`]s and degrades to an empty vector on *any* failure
//! (missing backing store, malformed rows, absent credential, network
//! error, timeout). Nothing in this module returns an error to callers.
//!
//! The adapter set is closed: [`NutrientSource`] is a tagged union over the
//! three concrete catalogs, selected and ordered by configuration rather
//! than looked up by name at runtime.
//!
//! [`NutrientResolver`] fans out one query to every enabled adapter
//! concurrently. Only the remote adapter runs under a timeout, so a stalled
//! network source never delays embedded lookups; whatever has settled when
//! all futures complete is merged by relevance and truncated to the
//! caller's limit.

pub mod community;
pub mod local;
pub mod remote;

pub use community::CommunityCatalog;
pub use local::LocalCatalog;
pub use remote::{RemoteCatalog, RemoteConfig};

use crate::models::NutrientRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// How many candidates each adapter fetches before the merge pass
const PER_SOURCE_FETCH: u32 = 20;

/// Default timeout applied to the remote adapter only
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Names the adapters in the configured resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local embedded catalog (generic/branded/restaurant tables)
    Local,
    /// Community embedded catalog
    Community,
    /// Remote networked catalog
    Remote,
}

impl SourceKind {
    /// Parse a configuration token, ignoring unknown names
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "local" | "local_db" => Some(Self::Local),
            "community" | "opennutrition" => Some(Self::Community),
            "remote" | "usda" | "usda_api" => Some(Self::Remote),
            _ => None,
        }
    }
}

/// One enabled nutrient catalog.
///
/// A closed tagged union rather than a trait object: the adapter set is
/// fixed, and dispatch stays explicit and exhaustive.
pub enum NutrientSource {
    /// Local embedded catalog
    Local(LocalCatalog),
    /// Community embedded catalog
    Community(CommunityCatalog),
    /// Remote networked catalog
    Remote(RemoteCatalog),
}

impl NutrientSource {
    /// Which kind of catalog this is
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Local(_) => SourceKind::Local,
            Self::Community(_) => SourceKind::Community,
            Self::Remote(_) => SourceKind::Remote,
        }
    }

    /// Query this catalog. Degrades to empty on any failure; never errors.
    pub async fn query(&self, term: &str, limit: u32) -> Vec<NutrientRecord> {
        match self {
            Self::Local(catalog) => catalog.query(term, limit).await,
            Self::Community(catalog) => catalog.query(term, limit).await,
            Self::Remote(catalog) => catalog.query(term, limit).await,
        }
    }
}

/// Fans out queries to the enabled adapters and merges results by relevance
pub struct NutrientResolver {
    sources: Vec<NutrientSource>,
    remote_timeout: Duration,
}

impl NutrientResolver {
    /// Create a resolver over the given ordered adapter set
    #[must_use]
    pub fn new(sources: Vec<NutrientSource>) -> Self {
        Self {
            sources,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Assemble the resolver from configuration: open the embedded
    /// catalogs and wire the remote client, preserving the configured
    /// source order.
    pub async fn from_config(config: &crate::config::EngineConfig) -> Self {
        let mut sources = Vec::with_capacity(config.sources.len());
        for kind in &config.sources {
            let source = match kind {
                SourceKind::Local => {
                    NutrientSource::Local(LocalCatalog::open(&config.local_catalog_path).await)
                }
                SourceKind::Community => NutrientSource::Community(
                    CommunityCatalog::open(&config.community_catalog_path).await,
                ),
                SourceKind::Remote => NutrientSource::Remote(RemoteCatalog::new(RemoteConfig {
                    api_key: config.usda_api_key.clone(),
                    timeout: config.remote_timeout,
                    ..RemoteConfig::default()
                })),
            };
            sources.push(source);
        }
        Self::new(sources).with_remote_timeout(config.remote_timeout)
    }

    /// Override the remote-adapter timeout
    #[must_use]
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Number of enabled adapters
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Resolve a food term across all enabled adapters.
    ///
    /// Adapters run concurrently; the remote adapter is bounded by the
    /// configured timeout and contributes nothing when it fails or stalls.
    /// Results are ranked by relevance (position of the query substring in
    /// the description with absent ranking last, then description length) and
    /// truncated to `limit`. Never errors; no enabled adapters or no
    /// matches yield an empty vector.
    pub async fn resolve(&self, term: &str, limit: usize) -> Vec<NutrientRecord> {
        if limit == 0 || self.sources.is_empty() {
            return Vec::new();
        }

        let fetches = self.sources.iter().map(|source| {
            let timeout = self.remote_timeout;
            async move {
                match source {
                    NutrientSource::Remote(_) => {
                        match tokio::time::timeout(timeout, source.query(term, PER_SOURCE_FETCH))
                            .await
                        {
                            Ok(records) => records,
                            Err(_) => {
                                debug!(term, "remote nutrient lookup timed out");
                                Vec::new()
                            }
                        }
                    }
                    _ => source.query(term, PER_SOURCE_FETCH).await,
                }
            }
        });

        let mut merged: Vec<NutrientRecord> = futures_util::future::join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .collect();

        rank_by_relevance(&mut merged, term);
        merged.truncate(limit);
        merged
    }
}

/// Sort records by relevance to the query: earliest occurrence of the query
/// substring in the description first (absent ranks last), shorter
/// descriptions breaking ties. The sort is stable, so equal keys keep the
/// configured source order.
fn rank_by_relevance(records: &mut [NutrientRecord], term: &str) {
    let needle = term.to_lowercase();
    records.sort_by_key(|record| {
        let description = record.description.to_lowercase();
        let position = description.find(&needle).unwrap_or(usize::MAX);
        (position, record.description.len())
    });
}
