// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show documents: the node graph plus baked scene geometry.
//!
//! The host exports each collection's point groups at the frames where
//! its geometry changes. Sampling a collection at a frame returns the
//! latest export at or before that frame.

use crate::app::{AppError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use skyweave_formation::{Formation, FormationSource, PointGroup};
use skyweave_graph::Graph;
use std::collections::BTreeMap;
use std::path::Path;

/// Point groups of every collection, keyed by frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Collection name to frame-keyed exports
    pub collections: IndexMap<String, BTreeMap<i32, Vec<PointGroup>>>,
}

#[allow(dead_code)] // Intentionally kept for API completeness
impl SceneSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the groups of `collection` from `frame` on
    pub fn insert(&mut self, collection: impl Into<String>, frame: i32, groups: Vec<PointGroup>) {
        self.collections
            .entry(collection.into())
            .or_default()
            .insert(frame, groups);
    }
}

impl FormationSource for SceneSnapshot {
    fn sample(&self, collection: &str, frame: i32) -> Option<Formation> {
        let keys = self.collections.get(collection)?;
        // Before the first export the collection already has its first shape
        let (_, groups) = keys
            .range(..=frame)
            .next_back()
            .or_else(|| keys.iter().next())?;
        Some(Formation::new(collection, frame, groups.clone()))
    }
}

/// Input of one show build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowDocument {
    /// Show graph
    pub graph: Graph,
    /// Baked collection geometry
    #[serde(default)]
    pub scene: SceneSnapshot,
}

impl ShowDocument {
    /// Load a document, as JSON for `.json` files and RON otherwise
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let document = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            ron::from_str(&content)?
        };
        Ok(document)
    }
}

/// Whether `path` has a `.json` extension
pub fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
