// SPDX-License-Identifier: MIT OR Apache-2.0
//! Formations as collections of host point groups.

use crate::point_set::PointSet;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Points contributed by one host object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointGroup {
    /// Host object name
    pub object: String,
    /// The object's points and attributes
    pub points: PointSet,
}

impl PointGroup {
    /// Create a group without attributes
    pub fn new(object: impl Into<String>, positions: Vec<Vec3>) -> Self {
        Self {
            object: object.into(),
            points: PointSet::new(positions),
        }
    }
}

/// Snapshot of a collection's points at one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    /// Source collection
    pub collection: String,
    /// Frame the snapshot was taken at
    pub frame: i32,
    /// Constituent point groups, in host order
    pub groups: Vec<PointGroup>,
}

impl Formation {
    /// Create a formation
    pub fn new(collection: impl Into<String>, frame: i32, groups: Vec<PointGroup>) -> Self {
        Self {
            collection: collection.into(),
            frame,
            groups,
        }
    }

    /// Total number of points
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|g| g.points.len()).sum()
    }

    /// Group indices sorted by object name
    fn canonical_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.groups.len()).collect();
        order.sort_by(|a, b| self.groups[*a].object.cmp(&self.groups[*b].object));
        order
    }

    /// Concatenate all groups in object-name order.
    ///
    /// An attribute array is kept only if every group carries it at the
    /// right length.
    pub fn flatten(&self) -> PointSet {
        let order = self.canonical_order();
        let mut positions = Vec::with_capacity(self.point_count());
        let mut pair_id = Some(Vec::with_capacity(self.point_count()));
        let mut formation_id = Some(Vec::with_capacity(self.point_count()));

        for index in order {
            let points = &self.groups[index].points;
            positions.extend_from_slice(&points.positions);
            append_ids(&mut pair_id, points.pair_ids(), points.len());
            append_ids(&mut formation_id, points.formation_ids(), points.len());
        }

        PointSet {
            positions,
            pair_id,
            formation_id,
        }
    }

    /// Write the attribute arrays of a flattened set back to the groups.
    ///
    /// `set` must come from [`Formation::flatten`] on this formation.
    /// Returns false, leaving the groups untouched, if the sizes differ.
    pub fn scatter(&mut self, set: &PointSet) -> bool {
        if set.len() != self.point_count() {
            return false;
        }

        let mut offset = 0;
        for index in self.canonical_order() {
            let points = &mut self.groups[index].points;
            let range = offset..offset + points.len();
            if let Some(ids) = set.pair_ids() {
                points.pair_id = ids.get(range.clone()).map(<[u32]>::to_vec);
            }
            if let Some(ids) = set.formation_ids() {
                points.formation_id = ids.get(range.clone()).map(<[u32]>::to_vec);
            }
            offset = range.end;
        }
        true
    }
}

fn append_ids(target: &mut Option<Vec<u32>>, ids: Option<&[u32]>, len: usize) {
    match (target.as_mut(), ids) {
        (Some(all), Some(ids)) if ids.len() == len => all.extend_from_slice(ids),
        _ => *target = None,
    }
}

/// Host scene access for formation snapshots
pub trait FormationSource {
    /// World-space points of `collection` at `frame`, if the collection exists
    fn sample(&self, collection: &str, frame: i32) -> Option<Formation>;
}
