// SPDX-License-Identifier: MIT OR Apache-2.0
//! Formation point clouds for Skyweave.
//!
//! Between consecutive formations of a show, every point of the next
//! formation is matched to a point of the previous one, and the drone
//! identity travels along that match.
//!
//! ## Architecture
//!
//! - [`PointSet`]: positions with `pair_id` and `formation_id` arrays
//! - [`Formation`]: named point groups flattened in object-name order
//! - [`KdTree`]: nearest-neighbor queries for greedy pairing
//! - [`solve`]: exact minimum-cost assignment
//! - [`CorrespondenceEngine`]: greedy or optimal pairing under a
//!   directional movement cost
//! - [`identity`]: initial identities and propagation

pub mod point_set;
pub mod formation;
pub mod spatial;
pub mod assignment;
pub mod correspondence;
pub mod identity;

pub use point_set::{bounds_of, identity_permutation, is_permutation, PointSet};
pub use formation::{Formation, FormationSource, PointGroup};
pub use spatial::KdTree;
pub use assignment::{solve, Assignment, AssignmentError, CostMatrix, DEFAULT_MAX_POINTS};
pub use correspondence::{
    cost_matrix, pair_greedy, pair_optimal, Correspondence, CorrespondenceEngine,
    CorrespondenceError, CostWeights, PairingStrategy,
};
pub use identity::{assign_initial, assign_initial_formation, propagate};
