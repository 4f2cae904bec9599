// SPDX-License-Identifier: MIT OR Apache-2.0
//! Point correspondence between consecutive formations.
//!
//! Two strategies connect a previous point set to the next one:
//! - [`PairingStrategy::Greedy`]: each next point, in its own order, takes
//!   the closest previous point not yet taken. Fast and order preserving,
//!   but not globally optimal.
//! - [`PairingStrategy::Optimal`]: minimum total [`CostWeights`] cost over
//!   all perfect matchings, solved exactly.
//!
//! Pairing only ever writes `pair_id`, as the index of the matching point
//! in the previous set. Identities are carried over separately by
//! [`crate::identity::propagate`].

use crate::assignment::{solve, AssignmentError, CostMatrix, DEFAULT_MAX_POINTS};
use crate::point_set::{bounds_of, PointSet};
use crate::spatial::KdTree;
use glam::{DVec3, Vec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Pairing algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairingStrategy {
    /// Nearest unclaimed neighbor, in next-set order
    Greedy,
    /// Exact minimum-cost assignment
    #[default]
    Optimal,
}

/// Weights of the directional movement cost.
///
/// For a move with `dy = next.y - prev.y` the cost is
/// `negative_y·max(-dy, 0) + positive_y·max(dy, 0) + lateral·(|dx| + |dz|)
/// + tie·|d|²`, on coordinates normalized to the shared bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Per unit of downward motion
    pub negative_y: f64,
    /// Per unit of upward motion
    pub positive_y: f64,
    /// Per unit of horizontal motion (x and z)
    pub lateral: f64,
    /// Per squared unit of total motion
    pub tie: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            negative_y: 1.0e6,
            positive_y: 1.0e3,
            lateral: 1.0,
            tie: 1.0e-3,
        }
    }
}

impl CostWeights {
    /// Cost of moving from `from` to `to`
    pub fn cost(&self, from: DVec3, to: DVec3) -> f64 {
        let d = to - from;
        self.negative_y * (-d.y).max(0.0)
            + self.positive_y * d.y.max(0.0)
            + self.lateral * (d.x.abs() + d.z.abs())
            + self.tie * d.length_squared()
    }
}

/// Matching between two equally sized point sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    /// Strategy that produced the matching
    pub strategy: PairingStrategy,
    /// For each next point, the index of its previous point
    pub next_to_prev: Vec<usize>,
    /// For each previous point, the index of its next point
    pub prev_to_next: Vec<usize>,
    /// Total assignment cost, for the optimal strategy
    pub total_cost: Option<f64>,
}

impl Correspondence {
    fn from_next_to_prev(
        strategy: PairingStrategy,
        next_to_prev: Vec<usize>,
        total_cost: Option<f64>,
    ) -> Self {
        let mut prev_to_next = vec![0; next_to_prev.len()];
        for (next, prev) in next_to_prev.iter().enumerate() {
            prev_to_next[*prev] = next;
        }
        Self {
            strategy,
            next_to_prev,
            prev_to_next,
            total_cost,
        }
    }

    /// Number of matched points
    pub fn len(&self) -> usize {
        self.next_to_prev.len()
    }

    /// Whether nothing was matched
    pub fn is_empty(&self) -> bool {
        self.next_to_prev.is_empty()
    }

    /// `pair_id` array for the next set
    pub fn pair_ids(&self) -> Vec<u32> {
        self.next_to_prev.iter().map(|i| *i as u32).collect()
    }
}

/// Pairing failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CorrespondenceError {
    /// Point sets differ in size
    #[error("Cannot pair {prev} points with {next} points")]
    LengthMismatch {
        /// Previous set size
        prev: usize,
        /// Next set size
        next: usize,
    },

    /// A required identity array is missing or not a permutation
    #[error("Invalid {0} array")]
    InvalidIdentity(&'static str),

    /// The assignment solver failed
    #[error(transparent)]
    Solver(#[from] AssignmentError),
}

impl CorrespondenceError {
    /// Whether the failure came from the solver rather than the inputs
    pub fn is_solver_failure(&self) -> bool {
        matches!(self, Self::Solver(_))
    }
}

/// Map both position sets into the unit box of their shared bounds.
///
/// The scale is uniform so distances keep their proportions.
fn normalize(prev: &[Vec3], next: &[Vec3]) -> (Vec<DVec3>, Vec<DVec3>) {
    let Some((min, max)) = bounds_of(prev.iter().chain(next.iter())) else {
        return (Vec::new(), Vec::new());
    };
    let min = min.as_dvec3();
    let extent = (max.as_dvec3() - min).max_element();
    let scale = if extent > 0.0 && extent.is_finite() { 1.0 / extent } else { 1.0 };

    let map = |points: &[Vec3]| -> Vec<DVec3> {
        points.iter().map(|p| (p.as_dvec3() - min) * scale).collect()
    };
    (map(prev), map(next))
}

/// Directional cost matrix, rows are previous points and columns next points
pub fn cost_matrix(prev: &[Vec3], next: &[Vec3], weights: &CostWeights) -> CostMatrix {
    let (prev, next) = normalize(prev, next);
    let size = prev.len().min(next.len());
    CostMatrix::from_fn(size, |i, j| weights.cost(prev[i], next[j]))
}

/// Optimal matching of `prev` to `next` under `weights`
pub fn pair_optimal(
    prev: &[Vec3],
    next: &[Vec3],
    weights: &CostWeights,
    max_points: usize,
) -> Result<Correspondence, CorrespondenceError> {
    if prev.len() != next.len() {
        return Err(CorrespondenceError::LengthMismatch {
            prev: prev.len(),
            next: next.len(),
        });
    }
    if prev.len() > max_points {
        return Err(AssignmentError::TooLarge {
            size: prev.len(),
            limit: max_points,
        }
        .into());
    }

    let matrix = cost_matrix(prev, next, weights);
    let assignment = solve(&matrix, max_points)?;
    tracing::debug!(
        "Optimal pairing of {} points, cost {:.3}",
        prev.len(),
        assignment.total_cost
    );

    Ok(Correspondence {
        strategy: PairingStrategy::Optimal,
        next_to_prev: assignment.col_to_row,
        prev_to_next: assignment.row_to_col,
        total_cost: Some(assignment.total_cost),
    })
}

/// Greedy nearest-unclaimed matching of `next` onto `prev`
pub fn pair_greedy(prev: &[Vec3], next: &[Vec3]) -> Result<Correspondence, CorrespondenceError> {
    if prev.len() != next.len() {
        return Err(CorrespondenceError::LengthMismatch {
            prev: prev.len(),
            next: next.len(),
        });
    }

    let n = prev.len();
    let tree = KdTree::build(prev);
    let mut claimed = vec![false; n];
    let mut next_to_prev = Vec::with_capacity(n);

    for (j, point) in next.iter().enumerate() {
        let mut count = 1;
        let choice = loop {
            let found = tree
                .nearest_n(*point, count)
                .into_iter()
                .map(|(index, _)| index)
                .find(|index| !claimed[*index]);
            if found.is_some() || count >= n {
                break found;
            }
            count = (count * 2).min(n);
        };

        // Unreachable for equal sizes; keep the result a permutation anyway
        let prev_index = choice
            .or_else(|| (!claimed[j]).then_some(j))
            .or_else(|| claimed.iter().position(|c| !c))
            .unwrap_or(j);
        claimed[prev_index] = true;
        next_to_prev.push(prev_index);
    }

    Ok(Correspondence::from_next_to_prev(
        PairingStrategy::Greedy,
        next_to_prev,
        None,
    ))
}

/// Configured pairing between point sets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceEngine {
    /// Algorithm used
    pub strategy: PairingStrategy,
    /// Movement cost for the optimal strategy
    pub weights: CostWeights,
    /// Largest point count handed to the solver
    pub max_points: usize,
}

impl Default for CorrespondenceEngine {
    fn default() -> Self {
        Self {
            strategy: PairingStrategy::default(),
            weights: CostWeights::default(),
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl CorrespondenceEngine {
    /// Engine with the given strategy and default weights
    pub fn new(strategy: PairingStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Compute the matching without touching either set
    pub fn correspond(
        &self,
        prev: &PointSet,
        next: &PointSet,
    ) -> Result<Correspondence, CorrespondenceError> {
        match self.strategy {
            PairingStrategy::Greedy => pair_greedy(&prev.positions, &next.positions),
            PairingStrategy::Optimal => {
                pair_optimal(&prev.positions, &next.positions, &self.weights, self.max_points)
            }
        }
    }

    /// Match `next` to `prev` and store the result in `next.pair_id`.
    ///
    /// On a size mismatch `next` is reseeded to identity arrays. On a
    /// solver failure `next` is left as it was.
    pub fn pair(
        &self,
        prev: &PointSet,
        next: &mut PointSet,
    ) -> Result<Correspondence, CorrespondenceError> {
        let result = self.correspond(prev, next);
        self.apply(next, result)
    }

    /// Store a precomputed matching in `next`, with the same failure
    /// handling as [`CorrespondenceEngine::pair`]
    pub fn apply(
        &self,
        next: &mut PointSet,
        result: Result<Correspondence, CorrespondenceError>,
    ) -> Result<Correspondence, CorrespondenceError> {
        match result {
            Ok(correspondence) if correspondence.len() == next.len() => {
                next.pair_id = Some(correspondence.pair_ids());
                Ok(correspondence)
            }
            Ok(correspondence) => {
                next.reset_identity();
                Err(CorrespondenceError::LengthMismatch {
                    prev: correspondence.len(),
                    next: next.len(),
                })
            }
            Err(e @ CorrespondenceError::LengthMismatch { .. }) => {
                tracing::warn!("{e}, reseeding identity");
                next.reset_identity();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Matchings between every consecutive pair of `sets`.
    ///
    /// Pairs are independent and computed in parallel; each solve runs on
    /// a single thread.
    pub fn correspond_chain(
        &self,
        sets: &[PointSet],
    ) -> Vec<Result<Correspondence, CorrespondenceError>> {
        sets.par_windows(2)
            .map(|pair| self.correspond(&pair[0], &pair[1]))
            .collect()
    }
}
