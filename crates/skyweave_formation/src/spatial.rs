// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static 3D k-d tree for nearest-neighbor queries.

use glam::Vec3;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct KdNode {
    /// Index into the source positions
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// Nearest-neighbor candidate, ordered by distance then index
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    distance_sq: f32,
    index: usize,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// k-d tree over a fixed set of positions
#[derive(Debug, Clone)]
pub struct KdTree {
    positions: Vec<Vec3>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl KdTree {
    /// Build a tree over `positions`; query results index into this slice
    pub fn build(positions: &[Vec3]) -> Self {
        let mut tree = Self {
            positions: positions.to_vec(),
            nodes: Vec::with_capacity(positions.len()),
            root: None,
        };
        let mut indices: Vec<usize> = (0..positions.len()).collect();
        tree.root = tree.build_node(&mut indices);
        tree
    }

    fn build_node(&mut self, indices: &mut [usize]) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }

        let axis = self.widest_axis(indices);
        let median = indices.len() / 2;
        let positions = &self.positions;
        indices.select_nth_unstable_by(median, |a, b| {
            positions[*a][axis]
                .total_cmp(&positions[*b][axis])
                .then(a.cmp(b))
        });

        let point = indices[median];
        let (lower, upper) = indices.split_at_mut(median);
        let left = self.build_node(lower);
        let right = self.build_node(&mut upper[1..]);

        self.nodes.push(KdNode { point, axis, left, right });
        Some(self.nodes.len() - 1)
    }

    fn widest_axis(&self, indices: &[usize]) -> usize {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for &i in indices {
            min = min.min(self.positions[i]);
            max = max.max(self.positions[i]);
        }
        let extent = max - min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Up to `count` nearest points to `query` as `(index, distance²)`,
    /// closest first; equal distances are ordered by index.
    pub fn nearest_n(&self, query: Vec3, count: usize) -> Vec<(usize, f32)> {
        if count == 0 {
            return Vec::new();
        }

        let mut best: BinaryHeap<Candidate> = BinaryHeap::with_capacity(count + 1);
        if let Some(root) = self.root {
            self.search(root, query, count, &mut best);
        }

        best.into_sorted_vec()
            .into_iter()
            .map(|c| (c.index, c.distance_sq))
            .collect()
    }

    fn search(&self, node: usize, query: Vec3, count: usize, best: &mut BinaryHeap<Candidate>) {
        let KdNode { point, axis, left, right } = self.nodes[node];
        let position = self.positions[point];

        let candidate = Candidate {
            distance_sq: position.distance_squared(query),
            index: point,
        };
        if best.len() < count {
            best.push(candidate);
        } else if best.peek().is_some_and(|worst| candidate < *worst) {
            best.pop();
            best.push(candidate);
        }

        let offset = query[axis] - position[axis];
        let (near, far) = if offset < 0.0 { (left, right) } else { (right, left) };

        if let Some(near) = near {
            self.search(near, query, count, best);
        }
        if let Some(far) = far {
            let plane_sq = offset * offset;
            // Ties on the plane may still beat the worst by index
            let must_visit = best.len() < count
                || best.peek().is_some_and(|worst| plane_sq <= worst.distance_sq);
            if must_visit {
                self.search(far, query, count, best);
            }
        }
    }
}
