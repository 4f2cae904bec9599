// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered point sets with correspondence and identity attributes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Check that `ids` is a permutation of `0..n`
pub fn is_permutation(ids: &[u32], n: usize) -> bool {
    if ids.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &id in ids {
        let Some(slot) = seen.get_mut(id as usize) else {
            return false;
        };
        if *slot {
            return false;
        }
        *slot = true;
    }
    true
}

/// `[0, 1, .., n - 1]`
pub fn identity_permutation(n: usize) -> Vec<u32> {
    (0..n as u32).collect()
}

/// World-space positions of one formation, in host order.
///
/// `pair_id[j]` is the index of the matching point in the previous
/// formation; `formation_id[j]` is the drone's persistent identity. Both
/// are optional because the host may not have written them yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    /// Positions, in host order
    pub positions: Vec<Vec3>,
    /// Index into the previous formation's point order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_id: Option<Vec<u32>>,
    /// Persistent drone identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation_id: Option<Vec<u32>>,
}

impl PointSet {
    /// Point set without attributes
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            pair_id: None,
            formation_id: None,
        }
    }

    /// Point set with both attribute arrays
    pub fn with_ids(positions: Vec<Vec3>, pair_id: Vec<u32>, formation_id: Vec<u32>) -> Self {
        Self {
            positions,
            pair_id: Some(pair_id),
            formation_id: Some(formation_id),
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether there are no points
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Pair IDs, if present
    pub fn pair_ids(&self) -> Option<&[u32]> {
        self.pair_id.as_deref()
    }

    /// Formation IDs, if present
    pub fn formation_ids(&self) -> Option<&[u32]> {
        self.formation_id.as_deref()
    }

    /// Both arrays present, sized to the points and permutations
    pub fn is_assigned(&self) -> bool {
        let n = self.len();
        matches!(
            (self.pair_ids(), self.formation_ids()),
            (Some(pair), Some(formation)) if is_permutation(pair, n) && is_permutation(formation, n)
        )
    }

    /// Set both arrays to the identity permutation
    pub fn reset_identity(&mut self) {
        let n = self.len();
        self.pair_id = Some(identity_permutation(n));
        self.formation_id = Some(identity_permutation(n));
    }

    /// Reseed the arrays unless already assigned; returns whether it reseeded
    pub fn ensure_assigned(&mut self) -> bool {
        if self.is_assigned() {
            return false;
        }
        self.reset_identity();
        true
    }

    /// Axis-aligned bounds, `None` when empty
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        bounds_of(self.positions.iter())
    }
}

/// Axis-aligned bounds of a sequence of positions
pub fn bounds_of<'a>(positions: impl IntoIterator<Item = &'a Vec3>) -> Option<(Vec3, Vec3)> {
    positions.into_iter().fold(None, |acc, p| match acc {
        None => Some((*p, *p)),
        Some((min, max)) => Some((min.min(*p), max.max(*p))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_check() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(is_permutation(&[], 0));
    }

    #[test]
    fn test_ensure_assigned_is_lazy() {
        let mut set = PointSet::with_ids(vec![Vec3::ZERO, Vec3::X], vec![1, 0], vec![1, 0]);
        assert!(!set.ensure_assigned());
        assert_eq!(set.pair_ids(), Some(&[1, 0][..]));

        set.formation_id = Some(vec![7, 0]);
        assert!(set.ensure_assigned());
        assert_eq!(set.formation_ids(), Some(&[0, 1][..]));
        assert_eq!(set.pair_ids(), Some(&[0, 1][..]));
    }

    #[test]
    fn test_bounds() {
        let set = PointSet::new(vec![Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 3.0, 5.0)]);
        assert_eq!(
            set.bounds(),
            Some((Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 3.0, 5.0)))
        );
        assert_eq!(PointSet::default().bounds(), None);
    }

    #[test]
    fn test_ron_omits_missing_arrays() {
        let set = PointSet::new(vec![Vec3::ONE]);
        let text = ron::to_string(&set).unwrap();
        assert!(!text.contains("pair_id"));

        let back: PointSet = ron::from_str(&text).unwrap();
        assert_eq!(back, set);
    }
}
