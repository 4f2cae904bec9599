// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persistent drone identities.
//!
//! The first formation of a show gets sequential identities; every later
//! formation inherits them through its `pair_id` array.

use crate::correspondence::CorrespondenceError;
use crate::formation::Formation;
use crate::point_set::{identity_permutation, is_permutation, PointSet};

/// Identity wrap modulus, when it actually wraps `n` points
fn wrap_modulus(drone_count: Option<u32>, n: usize) -> Option<u32> {
    drone_count.filter(|k| *k > 0 && (*k as usize) < n)
}

fn has_valid_identities(set: &PointSet, drone_count: Option<u32>) -> bool {
    let n = set.len();
    let pair_ok = set.pair_ids().is_some_and(|ids| is_permutation(ids, n));
    let formation_ok = match (set.formation_ids(), wrap_modulus(drone_count, n)) {
        (Some(ids), Some(k)) => ids.len() == n && ids.iter().all(|id| *id < k),
        (Some(ids), None) => is_permutation(ids, n),
        (None, _) => false,
    };
    pair_ok && formation_ok
}

/// Give `set` sequential identities unless it already has valid ones.
///
/// With a nonzero `drone_count` the identities wrap modulo it. Returns
/// whether anything was written.
pub fn assign_initial(set: &mut PointSet, drone_count: Option<u32>) -> bool {
    if has_valid_identities(set, drone_count) {
        return false;
    }

    let n = set.len();
    set.pair_id = Some(identity_permutation(n));
    set.formation_id = Some(match drone_count.filter(|k| *k > 0) {
        Some(k) => (0..n as u32).map(|i| i % k).collect(),
        None => identity_permutation(n),
    });
    tracing::debug!("Assigned initial identities to {n} points");
    true
}

/// [`assign_initial`] across all groups of a formation, in object-name order
pub fn assign_initial_formation(formation: &mut Formation, drone_count: Option<u32>) -> bool {
    let mut set = formation.flatten();
    if !assign_initial(&mut set, drone_count) {
        return false;
    }
    formation.scatter(&set)
}

/// Carry identities from `prev` into `next` through `next.pair_id`.
///
/// `next.formation_id[j]` becomes `prev.formation_id[next.pair_id[j]]`;
/// a slot with no previous identity keeps its own pair id. When the sets
/// cannot be matched, `next` is reseeded to identity arrays and an error
/// is returned.
pub fn propagate(prev: &PointSet, next: &mut PointSet) -> Result<(), CorrespondenceError> {
    let n = next.len();
    let error = if prev.len() != n {
        Some(CorrespondenceError::LengthMismatch { prev: prev.len(), next: n })
    } else if !next.pair_ids().is_some_and(|ids| is_permutation(ids, n)) {
        Some(CorrespondenceError::InvalidIdentity("pair_id"))
    } else if !prev.formation_ids().is_some_and(|ids| ids.len() == n) {
        Some(CorrespondenceError::InvalidIdentity("formation_id"))
    } else {
        None
    };
    if let Some(error) = error {
        tracing::warn!("Identity propagation skipped: {error}, reseeding");
        next.reset_identity();
        return Err(error);
    }

    let previous = prev.formation_ids().unwrap_or_default();
    let formation_id = next
        .pair_ids()
        .unwrap_or_default()
        .iter()
        .map(|slot| previous.get(*slot as usize).copied().unwrap_or(*slot))
        .collect();
    next.formation_id = Some(formation_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::PointGroup;
    use glam::Vec3;

    fn points(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_wraps_modulo_drone_count() {
        let mut set = PointSet::new(points(10));
        assert!(assign_initial(&mut set, Some(4)));
        assert_eq!(set.formation_ids(), Some(&[0, 1, 2, 3, 0, 1, 2, 3, 0, 1][..]));
        assert_eq!(set.pair_ids(), Some(&identity_permutation(10)[..]));
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut set = PointSet::new(points(10));
        assert!(assign_initial(&mut set, Some(4)));
        let first = set.clone();
        assert!(!assign_initial(&mut set, Some(4)));
        assert_eq!(set, first);

        let mut set = PointSet::with_ids(points(3), vec![2, 0, 1], vec![1, 2, 0]);
        assert!(!assign_initial(&mut set, None));
        assert_eq!(set.formation_ids(), Some(&[1, 2, 0][..]));
    }

    #[test]
    fn test_zero_or_large_drone_count_is_sequential() {
        let mut set = PointSet::new(points(3));
        assert!(assign_initial(&mut set, Some(0)));
        assert_eq!(set.formation_ids(), Some(&[0, 1, 2][..]));

        let mut set = PointSet::new(points(3));
        assert!(assign_initial(&mut set, Some(8)));
        assert_eq!(set.formation_ids(), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn test_formation_assignment_spans_groups() {
        let mut formation = Formation::new(
            "Ring",
            0,
            vec![
                PointGroup::new("b", points(2)),
                PointGroup::new("a", points(3)),
            ],
        );
        assert!(assign_initial_formation(&mut formation, None));
        assert_eq!(formation.groups[1].points.formation_ids(), Some(&[0, 1, 2][..]));
        assert_eq!(formation.groups[0].points.formation_ids(), Some(&[3, 4][..]));
        assert!(!assign_initial_formation(&mut formation, None));
    }

    #[test]
    fn test_propagate_follows_pair_ids() {
        let prev = PointSet::with_ids(points(3), vec![0, 1, 2], vec![7, 8, 9]);
        let mut next = PointSet::new(points(3));
        next.pair_id = Some(vec![2, 0, 1]);

        propagate(&prev, &mut next).unwrap();
        assert_eq!(next.formation_ids(), Some(&[9, 7, 8][..]));
        assert_eq!(next.pair_ids(), Some(&[2, 0, 1][..]));
    }

    #[test]
    fn test_propagate_reseeds_on_bad_input() {
        let prev = PointSet::with_ids(points(3), vec![0, 1, 2], vec![0, 1, 2]);

        let mut next = PointSet::new(points(2));
        assert!(matches!(
            propagate(&prev, &mut next),
            Err(CorrespondenceError::LengthMismatch { prev: 3, next: 2 })
        ));
        assert!(next.is_assigned());

        let mut next = PointSet::new(points(3));
        next.pair_id = Some(vec![0, 0, 1]);
        assert_eq!(
            propagate(&prev, &mut next),
            Err(CorrespondenceError::InvalidIdentity("pair_id"))
        );
        assert_eq!(next.pair_ids(), Some(&[0, 1, 2][..]));
    }
}
