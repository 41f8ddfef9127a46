//! Level-ordered grouping of a member snapshot for tree rendering.
//!
//! # Responsibility
//! - Partition members into generations by breadth-first expansion from roots.
//! - Report members that no root reaches instead of losing them silently.
//!
//! # Invariants
//! - Level 0 holds the roots (no parent, or parent absent from the snapshot).
//! - Level k holds the children of level k-1 members, grouped by parent in
//!   level order and then by snapshot input order.
//! - Every member is placed in at most one level.
//! - For an acyclic snapshot `level index + 1` equals the stats engine depth.

use log::warn;

use crate::graph::parent_map::ParentMap;
use crate::model::member::ParentLink;

/// Levels plus the members unreachable from any root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy<'a, T> {
    /// Generations, roots first.
    pub levels: Vec<Vec<&'a T>>,
    /// Members caught in a parent cycle, or descending from one, in input order.
    pub detached: Vec<&'a T>,
}

impl<T> Hierarchy<'_, T> {
    /// Number of generations with at least one placed member.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Number of members placed in some level.
    pub fn placed_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }
}

/// Groups members into generations.
///
/// Members with no path to a root are left out; see [`build_hierarchy`] to
/// recover them.
pub fn build_levels<T: ParentLink>(members: &[T]) -> Vec<Vec<&T>> {
    build_hierarchy(members).levels
}

/// Groups members into generations and collects unreachable members.
pub fn build_hierarchy<T: ParentLink>(members: &[T]) -> Hierarchy<'_, T> {
    let map = ParentMap::build(members);
    let mut placed = vec![false; members.len()];
    let mut levels: Vec<Vec<&T>> = Vec::new();

    let mut current: Vec<usize> = Vec::new();
    for (index, member) in members.iter().enumerate() {
        if map.is_root(member.member_id()) {
            placed[index] = true;
            current.push(index);
        }
    }

    while !current.is_empty() {
        let mut next = Vec::new();
        for &index in &current {
            for &child in map.children_of(members[index].member_id()) {
                if !placed[child] {
                    placed[child] = true;
                    next.push(child);
                }
            }
        }
        levels.push(current.iter().map(|&index| &members[index]).collect());
        current = next;
    }

    let detached: Vec<&T> = members
        .iter()
        .zip(&placed)
        .filter(|(_, placed)| !**placed)
        .map(|(member, _)| member)
        .collect();

    if !detached.is_empty() {
        warn!(
            "event=cycle_detected module=graph op=hierarchy member_count={} detached={}",
            members.len(),
            detached.len()
        );
    }

    Hierarchy { levels, detached }
}

#[cfg(test)]
mod tests {
    use super::{build_hierarchy, build_levels};
    use crate::graph::stats::compute_stats;
    use crate::model::member::{MemberId, MemberLink};
    use uuid::Uuid;

    fn level_ids(levels: &[Vec<&MemberLink>]) -> Vec<Vec<MemberId>> {
        levels
            .iter()
            .map(|level| level.iter().map(|member| member.id).collect())
            .collect()
    }

    #[test]
    fn empty_snapshot_has_no_levels() {
        let links: Vec<MemberLink> = Vec::new();
        assert!(build_levels(&links).is_empty());
    }

    #[test]
    fn linear_chain_builds_one_member_per_level() {
        let (r, c1, c2, c3) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let links = [
            MemberLink::new(c2, Some(c1)),
            MemberLink::new(r, None),
            MemberLink::new(c3, Some(c2)),
            MemberLink::new(c1, Some(r)),
        ];

        let levels = build_levels(&links);
        assert_eq!(
            level_ids(&levels),
            vec![vec![r], vec![c1], vec![c2], vec![c3]]
        );
        assert_eq!(compute_stats(&links).generation_count, levels.len());
    }

    #[test]
    fn forest_levels_follow_root_order_then_child_order() {
        let (r1, r2, child1, child2) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let links = [
            MemberLink::new(child2, Some(r2)),
            MemberLink::new(r1, None),
            MemberLink::new(r2, None),
            MemberLink::new(child1, Some(r1)),
        ];

        let levels = build_levels(&links);
        assert_eq!(level_ids(&levels), vec![vec![r1, r2], vec![child1, child2]]);
        assert_eq!(compute_stats(&links).generation_count, 2);
    }

    #[test]
    fn dangling_parent_is_placed_at_level_zero() {
        let (root, orphan, grandchild) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let links = [
            MemberLink::new(root, None),
            MemberLink::new(orphan, Some(Uuid::new_v4())),
            MemberLink::new(grandchild, Some(orphan)),
        ];

        let levels = build_levels(&links);
        assert_eq!(level_ids(&levels), vec![vec![root, orphan], vec![grandchild]]);
    }

    #[test]
    fn two_cycle_has_no_levels_and_is_detached() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let links = [MemberLink::new(a, Some(b)), MemberLink::new(b, Some(a))];

        assert!(build_levels(&links).is_empty());

        let hierarchy = build_hierarchy(&links);
        let detached: Vec<MemberId> = hierarchy.detached.iter().map(|m| m.id).collect();
        assert_eq!(detached, vec![a, b]);
        assert_eq!(compute_stats(&links).generation_count, 1);
    }

    #[test]
    fn descendants_of_a_cycle_are_detached_with_it() {
        let (root, a, b, below) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let links = [
            MemberLink::new(root, None),
            MemberLink::new(a, Some(b)),
            MemberLink::new(b, Some(a)),
            MemberLink::new(below, Some(b)),
        ];

        let hierarchy = build_hierarchy(&links);
        assert_eq!(level_ids(&hierarchy.levels), vec![vec![root]]);
        assert_eq!(hierarchy.detached.len(), 3);
        assert_eq!(hierarchy.placed_count() + hierarchy.detached.len(), links.len());
    }

    #[test]
    fn acyclic_forest_places_every_member_once() {
        let ids: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
        let links = [
            MemberLink::new(ids[0], None),
            MemberLink::new(ids[1], Some(ids[0])),
            MemberLink::new(ids[2], Some(ids[0])),
            MemberLink::new(ids[3], Some(ids[1])),
            MemberLink::new(ids[4], None),
            MemberLink::new(ids[5], Some(ids[4])),
            MemberLink::new(ids[6], Some(ids[3])),
        ];

        let hierarchy = build_hierarchy(&links);
        assert!(hierarchy.detached.is_empty());
        assert_eq!(hierarchy.placed_count(), links.len());
        assert_eq!(hierarchy.depth(), compute_stats(&links).generation_count);

        let mut seen: Vec<MemberId> = hierarchy
            .levels
            .iter()
            .flatten()
            .map(|member| member.id)
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), links.len());
    }
}
