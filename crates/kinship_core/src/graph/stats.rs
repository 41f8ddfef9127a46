//! Generation depth and member counts over a parent-pointer snapshot.
//!
//! # Responsibility
//! - Compute `member_count` and `generation_count` for one family snapshot.
//! - Degrade cyclic or dangling parent links instead of failing.
//!
//! # Invariants
//! - A root (no parent, or parent absent from the snapshot) has depth 1.
//! - Every member of a parent cycle has depth 1; members hanging below a
//!   cycle count up from it.
//! - `generation_count <= member_count`, and both are `0` only for an empty
//!   snapshot.
//! - Memo state lives for one call only.

use log::warn;
use std::collections::HashMap;

use crate::graph::parent_map::{ParentMap, VisitGuard};
use crate::model::family::FamilyStats;
use crate::model::member::{MemberId, ParentLink};

/// Computes aggregate stats for one snapshot.
///
/// Never fails: malformed links degrade to roots.
pub fn compute_stats<T: ParentLink>(members: &[T]) -> FamilyStats {
    if members.is_empty() {
        return FamilyStats::default();
    }

    let map = ParentMap::build(members);
    let depths = resolve_depths(&map);
    FamilyStats {
        member_count: members.len(),
        generation_count: depths.values().copied().max().unwrap_or(0),
    }
}

/// Returns each member's depth, in input order.
pub fn member_depths<T: ParentLink>(members: &[T]) -> Vec<(MemberId, usize)> {
    let map = ParentMap::build(members);
    let depths = resolve_depths(&map);
    members
        .iter()
        .map(|member| {
            let id = member.member_id();
            (id, depths.get(&id).copied().unwrap_or(1))
        })
        .collect()
}

fn resolve_depths(map: &ParentMap) -> HashMap<MemberId, usize> {
    let mut memo: HashMap<MemberId, usize> = HashMap::with_capacity(map.len());
    let mut cycle_members = 0usize;

    for &start in map.ids() {
        if memo.contains_key(&start) {
            continue;
        }

        let mut guard = VisitGuard::new();
        let mut cursor = Some(start);
        let mut base = 0usize;
        let mut cycle_at = None;

        while let Some(current) = cursor {
            if let Some(depth) = memo.get(&current) {
                base = *depth;
                break;
            }
            if let Err(position) = guard.enter(current) {
                cycle_at = Some(position);
                break;
            }
            cursor = map.parent_of(current);
        }

        let mut path = guard.into_path();
        if let Some(position) = cycle_at {
            for id in path.drain(position..) {
                memo.insert(id, 1);
                cycle_members += 1;
            }
            base = 1;
        }

        for id in path.into_iter().rev() {
            base += 1;
            memo.insert(id, base);
        }
    }

    if cycle_members > 0 {
        warn!(
            "event=cycle_detected module=graph op=stats member_count={} cycle_members={}",
            map.len(),
            cycle_members
        );
    }

    memo
}
