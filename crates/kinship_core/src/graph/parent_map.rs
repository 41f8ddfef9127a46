//! Parent-pointer lookups and the cycle guard shared by tree traversals.
//!
//! # Responsibility
//! - Build `id -> resolved parent` and `parent -> children` indexes in one pass.
//! - Provide a reusable visiting set for iterative upward walks.
//!
//! # Invariants
//! - A parent id absent from the snapshot resolves to `None` (the member is a root).
//! - Children lists and roots keep snapshot input order.
//! - On duplicate ids the first occurrence defines the parent link.

use std::collections::{BTreeMap, HashMap};

use crate::model::member::{Member, MemberId, ParentLink};

/// Lookup tables over one member snapshot.
#[derive(Debug, Clone, Default)]
pub struct ParentMap {
    order: Vec<MemberId>,
    parents: HashMap<MemberId, Option<MemberId>>,
    children: HashMap<MemberId, Vec<usize>>,
}

impl ParentMap {
    /// Builds lookup tables from a snapshot in O(n).
    ///
    /// Children are stored as indexes into `members`, so callers can map them
    /// back to their own records without cloning.
    pub fn build<T: ParentLink>(members: &[T]) -> Self {
        let mut order = Vec::with_capacity(members.len());
        let mut raw_parents = HashMap::with_capacity(members.len());
        for member in members {
            let id = member.member_id();
            if raw_parents.contains_key(&id) {
                continue;
            }
            raw_parents.insert(id, member.parent_id());
            order.push(id);
        }

        let parents: HashMap<MemberId, Option<MemberId>> = raw_parents
            .iter()
            .map(|(id, parent)| {
                let resolved = parent.filter(|parent| raw_parents.contains_key(parent));
                (*id, resolved)
            })
            .collect();

        let mut children: HashMap<MemberId, Vec<usize>> = HashMap::new();
        for (index, member) in members.iter().enumerate() {
            if let Some(parent) = member.parent_id() {
                if parents.contains_key(&parent) {
                    children.entry(parent).or_default().push(index);
                }
            }
        }

        Self {
            order,
            parents,
            children,
        }
    }

    /// Number of distinct member ids.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolved parent. `None` for roots and for ids outside the snapshot.
    pub fn parent_of(&self, id: MemberId) -> Option<MemberId> {
        self.parents.get(&id).copied().flatten()
    }

    /// Whether `id` is in the snapshot and has no resolvable parent.
    pub fn is_root(&self, id: MemberId) -> bool {
        matches!(self.parents.get(&id), Some(None))
    }

    /// Indexes (into the snapshot slice) of the direct children of `id`.
    pub fn children_of(&self, id: MemberId) -> &[usize] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct member ids in first-seen order.
    pub fn ids(&self) -> &[MemberId] {
        &self.order
    }

    /// Root ids in first-seen order.
    pub fn roots(&self) -> Vec<MemberId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.is_root(*id))
            .collect()
    }
}

/// "Currently visiting" set for one iterative upward walk.
///
/// Records the walk position of every entered node so that, when a node is
/// re-entered, the caller learns exactly which suffix of the walk forms the
/// cycle.
#[derive(Debug, Default)]
pub struct VisitGuard {
    positions: HashMap<MemberId, usize>,
    path: Vec<MemberId>,
}

impl VisitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters `id`.
    ///
    /// # Errors
    /// Returns the walk position of `id` when it is already being visited,
    /// i.e. when the walk closed a cycle.
    pub fn enter(&mut self, id: MemberId) -> Result<(), usize> {
        if let Some(position) = self.positions.get(&id) {
            return Err(*position);
        }
        self.positions.insert(id, self.path.len());
        self.path.push(id);
        Ok(())
    }

    pub fn is_visiting(&self, id: MemberId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Consumes the guard and returns the walk, oldest first.
    pub fn into_path(self) -> Vec<MemberId> {
        self.path
    }
}

/// Maps each member id to its direct parent's display name.
///
/// Members without a resolvable parent are absent from the result. Keys are
/// ordered so serialized output is stable.
pub fn parent_names(members: &[Member]) -> BTreeMap<MemberId, String> {
    let by_id: HashMap<MemberId, &Member> = members
        .iter()
        .rev()
        .map(|member| (member.id, member))
        .collect();

    members
        .iter()
        .filter_map(|member| {
            let parent = by_id.get(&member.parent_id?)?;
            Some((member.id, parent.display_name()))
        })
        .collect()
}
