//! Family domain model and aggregate stats.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one family.
pub type FamilyId = Uuid;

/// Family metadata. Owns a set of members through `Member::family_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

/// Aggregate metrics computed by the stats engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyStats {
    /// Number of members in the snapshot, cyclic or disconnected included.
    pub member_count: usize,
    /// Tree height. `0` only for an empty family.
    pub generation_count: usize,
}

/// Family metadata merged with its stats.
///
/// Serializes flat: `id, name, created_at, member_count, generation_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyWithStats {
    #[serde(flatten)]
    pub family: Family,
    #[serde(flatten)]
    pub stats: FamilyStats,
}

impl FamilyWithStats {
    pub fn new(family: Family, stats: FamilyStats) -> Self {
        Self { family, stats }
    }
}
