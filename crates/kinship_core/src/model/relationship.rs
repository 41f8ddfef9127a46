//! Labeled relationship records.
//!
//! # Responsibility
//! - Describe auxiliary, human-labeled edges between two members.
//!
//! # Invariants
//! - Relationship records are enrichment metadata. The structural tree is
//!   defined by `Member::parent_id` alone.

use serde::{Deserialize, Serialize};

use crate::model::member::MemberId;

/// Fixed set of relationship labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Parent,
    Child,
    Spouse,
    Sibling,
    Uncle,
    Aunt,
    Cousin,
    Nephew,
    Niece,
    Grandparent,
    Grandchild,
}

impl RelationshipType {
    /// All labels in declaration order.
    pub const ALL: [RelationshipType; 11] = [
        Self::Parent,
        Self::Child,
        Self::Spouse,
        Self::Sibling,
        Self::Uncle,
        Self::Aunt,
        Self::Cousin,
        Self::Nephew,
        Self::Niece,
        Self::Grandparent,
        Self::Grandchild,
    ];

    /// Stable snake_case storage form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Spouse => "spouse",
            Self::Sibling => "sibling",
            Self::Uncle => "uncle",
            Self::Aunt => "aunt",
            Self::Cousin => "cousin",
            Self::Nephew => "nephew",
            Self::Niece => "niece",
            Self::Grandparent => "grandparent",
            Self::Grandchild => "grandchild",
        }
    }

    /// Parses the storage form. Returns `None` for unknown labels.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim().to_ascii_lowercase())
    }
}

/// One labeled edge between two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub member_id: MemberId,
    pub related_member_id: MemberId,
    pub relationship_type: RelationshipType,
}
