//! Core domain logic for Kinship family trees.
//! This crate is the single source of truth for tree invariants.

pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use graph::hierarchy::{build_hierarchy, build_levels, Hierarchy};
pub use graph::parent_map::{parent_names, ParentMap, VisitGuard};
pub use graph::stats::{compute_stats, member_depths};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::family::{Family, FamilyId, FamilyStats, FamilyWithStats};
pub use model::member::{Member, MemberId, MemberLink, MemberValidationError, ParentLink};
pub use model::relationship::{Relationship, RelationshipType};
pub use repo::family_repo::{FamilyRepository, SqliteFamilyRepository};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::{RepoError, RepoResult};
pub use service::family_service::{FamilyService, FamilyServiceError};
pub use service::tree_service::{AddMemberRequest, FamilyTree, TreeService, TreeServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
