//! Domain model for families, members and relationship records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the graph engine decoupled from full member records via `ParentLink`.
//!
//! # Invariants
//! - Every member belongs to exactly one family.
//! - A member has at most one parent (`parent_id`), so the model is a forest
//!   when no cycles were written.

pub mod family;
pub mod member;
pub mod relationship;
