//! Read-only graph views over a family member snapshot.
//!
//! # Responsibility
//! - Compute aggregate stats (member count, generation count).
//! - Group members into display levels.
//!
//! # Invariants
//! - Functions here are pure: no I/O, no global state, no mutation of input.
//! - Cyclic and dangling parent links degrade; they never fail or loop.

pub mod hierarchy;
pub mod parent_map;
pub mod stats;
