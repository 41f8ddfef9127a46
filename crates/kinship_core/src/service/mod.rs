//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and graph computations into use-case APIs.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod family_service;
pub mod tree_service;
