//! Family use-case service and stats query surface.
//!
//! # Responsibility
//! - Resolve a family and merge it with stats computed from its snapshot.
//! - Provide family create, rename, list and delete entry points.
//!
//! # Invariants
//! - Stats are computed from a fresh `(id, parent_id)` snapshot per call.
//! - A new family always starts with one founding member.
//! - Family names are trimmed and never blank.

use crate::graph::stats::compute_stats;
use crate::model::family::{Family, FamilyId, FamilyWithStats};
use crate::model::member::Member;
use crate::repo::family_repo::FamilyRepository;
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const FOUNDER_FIRST_NAME: &str = "Family";
const FOUNDER_LAST_NAME: &str = "Creator";

/// Errors from family service operations.
#[derive(Debug)]
pub enum FamilyServiceError {
    /// Family name is blank after trim.
    InvalidFamilyName,
    /// Target family does not exist.
    FamilyNotFound(FamilyId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for FamilyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFamilyName => write!(f, "family name must not be blank"),
            Self::FamilyNotFound(id) => write!(f, "family not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FamilyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FamilyServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::FamilyNotFound(id) => Self::FamilyNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Family service facade.
pub struct FamilyService<F: FamilyRepository, M: MemberRepository> {
    families: F,
    members: M,
}

impl<F: FamilyRepository, M: MemberRepository> FamilyService<F, M> {
    /// Creates service from repository implementations.
    pub fn new(families: F, members: M) -> Self {
        Self { families, members }
    }

    /// Creates a family with its founding member.
    pub fn create_family(
        &self,
        name: impl Into<String>,
    ) -> Result<(Family, Member), FamilyServiceError> {
        let name = normalize_family_name(name.into())?;
        let founder = Member::new(Uuid::nil(), FOUNDER_FIRST_NAME, FOUNDER_LAST_NAME);
        let (family, founder) = self
            .families
            .create_family_with_founder(name.as_str(), founder)?;
        info!(
            "event=family_create module=service status=ok family_id={}",
            family.id
        );
        Ok((family, founder))
    }

    /// Returns family metadata merged with member and generation counts.
    ///
    /// # Errors
    /// - `FamilyNotFound` when the family does not exist.
    /// - `Repo` when the member snapshot cannot be fetched.
    pub fn family_stats(&self, family_id: FamilyId) -> Result<FamilyWithStats, FamilyServiceError> {
        let family = self
            .families
            .get_family(family_id)?
            .ok_or(FamilyServiceError::FamilyNotFound(family_id))?;
        self.with_stats(family)
    }

    /// Lists every family with its stats, oldest first.
    pub fn list_families_with_stats(&self) -> Result<Vec<FamilyWithStats>, FamilyServiceError> {
        self.families
            .list_families()?
            .into_iter()
            .map(|family| self.with_stats(family))
            .collect()
    }

    /// Renames one family.
    pub fn rename_family(
        &self,
        family_id: FamilyId,
        name: impl Into<String>,
    ) -> Result<(), FamilyServiceError> {
        let name = normalize_family_name(name.into())?;
        self.families
            .rename_family(family_id, name.as_str())
            .map_err(Into::into)
    }

    /// Deletes one family together with all of its members.
    pub fn delete_family(&self, family_id: FamilyId) -> Result<(), FamilyServiceError> {
        self.families.delete_family(family_id)?;
        info!("event=family_delete module=service status=ok family_id={family_id}");
        Ok(())
    }

    fn with_stats(&self, family: Family) -> Result<FamilyWithStats, FamilyServiceError> {
        let links = self.members.list_member_links(family.id)?;
        let stats = compute_stats(&links);
        info!(
            "event=family_stats module=service status=ok family_id={} member_count={} generation_count={}",
            family.id, stats.member_count, stats.generation_count
        );
        Ok(FamilyWithStats::new(family, stats))
    }
}

fn normalize_family_name(value: String) -> Result<String, FamilyServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FamilyServiceError::InvalidFamilyName);
    }
    Ok(trimmed.to_string())
}
