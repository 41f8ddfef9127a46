//! Family tree rendering and member edit service.
//!
//! # Responsibility
//! - Build level-grouped tree views from a family's member snapshot.
//! - Validate parent assignment on member add/update above the repository.
//!
//! # Invariants
//! - A parent must exist and belong to the same family as its child.
//! - Updates must not make a member its own ancestor.
//! - Relationship records are best-effort: failures are logged, never returned.

use crate::graph::hierarchy::build_hierarchy;
use crate::graph::parent_map::{parent_names, ParentMap, VisitGuard};
use crate::model::family::{Family, FamilyId};
use crate::model::member::{Member, MemberId};
use crate::model::relationship::{Relationship, RelationshipType};
use crate::repo::family_repo::FamilyRepository;
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoError;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from tree service operations.
#[derive(Debug)]
pub enum TreeServiceError {
    /// Target family does not exist.
    FamilyNotFound(FamilyId),
    /// Target member does not exist.
    MemberNotFound(MemberId),
    /// Chosen parent/related member does not exist.
    ParentNotFound(MemberId),
    /// Chosen parent/related member belongs to another family.
    ParentInOtherFamily {
        member_family: FamilyId,
        parent_uuid: MemberId,
    },
    /// A related member was chosen without a relation label.
    RelationRequired(MemberId),
    /// Parent assignment would create a cycle.
    CycleDetected {
        member_uuid: MemberId,
        parent_uuid: MemberId,
    },
    /// Repository-level failure, including member validation.
    Repo(RepoError),
}

impl Display for TreeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FamilyNotFound(id) => write!(f, "family not found: {id}"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent member not found: {id}"),
            Self::ParentInOtherFamily {
                member_family,
                parent_uuid,
            } => write!(
                f,
                "parent member {parent_uuid} does not belong to family {member_family}"
            ),
            Self::RelationRequired(id) => {
                write!(f, "a relation must be chosen for related member {id}")
            }
            Self::CycleDetected {
                member_uuid,
                parent_uuid,
            } => write!(
                f,
                "parent change would create cycle: member {member_uuid} under parent {parent_uuid}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TreeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TreeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::FamilyNotFound(id) => Self::FamilyNotFound(id),
            RepoError::MemberNotFound(id) => Self::MemberNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Level-grouped view of one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyTree {
    pub family: Family,
    /// Generations, roots first, in member insertion order.
    pub levels: Vec<Vec<Member>>,
    /// Members no root reaches because of a parent cycle.
    pub detached: Vec<Member>,
    /// Direct parent display name per member.
    pub parent_names: BTreeMap<MemberId, String>,
}

impl FamilyTree {
    /// Total members shown, placed or detached.
    pub fn member_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum::<usize>() + self.detached.len()
    }
}

/// Input for the add-member flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddMemberRequest {
    pub family_id: FamilyId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub biography: Option<String>,
    pub picture_url: Option<String>,
    /// Existing member the new one is related to.
    pub related_member_id: Option<MemberId>,
    /// Label describing the new member relative to `related_member_id`.
    /// Only `Child` sets the structural `parent_id` edge.
    pub relation: Option<RelationshipType>,
}

/// Family tree service facade.
pub struct TreeService<F: FamilyRepository, M: MemberRepository> {
    families: F,
    members: M,
}

impl<F: FamilyRepository, M: MemberRepository> TreeService<F, M> {
    /// Creates service from repository implementations.
    pub fn new(families: F, members: M) -> Self {
        Self { families, members }
    }

    /// Builds the level-grouped tree for one family.
    pub fn family_tree(&self, family_id: FamilyId) -> Result<FamilyTree, TreeServiceError> {
        let family = self.require_family(family_id)?;
        let members = self.members.list_members(family_id)?;
        let hierarchy = build_hierarchy(&members);

        let levels: Vec<Vec<Member>> = hierarchy
            .levels
            .iter()
            .map(|level| level.iter().map(|member| (*member).clone()).collect())
            .collect();
        let detached: Vec<Member> = hierarchy.detached.into_iter().cloned().collect();

        info!(
            "event=family_tree module=service status=ok family_id={} levels={} detached={}",
            family_id,
            levels.len(),
            detached.len()
        );

        Ok(FamilyTree {
            family,
            levels,
            detached,
            parent_names: parent_names(&members),
        })
    }

    /// Lists members that may be chosen as parent or related member.
    ///
    /// The list is the flat family snapshot, not filtered by level.
    pub fn candidate_parents(&self, family_id: FamilyId) -> Result<Vec<Member>, TreeServiceError> {
        self.require_family(family_id)?;
        self.members.list_members(family_id).map_err(Into::into)
    }

    /// Loads one member by id.
    pub fn member(&self, member_id: MemberId) -> Result<Member, TreeServiceError> {
        self.members
            .get_member(member_id)?
            .ok_or(TreeServiceError::MemberNotFound(member_id))
    }

    /// Adds one member, optionally related to an existing member.
    ///
    /// # Contract
    /// - `relation == Child` stores `related_member_id` as `parent_id`.
    /// - Any chosen relation is also stored as a relationship record, best-effort.
    /// - A related member without a relation is rejected.
    pub fn add_member(&self, request: &AddMemberRequest) -> Result<Member, TreeServiceError> {
        self.require_family(request.family_id)?;

        let related = match (request.related_member_id, request.relation) {
            (Some(related_id), Some(relation)) => {
                self.ensure_same_family(request.family_id, related_id)?;
                Some((related_id, relation))
            }
            (Some(related_id), None) => {
                return Err(TreeServiceError::RelationRequired(related_id));
            }
            (None, _) => None,
        };

        let mut member = Member::new(
            request.family_id,
            request.first_name.as_str(),
            request.last_name.as_str(),
        );
        member.date_of_birth = non_blank(request.date_of_birth.as_deref());
        member.biography = non_blank(request.biography.as_deref());
        member.picture_url = non_blank(request.picture_url.as_deref());
        member.parent_id = related
            .filter(|(_, relation)| *relation == RelationshipType::Child)
            .map(|(related_id, _)| related_id);

        let created = self.members.create_member(&member)?;
        info!(
            "event=member_add module=service status=ok family_id={} has_parent={}",
            created.family_id,
            created.parent_id.is_some()
        );

        if let Some((related_id, relation)) = related {
            let record = Relationship {
                member_id: created.id,
                related_member_id: related_id,
                relationship_type: relation,
            };
            if let Err(err) = self.members.record_relationship(&record) {
                warn!(
                    "event=relationship_record module=service status=error relation={} error={}",
                    relation.as_str(),
                    err
                );
            }
        }

        Ok(created)
    }

    /// Updates one member's editable fields, including its parent.
    ///
    /// # Errors
    /// - `ParentNotFound` / `ParentInOtherFamily` for an invalid parent.
    /// - `CycleDetected` when the member would become its own ancestor.
    pub fn update_member(&self, member: &Member) -> Result<(), TreeServiceError> {
        let stored = self.member(member.id)?;

        let mut updated = member.clone();
        updated.family_id = stored.family_id;
        updated.date_of_birth = non_blank(member.date_of_birth.as_deref());
        updated.biography = non_blank(member.biography.as_deref());
        updated.picture_url = non_blank(member.picture_url.as_deref());

        // An unchanged parent edge is kept as stored, even if other writers made it cyclic.
        let parent_changed = updated.parent_id != stored.parent_id;
        if let Some(parent_uuid) = updated.parent_id.filter(|_| parent_changed) {
            if parent_uuid == updated.id {
                return Err(TreeServiceError::CycleDetected {
                    member_uuid: updated.id,
                    parent_uuid,
                });
            }
            self.ensure_same_family(stored.family_id, parent_uuid)?;
            if self.would_create_cycle(stored.family_id, updated.id, parent_uuid)? {
                return Err(TreeServiceError::CycleDetected {
                    member_uuid: updated.id,
                    parent_uuid,
                });
            }
        }

        self.members.update_member(&updated)?;
        info!(
            "event=member_update module=service status=ok family_id={} has_parent={}",
            updated.family_id,
            updated.parent_id.is_some()
        );
        Ok(())
    }

    fn require_family(&self, family_id: FamilyId) -> Result<Family, TreeServiceError> {
        self.families
            .get_family(family_id)?
            .ok_or(TreeServiceError::FamilyNotFound(family_id))
    }

    fn ensure_same_family(
        &self,
        family_id: FamilyId,
        parent_uuid: MemberId,
    ) -> Result<(), TreeServiceError> {
        let parent = self
            .members
            .get_member(parent_uuid)?
            .ok_or(TreeServiceError::ParentNotFound(parent_uuid))?;
        if parent.family_id != family_id {
            return Err(TreeServiceError::ParentInOtherFamily {
                member_family: family_id,
                parent_uuid,
            });
        }
        Ok(())
    }

    /// Walks up from `candidate_parent`; reaching `member_uuid` means the edge
    /// would close a loop. A pre-existing cycle above the candidate that does
    /// not contain `member_uuid` stops the walk without rejecting the edge.
    fn would_create_cycle(
        &self,
        family_id: FamilyId,
        member_uuid: MemberId,
        candidate_parent: MemberId,
    ) -> Result<bool, TreeServiceError> {
        let links = self.members.list_member_links(family_id)?;
        let map = ParentMap::build(&links);

        let mut guard = VisitGuard::new();
        let mut cursor = Some(candidate_parent);
        while let Some(current) = cursor {
            if current == member_uuid {
                return Ok(true);
            }
            if guard.enter(current).is_err() {
                return Ok(false);
            }
            cursor = map.parent_of(current);
        }
        Ok(false)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
