//! Member domain model.
//!
//! # Responsibility
//! - Define the canonical person record stored in a family tree.
//! - Expose the minimal `ParentLink` view consumed by the graph engine.
//!
//! # Invariants
//! - `id` is stable and never reused for another member.
//! - `parent_id` is the only structural edge; relationship records are not.
//! - `date_of_birth`, when set, is an ISO calendar date `YYYY-MM-DD`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::model::family::FamilyId;

/// Stable identifier for one family member.
pub type MemberId = Uuid;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid iso date regex"));

/// Minimal parent-pointer view of a tree node.
///
/// The stats engine and hierarchy builder only ever consult these two
/// accessors, so callers can hand them either full `Member` rows or the
/// lighter `MemberLink` projection.
pub trait ParentLink {
    /// Stable id of this node.
    fn member_id(&self) -> MemberId;
    /// Direct parent id, if one was recorded.
    fn parent_id(&self) -> Option<MemberId>;
}

/// `(id, parent_id)` projection of a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLink {
    pub id: MemberId,
    pub parent_id: Option<MemberId>,
}

impl MemberLink {
    pub fn new(id: MemberId, parent_id: Option<MemberId>) -> Self {
        Self { id, parent_id }
    }
}

impl ParentLink for MemberLink {
    fn member_id(&self) -> MemberId {
        self.id
    }

    fn parent_id(&self) -> Option<MemberId> {
        self.parent_id
    }
}

/// Validation failures for member write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    /// First name is blank after trim.
    BlankFirstName,
    /// Last name is blank after trim.
    BlankLastName,
    /// Date of birth is not a valid `YYYY-MM-DD` calendar date.
    InvalidDateOfBirth(String),
}

impl Display for MemberValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankFirstName => write!(f, "first name must not be blank"),
            Self::BlankLastName => write!(f, "last name must not be blank"),
            Self::InvalidDateOfBirth(value) => {
                write!(f, "date of birth `{value}` must be formatted YYYY-MM-DD")
            }
        }
    }
}

impl Error for MemberValidationError {}

/// Canonical person record in a family tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable member id.
    pub id: MemberId,
    /// Owning family.
    pub family_id: FamilyId,
    pub first_name: String,
    pub last_name: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    pub biography: Option<String>,
    /// Opaque reference into external picture storage.
    pub picture_url: Option<String>,
    /// Direct parent. `None` means the member is a root.
    pub parent_id: Option<MemberId>,
    /// Epoch ms creation timestamp. Zero until persisted.
    pub created_at: i64,
}

impl Member {
    /// Creates a member with a generated stable id and no optional fields.
    pub fn new(
        family_id: FamilyId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), family_id, first_name, last_name)
    }

    /// Creates a member with a caller-provided stable id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: MemberId,
        family_id: FamilyId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            family_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            biography: None,
            picture_url: None,
            parent_id: None,
            created_at: 0,
        }
    }

    /// Builder-style parent assignment.
    pub fn with_parent(mut self, parent_id: Option<MemberId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Returns `"first last"` with surrounding whitespace removed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Returns the `(id, parent_id)` projection of this member.
    pub fn link(&self) -> MemberLink {
        MemberLink::new(self.id, self.parent_id)
    }

    /// Checks write-path invariants.
    ///
    /// # Errors
    /// - Blank first or last name.
    /// - `date_of_birth` that is not a real `YYYY-MM-DD` calendar date.
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(MemberValidationError::BlankFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(MemberValidationError::BlankLastName);
        }
        if let Some(dob) = self.date_of_birth.as_deref() {
            if !is_calendar_date(dob) {
                return Err(MemberValidationError::InvalidDateOfBirth(dob.to_string()));
            }
        }
        Ok(())
    }
}

impl ParentLink for Member {
    fn member_id(&self) -> MemberId {
        self.id
    }

    fn parent_id(&self) -> Option<MemberId> {
        self.parent_id
    }
}

fn is_calendar_date(value: &str) -> bool {
    let Some(captures) = ISO_DATE_RE.captures(value) else {
        return false;
    };
    let parse = |index: usize| -> Option<u32> { captures.get(index)?.as_str().parse().ok() };
    let (Some(year), Some(month), Some(day)) = (parse(1), parse(2), parse(3)) else {
        return false;
    };

    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days_in_month).contains(&day)
}

#[cfg(test)]
mod tests {
    use super::{is_calendar_date, Member, MemberValidationError, ParentLink};
    use uuid::Uuid;

    #[test]
    fn validate_rejects_blank_names() {
        let family = Uuid::new_v4();
        let member = Member::new(family, "  ", "Smith");
        assert_eq!(member.validate(), Err(MemberValidationError::BlankFirstName));

        let member = Member::new(family, "Ada", "");
        assert_eq!(member.validate(), Err(MemberValidationError::BlankLastName));
    }

    #[test]
    fn validate_checks_calendar_dates() {
        let mut member = Member::new(Uuid::new_v4(), "Ada", "Lovelace");
        member.date_of_birth = Some("1815-12-10".to_string());
        assert!(member.validate().is_ok());

        member.date_of_birth = Some("1815-13-10".to_string());
        assert!(matches!(
            member.validate(),
            Err(MemberValidationError::InvalidDateOfBirth(_))
        ));
    }

    #[test]
    fn calendar_date_handles_leap_years() {
        assert!(is_calendar_date("2000-02-29"));
        assert!(is_calendar_date("2024-02-29"));
        assert!(!is_calendar_date("1900-02-29"));
        assert!(!is_calendar_date("2023-02-29"));
        assert!(!is_calendar_date("10/12/1815"));
    }

    #[test]
    fn display_name_trims_missing_parts() {
        let member = Member::new(Uuid::new_v4(), " Ada ", " Lovelace ");
        assert_eq!(member.display_name(), "Ada Lovelace");
    }

    #[test]
    fn link_projects_parent_pointer() {
        let parent = Uuid::new_v4();
        let member = Member::new(Uuid::new_v4(), "Ada", "Byron").with_parent(Some(parent));
        let link = member.link();
        assert_eq!(link.member_id(), member.id);
        assert_eq!(link.parent_id(), Some(parent));
    }
}
