//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist member records and their `parent_id` edge.
//! - Provide the flat member snapshot consumed by the graph engine.
//! - Store best-effort relationship records.
//!
//! # Invariants
//! - Member listing preserves insertion order: `created_at ASC, rowid ASC`.
//! - `set_parent` writes the edge as given; hierarchy checks live in services.
//! - Relationship inserts are idempotent per `(member, related, type)`.

use crate::model::family::FamilyId;
use crate::model::member::{Member, MemberId, MemberLink};
use crate::model::relationship::{Relationship, RelationshipType};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const MEMBER_SELECT_SQL: &str = "SELECT
    id,
    family_id,
    first_name,
    last_name,
    date_of_birth,
    biography,
    picture_url,
    parent_id,
    created_at
FROM members";

/// Repository interface for member operations.
pub trait MemberRepository {
    /// Inserts one member and returns the stored row.
    fn create_member(&self, member: &Member) -> RepoResult<Member>;
    /// Replaces all editable fields of an existing member.
    fn update_member(&self, member: &Member) -> RepoResult<()>;
    /// Loads one member by id.
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    /// Lists one family's members in insertion order.
    fn list_members(&self, family_id: FamilyId) -> RepoResult<Vec<Member>>;
    /// Lists one family's `(id, parent_id)` pairs in insertion order.
    fn list_member_links(&self, family_id: FamilyId) -> RepoResult<Vec<MemberLink>>;
    /// Overwrites one member's parent edge without hierarchy checks.
    fn set_parent(&self, id: MemberId, parent_id: Option<MemberId>) -> RepoResult<()>;
    /// Stores one labeled relationship record.
    fn record_relationship(&self, relationship: &Relationship) -> RepoResult<()>;
    /// Lists relationship records where `member_id` is the subject.
    fn list_relationships(&self, member_id: MemberId) -> RepoResult<Vec<Relationship>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["families", "members", "relationships"])?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&self, member: &Member) -> RepoResult<Member> {
        member.validate()?;
        ensure_family_exists(self.conn, member.family_id)?;
        insert_member(self.conn, member)?;
        load_member(self.conn, member.id)?.ok_or(RepoError::MemberNotFound(member.id))
    }

    fn update_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                first_name = ?2,
                last_name = ?3,
                date_of_birth = ?4,
                biography = ?5,
                picture_url = ?6,
                parent_id = ?7
             WHERE id = ?1;",
            params![
                member.id.to_string(),
                member.first_name.trim(),
                member.last_name.trim(),
                member.date_of_birth.as_deref(),
                member.biography.as_deref(),
                member.picture_url.as_deref(),
                member.parent_id.map(|value| value.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::MemberNotFound(member.id));
        }
        Ok(())
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        load_member(self.conn, id)
    }

    fn list_members(&self, family_id: FamilyId) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL}
             WHERE family_id = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([family_id.to_string()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn list_member_links(&self, family_id: FamilyId) -> RepoResult<Vec<MemberLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, parent_id
             FROM members
             WHERE family_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([family_id.to_string()])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            let parent_id = row
                .get::<_, Option<String>>("parent_id")?
                .map(|value| parse_uuid(&value, "members.parent_id"))
                .transpose()?;
            links.push(MemberLink::new(
                parse_uuid(&id_text, "members.id")?,
                parent_id,
            ));
        }
        Ok(links)
    }

    fn set_parent(&self, id: MemberId, parent_id: Option<MemberId>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members SET parent_id = ?2 WHERE id = ?1;",
            params![id.to_string(), parent_id.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(RepoError::MemberNotFound(id));
        }
        Ok(())
    }

    fn record_relationship(&self, relationship: &Relationship) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO relationships (
                member_id,
                related_member_id,
                relationship_type
            ) VALUES (?1, ?2, ?3);",
            params![
                relationship.member_id.to_string(),
                relationship.related_member_id.to_string(),
                relationship.relationship_type.as_str(),
            ],
        )?;
        Ok(())
    }

    fn list_relationships(&self, member_id: MemberId) -> RepoResult<Vec<Relationship>> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id, related_member_id, relationship_type
             FROM relationships
             WHERE member_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([member_id.to_string()])?;
        let mut relationships = Vec::new();
        while let Some(row) = rows.next()? {
            let subject: String = row.get("member_id")?;
            let related: String = row.get("related_member_id")?;
            let kind_text: String = row.get("relationship_type")?;
            let relationship_type = RelationshipType::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid relationship type `{kind_text}` in relationships.relationship_type"
                ))
            })?;
            relationships.push(Relationship {
                member_id: parse_uuid(&subject, "relationships.member_id")?,
                related_member_id: parse_uuid(&related, "relationships.related_member_id")?,
                relationship_type,
            });
        }
        Ok(relationships)
    }
}

pub(crate) fn insert_member(conn: &Connection, member: &Member) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO members (
            id,
            family_id,
            first_name,
            last_name,
            date_of_birth,
            biography,
            picture_url,
            parent_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            member.id.to_string(),
            member.family_id.to_string(),
            member.first_name.trim(),
            member.last_name.trim(),
            member.date_of_birth.as_deref(),
            member.biography.as_deref(),
            member.picture_url.as_deref(),
            member.parent_id.map(|value| value.to_string()),
        ],
    )?;
    Ok(())
}

pub(crate) fn load_member(conn: &Connection, id: MemberId) -> RepoResult<Option<Member>> {
    let mut stmt = conn.prepare(&format!("{MEMBER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_member_row(row)?));
    }
    Ok(None)
}

fn ensure_family_exists(conn: &Connection, family_id: FamilyId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM families WHERE id = ?1);",
        [family_id.to_string()],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::FamilyNotFound(family_id));
    }
    Ok(())
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let id_text: String = row.get("id")?;
    let family_text: String = row.get("family_id")?;
    let parent_id = row
        .get::<_, Option<String>>("parent_id")?
        .map(|value| parse_uuid(&value, "members.parent_id"))
        .transpose()?;

    Ok(Member {
        id: parse_uuid(&id_text, "members.id")?,
        family_id: parse_uuid(&family_text, "members.family_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        date_of_birth: row.get("date_of_birth")?,
        biography: row.get("biography")?,
        picture_url: row.get("picture_url")?,
        parent_id,
        created_at: row.get("created_at")?,
    })
}
