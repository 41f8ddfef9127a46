//! Family repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist family metadata.
//! - Create a family together with its founding member atomically.
//!
//! # Invariants
//! - Family listing is deterministic: `created_at ASC, rowid ASC`.
//! - Deleting a family cascades to its members and relationship records.

use crate::model::family::{Family, FamilyId};
use crate::model::member::Member;
use crate::repo::member_repo::{insert_member, load_member};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const FAMILY_SELECT_SQL: &str = "SELECT id, name, created_at FROM families";

/// Repository interface for family operations.
pub trait FamilyRepository {
    /// Creates a family and its founding member in one transaction.
    ///
    /// `founder.family_id` is overwritten with the new family id.
    fn create_family_with_founder(
        &self,
        name: &str,
        founder: Member,
    ) -> RepoResult<(Family, Member)>;
    /// Loads one family by id.
    fn get_family(&self, id: FamilyId) -> RepoResult<Option<Family>>;
    /// Lists all families, oldest first.
    fn list_families(&self) -> RepoResult<Vec<Family>>;
    /// Renames one family.
    fn rename_family(&self, id: FamilyId, name: &str) -> RepoResult<()>;
    /// Deletes one family and, through cascade, all of its members.
    fn delete_family(&self, id: FamilyId) -> RepoResult<()>;
}

/// SQLite-backed family repository.
pub struct SqliteFamilyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFamilyRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["families", "members"])?;
        Ok(Self { conn })
    }
}

impl FamilyRepository for SqliteFamilyRepository<'_> {
    fn create_family_with_founder(
        &self,
        name: &str,
        mut founder: Member,
    ) -> RepoResult<(Family, Member)> {
        let family_id = Uuid::new_v4();
        founder.family_id = family_id;
        founder.parent_id = None;
        founder.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO families (id, name) VALUES (?1, ?2);",
            params![family_id.to_string(), name],
        )?;
        insert_member(&tx, &founder)?;

        let family = load_family(&tx, family_id)?.ok_or(RepoError::FamilyNotFound(family_id))?;
        let founder =
            load_member(&tx, founder.id)?.ok_or(RepoError::MemberNotFound(founder.id))?;
        tx.commit()?;
        Ok((family, founder))
    }

    fn get_family(&self, id: FamilyId) -> RepoResult<Option<Family>> {
        load_family(self.conn, id)
    }

    fn list_families(&self) -> RepoResult<Vec<Family>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FAMILY_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut families = Vec::new();
        while let Some(row) = rows.next()? {
            families.push(parse_family_row(row)?);
        }
        Ok(families)
    }

    fn rename_family(&self, id: FamilyId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE families SET name = ?2 WHERE id = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::FamilyNotFound(id));
        }
        Ok(())
    }

    fn delete_family(&self, id: FamilyId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM families WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::FamilyNotFound(id));
        }
        Ok(())
    }
}

fn load_family(conn: &Connection, id: FamilyId) -> RepoResult<Option<Family>> {
    let mut stmt = conn.prepare(&format!("{FAMILY_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_family_row(row)?));
    }
    Ok(None)
}

fn parse_family_row(row: &Row<'_>) -> RepoResult<Family> {
    let id_text: String = row.get("id")?;
    Ok(Family {
        id: parse_uuid(&id_text, "families.id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}
