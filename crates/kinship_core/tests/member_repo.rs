use kinship_core::db::open_db_in_memory;
use kinship_core::{
    FamilyRepository, Member, MemberLink, MemberRepository, MemberValidationError, RepoError,
    Relationship, RelationshipType, SqliteFamilyRepository, SqliteMemberRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn founder() -> Member {
    Member::new(Uuid::nil(), "Family", "Creator")
}

#[test]
fn create_family_with_founder_persists_both_rows() {
    let conn = setup();
    let families = SqliteFamilyRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let (family, creator) = families
        .create_family_with_founder("Lovelace", founder())
        .unwrap();

    assert_eq!(family.name, "Lovelace");
    assert_eq!(creator.family_id, family.id);
    assert!(creator.parent_id.is_none());
    assert!(family.created_at > 0);

    let listed = members.list_members(family.id).unwrap();
    assert_eq!(listed, vec![creator]);
}

#[test]
fn invalid_founder_leaves_no_family_behind() {
    let conn = setup();
    let families = SqliteFamilyRepository::try_new(&conn).unwrap();

    let err = families
        .create_family_with_founder("Nobody", Member::new(Uuid::nil(), "", "Creator"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(MemberValidationError::BlankFirstName)
    ));
    assert!(families.list_families().unwrap().is_empty());
}

#[test]
fn create_member_requires_existing_family() {
    let conn = setup();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let orphan_family = Uuid::new_v4();
    let err = members
        .create_member(&Member::new(orphan_family, "Ada", "Byron"))
        .unwrap_err();
    assert!(matches!(err, RepoError::FamilyNotFound(id) if id == orphan_family));
}

#[test]
fn members_and_links_keep_insertion_order() {
    let conn = setup();
    let families = SqliteFamilyRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let (family, creator) = families
        .create_family_with_founder("Byron", founder())
        .unwrap();

    let child = members
        .create_member(&Member::new(family.id, "Ada", "Byron").with_parent(Some(creator.id)))
        .unwrap();
    let grandchild = members
        .create_member(&Member::new(family.id, "Anne", "King").with_parent(Some(child.id)))
        .unwrap();

    let links = members.list_member_links(family.id).unwrap();
    assert_eq!(
        links,
        vec![
            MemberLink::new(creator.id, None),
            MemberLink::new(child.id, Some(creator.id)),
            MemberLink::new(grandchild.id, Some(child.id)),
        ]
    );
}

#[test]
fn update_member_round_trips_optional_fields() {
    let conn = setup();
    let families = SqliteFamilyRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let (family, _) = families
        .create_family_with_founder("Byron", founder())
        .unwrap();

    let mut member = members
        .create_member(&Member::new(family.id, "Ada", "Byron"))
        .unwrap();
    member.last_name = "Lovelace".to_string();
    member.date_of_birth = Some("1815-12-10".to_string());
    member.biography = Some("Wrote the first published algorithm.".to_string());
    members.update_member(&member).unwrap();

    let loaded = members.get_member(member.id).unwrap().unwrap();
    assert_eq!(loaded.last_name, "Lovelace");
    assert_eq!(loaded.date_of_birth.as_deref(), Some("1815-12-10"));
    assert_eq!(
        loaded.biography.as_deref(),
        Some("Wrote the first published algorithm.")
    );
}

#[test]
fn update_missing_member_returns_not_found() {
    let conn = setup();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let ghost = Member::new(Uuid::new_v4(), "Ghost", "Writer");
    let err = members.update_member(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::MemberNotFound(id) if id == ghost.id));
}

#[test]
fn set_parent_accepts_cycles_as_written() {
    let conn = setup();
    let families = SqliteFamilyRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let (family, creator) = families
        .create_family_with_founder("Loop", founder())
        .unwrap();
    let other = members
        .create_member(&Member::new(family.id, "Other", "Loop").with_parent(Some(creator.id)))
        .unwrap();

    members.set_parent(creator.id, Some(other.id)).unwrap();
    members.set_parent(other.id, Some(other.id)).unwrap();

    let loaded = members.get_member(other.id).unwrap().unwrap();
    assert_eq!(loaded.parent_id, Some(other.id));
}

#[test]
fn deleting_family_cascades_members_and_relationships() {
    let conn = setup();
    let families = SqliteFamilyRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let (family, creator) = families
        .create_family_with_founder("Gone", founder())
        .unwrap();
    let spouse = members
        .create_member(&Member::new(family.id, "Spouse", "Gone"))
        .unwrap();
    members
        .record_relationship(&Relationship {
            member_id: spouse.id,
            related_member_id: creator.id,
            relationship_type: RelationshipType::Spouse,
        })
        .unwrap();

    families.delete_family(family.id).unwrap();

    assert!(members.list_members(family.id).unwrap().is_empty());
    assert!(members.list_relationships(spouse.id).unwrap().is_empty());
    assert!(families.get_family(family.id).unwrap().is_none());
    assert!(matches!(
        families.delete_family(family.id).unwrap_err(),
        RepoError::FamilyNotFound(_)
    ));
}

#[test]
fn record_relationship_is_idempotent() {
    let conn = setup();
    let families = SqliteFamilyRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let (family, creator) = families
        .create_family_with_founder("Twice", founder())
        .unwrap();
    let nephew = members
        .create_member(&Member::new(family.id, "Nephew", "Twice"))
        .unwrap();

    let record = Relationship {
        member_id: nephew.id,
        related_member_id: creator.id,
        relationship_type: RelationshipType::Nephew,
    };
    members.record_relationship(&record).unwrap();
    members.record_relationship(&record).unwrap();

    assert_eq!(members.list_relationships(nephew.id).unwrap(), vec![record]);
}

#[test]
fn invalid_persisted_uuid_is_rejected_on_read() {
    let conn = setup();
    let families = SqliteFamilyRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let (family, _) = families
        .create_family_with_founder("Broken", founder())
        .unwrap();

    conn.execute(
        "INSERT INTO members (id, family_id, first_name, last_name) VALUES ('not-a-uuid', ?1, 'Bad', 'Row');",
        [family.id.to_string()],
    )
    .unwrap();

    let err = members.list_members(family.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("not-a-uuid")));
}
