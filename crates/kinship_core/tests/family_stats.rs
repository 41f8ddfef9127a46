use kinship_core::db::open_db_in_memory;
use kinship_core::{
    FamilyService, FamilyServiceError, FamilyStats, Member, MemberRepository,
    SqliteFamilyRepository, SqliteMemberRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn service(conn: &Connection) -> FamilyService<SqliteFamilyRepository<'_>, SqliteMemberRepository<'_>> {
    FamilyService::new(
        SqliteFamilyRepository::try_new(conn).unwrap(),
        SqliteMemberRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn new_family_has_one_member_and_one_generation() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let (family, creator) = service.create_family("  Lovelace  ").unwrap();
    assert_eq!(family.name, "Lovelace");
    assert_eq!(creator.display_name(), "Family Creator");

    let stats = service.family_stats(family.id).unwrap();
    assert_eq!(stats.family, family);
    assert_eq!(
        stats.stats,
        FamilyStats {
            member_count: 1,
            generation_count: 1
        }
    );
}

#[test]
fn stats_follow_the_deepest_chain() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let (family, creator) = service.create_family("Chain").unwrap();

    let c1 = members
        .create_member(&Member::new(family.id, "C", "One").with_parent(Some(creator.id)))
        .unwrap();
    let c2 = members
        .create_member(&Member::new(family.id, "C", "Two").with_parent(Some(c1.id)))
        .unwrap();
    members
        .create_member(&Member::new(family.id, "C", "Three").with_parent(Some(c2.id)))
        .unwrap();
    members
        .create_member(&Member::new(family.id, "Side", "Root"))
        .unwrap();

    let stats = service.family_stats(family.id).unwrap().stats;
    assert_eq!(stats.member_count, 5);
    assert_eq!(stats.generation_count, 4);
}

#[test]
fn stats_tolerate_cycles_written_by_other_writers() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let (family, creator) = service.create_family("Loop").unwrap();
    let other = members
        .create_member(&Member::new(family.id, "Other", "Loop").with_parent(Some(creator.id)))
        .unwrap();
    members.set_parent(creator.id, Some(other.id)).unwrap();

    let stats = service.family_stats(family.id).unwrap().stats;
    assert_eq!(stats.member_count, 2);
    assert_eq!(stats.generation_count, 1);
}

#[test]
fn missing_family_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let missing = Uuid::new_v4();
    let err = service.family_stats(missing).unwrap_err();
    assert!(matches!(err, FamilyServiceError::FamilyNotFound(id) if id == missing));
}

#[test]
fn blank_family_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(matches!(
        service.create_family("   ").unwrap_err(),
        FamilyServiceError::InvalidFamilyName
    ));
}

#[test]
fn listing_returns_every_family_with_stats_oldest_first() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (first, _) = service.create_family("First").unwrap();
    let (second, _) = service.create_family("Second").unwrap();

    let listed = service.list_families_with_stats().unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|entry| entry.family.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(listed
        .iter()
        .all(|entry| entry.stats.member_count == 1 && entry.stats.generation_count == 1));
}

#[test]
fn rename_and_delete_family() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (family, _) = service.create_family("Old").unwrap();

    service.rename_family(family.id, "New").unwrap();
    assert_eq!(service.family_stats(family.id).unwrap().family.name, "New");

    service.delete_family(family.id).unwrap();
    assert!(matches!(
        service.family_stats(family.id).unwrap_err(),
        FamilyServiceError::FamilyNotFound(_)
    ));
}

#[test]
fn stats_serialize_flat() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let (family, _) = service.create_family("Json").unwrap();

    let value = serde_json::to_value(service.family_stats(family.id).unwrap()).unwrap();
    assert_eq!(value["id"], family.id.to_string());
    assert_eq!(value["name"], "Json");
    assert_eq!(value["member_count"], 1);
    assert_eq!(value["generation_count"], 1);
    assert!(value.get("created_at").is_some());
}
