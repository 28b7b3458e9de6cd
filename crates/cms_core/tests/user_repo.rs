use cms_core::db::open_db_in_memory;
use cms_core::{
    EntryRepository, NewUser, RepoError, SqliteEntryRepository, SqliteUserRepository,
    UserRepository, UserStatus,
};

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let new_user = NewUser::new("editor", "editor@example.com").with_status(UserStatus::Active);
    let created = repo.create_user(&new_user).unwrap();

    let loaded = repo.get_user(created.id).unwrap().unwrap();
    assert_eq!(loaded.uid, new_user.uid);
    assert_eq!(loaded.username, "editor");
    assert_eq!(loaded.status, UserStatus::Active);
    assert!(!loaded.admin);
    assert!(loaded.created_at > 0);
}

#[test]
fn create_rejects_invalid_user_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let err = repo
        .create_user(&NewUser::new("", "nobody@example.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_users().unwrap().is_empty());
}

#[test]
fn find_users_by_ids_keeps_caller_order_and_drops_unknown() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let a = repo.create_user(&NewUser::new("a", "a@example.com")).unwrap();
    let b = repo.create_user(&NewUser::new("b", "b@example.com")).unwrap();
    let c = repo.create_user(&NewUser::new("c", "c@example.com")).unwrap();

    let found = repo
        .find_users_by_ids(&[c.id, 9_999, a.id, c.id, b.id])
        .unwrap();
    let ids: Vec<_> = found.iter().map(|user| user.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);

    assert!(repo.find_users_by_ids(&[]).unwrap().is_empty());
}

#[test]
fn admin_user_ids_lists_only_admins() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let root = repo
        .create_user(&NewUser::new("root", "root@example.com").admin())
        .unwrap();
    repo.create_user(&NewUser::new("writer", "writer@example.com"))
        .unwrap();
    let ops = repo
        .create_user(&NewUser::new("ops", "ops@example.com").admin())
        .unwrap();

    assert_eq!(repo.admin_user_ids().unwrap(), vec![root.id, ops.id]);
}

#[test]
fn set_user_status_updates_and_reports_missing_user() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let user = repo
        .create_user(&NewUser::new("pending", "pending@example.com"))
        .unwrap();
    repo.set_user_status(user.id, UserStatus::Suspended).unwrap();
    assert_eq!(
        repo.get_user(user.id).unwrap().unwrap().status,
        UserStatus::Suspended
    );

    let err = repo
        .set_user_status(4_242, UserStatus::Active)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "user",
            id: 4_242
        }
    ));
}

#[test]
fn delete_user_rejects_transfer_to_itself() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let entries = SqliteEntryRepository::try_new(&conn).unwrap();

    let user = repo.create_user(&NewUser::new("solo", "solo@example.com")).unwrap();
    entries.create_entry(user.id, "Mine").unwrap();

    let err = repo.delete_user(&user, Some(&user)).unwrap_err();
    assert!(matches!(err, RepoError::SelfTransfer(id) if id == user.id));
    assert!(repo.get_user(user.id).unwrap().is_some());
    assert_eq!(entries.count_entries().unwrap(), 1);
}

#[test]
fn delete_missing_user_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let gone = repo.create_user(&NewUser::new("gone", "gone@example.com")).unwrap();
    let heir = repo.create_user(&NewUser::new("heir", "heir@example.com")).unwrap();
    repo.delete_user(&gone, None).unwrap();

    let err = repo.delete_user(&gone, Some(&heir)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "user", .. }));
}

#[test]
fn create_entry_requires_existing_author_and_title() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let entries = SqliteEntryRepository::try_new(&conn).unwrap();

    let missing = entries.create_entry(77, "Orphan").unwrap_err();
    assert!(matches!(
        missing,
        RepoError::NotFound {
            entity: "user",
            id: 77
        }
    ));

    let author = users.create_user(&NewUser::new("w", "w@example.com")).unwrap();
    let blank = entries.create_entry(author.id, "   ").unwrap_err();
    assert!(matches!(blank, RepoError::InvalidInput(_)));

    let entry = entries.create_entry(author.id, "  Trimmed  ").unwrap();
    assert_eq!(entry.title, "Trimmed");
    assert_eq!(entries.get_entry(entry.id).unwrap(), Some(entry));
}
