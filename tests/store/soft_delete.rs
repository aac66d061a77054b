//! update and delete retire rows instead of removing them

use crate::common::*;

fn count(conn: &mut impl RowStoreConnection, filter: &str) -> usize {
    let sql = format!("SELECT * FROM frame_store{}", filter);
    conn.query(&sql, &[]).unwrap().len()
}

/// Team stored under root 1: Team=2, Alice=3 (4, 5), Bob=6 (7, 8)
fn stored_team(conn: &mut impl RowStoreConnection, config: &StoreConfig) -> SysId {
    create_with(&team(), conn, config, &SqliteDialect, &SequentialIds::starting_at(1))
        .unwrap()
        .root_id
}

#[test]
fn test_delete_retires_every_row() {
    let (mut conn, config) = sqlite_store();
    let root = stored_team(&mut conn, &config);

    let flagged = delete(&root, &mut conn, &config, &SqliteDialect).unwrap();

    assert_eq!(flagged, 7);
    assert_eq!(read(&root, &mut conn, &config, &SqliteDialect).unwrap(), None);
    assert_eq!(count(&mut conn, ""), 7);
    assert_eq!(count(&mut conn, " WHERE Active = 1"), 0);
}

#[test]
fn test_delete_stamps_modifier() {
    let (mut conn, config) = sqlite_store();
    let root = stored_team(&mut conn, &config);

    let cleaner = config.clone().with_entity("cleaner");
    delete(&root, &mut conn, &cleaner, &SqliteDialect).unwrap();

    let rows = conn
        .query("SELECT CreatedBy, ModifiedBy FROM frame_store", &[])
        .unwrap();
    for row in rows {
        assert_eq!(row.get("CreatedBy").and_then(|v| v.as_text()), Some("system"));
        assert_eq!(row.get("ModifiedBy").and_then(|v| v.as_text()), Some("cleaner"));
    }
}

#[test]
fn test_delete_nested_frame() {
    let (mut conn, config) = sqlite_store();
    let root = stored_team(&mut conn, &config);

    let alice = SequentialIds::id_for(3);
    assert_eq!(delete(&alice, &mut conn, &config, &SqliteDialect).unwrap(), 3);

    let back = read(&root, &mut conn, &config, &SqliteDialect).unwrap().unwrap();
    let members = back.get_as_array("Team").unwrap();
    assert_eq!(members, &[Value::Frame(person("Bob", "Jones"))]);
    assert_eq!(read(&alice, &mut conn, &config, &SqliteDialect).unwrap(), None);
}

#[test]
fn test_delete_unknown_id_is_a_no_op() {
    let (mut conn, config) = sqlite_store();
    stored_team(&mut conn, &config);

    assert_eq!(delete(&SysId::new(), &mut conn, &config, &SqliteDialect).unwrap(), 0);
    assert_eq!(count(&mut conn, " WHERE Active = 1"), 7);
}

#[test]
fn test_delete_twice_flags_nothing_new() {
    let (mut conn, config) = sqlite_store();
    let root = stored_team(&mut conn, &config);
    delete(&root, &mut conn, &config, &SqliteDialect).unwrap();
    assert_eq!(delete(&root, &mut conn, &config, &SqliteDialect).unwrap(), 0);
}

#[test]
fn test_update_replaces_root_content() {
    let (mut conn, config) = sqlite_store();
    let root = stored_team(&mut conn, &config);

    let replacement = person("Carol", "White");
    let result = update(&root, &replacement, &mut conn, &config, &SqliteDialect).unwrap();

    assert_eq!(result.root_id, root);
    assert_eq!(result.rows_committed, 2);
    assert_eq!(
        read(&root, &mut conn, &config, &SqliteDialect).unwrap(),
        Some(replacement)
    );
    assert_eq!(count(&mut conn, ""), 9);
    assert_eq!(count(&mut conn, " WHERE Active = 1"), 2);
}

#[test]
fn test_update_nested_frame_in_place() {
    let (mut conn, config) = sqlite_store();
    let root = stored_team(&mut conn, &config);

    let bob = SequentialIds::id_for(6);
    update(&bob, &person("Eve", "Adams"), &mut conn, &config, &SqliteDialect).unwrap();

    let back = read(&root, &mut conn, &config, &SqliteDialect).unwrap().unwrap();
    assert_eq!(
        back.get_as_array("Team").unwrap(),
        &[
            Value::Frame(person("Alice", "Smith")),
            Value::Frame(person("Eve", "Adams")),
        ]
    );
}

#[test]
fn test_update_with_empty_frame_clears_content() {
    let (mut conn, config) = sqlite_store();
    let root = stored_team(&mut conn, &config);

    update(&root, &Frame::new(), &mut conn, &config, &SqliteDialect).unwrap();

    assert_eq!(read(&root, &mut conn, &config, &SqliteDialect).unwrap(), None);
    assert_eq!(count(&mut conn, " WHERE Active = 1"), 0);
}
