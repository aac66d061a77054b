//! Batch sizing and commit cadence, observed through the recording connection

use crate::common::*;

fn wide_frame(fields: usize) -> Frame {
    (0..fields)
        .map(|i| Field::new(format!("f{}", i), i as i32))
        .collect()
}

#[test]
fn test_default_batch_size_splits_251_rows() {
    let mut conn = RecordingConnection::new();
    let config = StoreConfig::default();

    let stored = create(&wide_frame(251), &mut conn, &config, &AnsiDialect).unwrap();

    assert_eq!(stored.rows_committed, 251);
    assert_eq!(stored.last_committed_batch, Some(1));
    assert!(stored.is_complete());
    assert_eq!(conn.batch_sizes(), vec![250, 1]);
    assert_eq!(conn.commits(), 2);
    assert_eq!(conn.committed_row_count(), 251);
}

#[test]
fn test_exact_multiple_has_no_trailing_batch() {
    let mut conn = RecordingConnection::new();
    let config = StoreConfig::default().with_batch_size(5);

    create(&wide_frame(10), &mut conn, &config, &AnsiDialect).unwrap();

    assert_eq!(conn.batch_sizes(), vec![5, 5]);
    assert_eq!(conn.commits(), 2);
}

#[test]
fn test_nested_rows_count_towards_batches() {
    let mut conn = RecordingConnection::new();
    let config = StoreConfig::default().with_batch_size(3);

    // Team + 2 person frames + 4 names
    let stored = create(&team(), &mut conn, &config, &AnsiDialect).unwrap();

    assert_eq!(stored.rows_committed, 7);
    assert_eq!(conn.batch_sizes(), vec![3, 3, 1]);
}

#[test]
fn test_empty_frame_executes_nothing() {
    let mut conn = RecordingConnection::new();
    let stored = create(&Frame::new(), &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap();

    assert_eq!(stored.rows_committed, 0);
    assert_eq!(stored.last_committed_batch, None);
    assert!(conn.batch_sizes().is_empty());
    assert_eq!(conn.row_count(), 0);
}

#[test]
fn test_auto_commit_restored_after_write() {
    let mut conn = RecordingConnection::new();
    assert!(conn.auto_commit());
    create(&team(), &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap();
    assert!(conn.auto_commit());

    conn.set_auto_commit(false).unwrap();
    create(&team(), &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap();
    assert!(!conn.auto_commit());
}

#[test]
fn test_update_inserts_in_one_commit() {
    let mut conn = RecordingConnection::new();
    let config = StoreConfig::default().with_batch_size(2);
    let stored = create(&person("Alice", "Smith"), &mut conn, &config, &AnsiDialect).unwrap();
    let commits_before = conn.commits();

    update(&stored.root_id, &wide_frame(5), &mut conn, &config, &AnsiDialect).unwrap();

    assert_eq!(conn.commits(), commits_before + 1);
    assert_eq!(conn.active_row_count(), 5);
    assert_eq!(conn.row_count(), 7);
}

#[test]
fn test_statements_target_configured_table() {
    let mut conn = RecordingConnection::with_table("frames");
    let config = StoreConfig::default()
        .with_schema("app")
        .with_table("frames");

    create(&team(), &mut conn, &config, &AnsiDialect).unwrap();

    let statements = conn.statements();
    assert!(!statements.is_empty());
    assert!(statements
        .iter()
        .all(|sql| sql.contains(r#""app"."frames""#)));
}
