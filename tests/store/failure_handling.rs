//! Partial success, rollback and error classification

use crate::common::*;

fn five_fields() -> Frame {
    Frame::new()
        .with("a", 1i32)
        .with("b", 2i32)
        .with("c", 3i32)
        .with("d", 4i32)
        .with("e", 5i32)
}

#[test]
fn test_failed_batch_keeps_earlier_batches() {
    let mut conn = RecordingConnection::new().fail_batch(1);
    let config = StoreConfig::default().with_batch_size(2);

    let err = create(&five_fields(), &mut conn, &config, &AnsiDialect).unwrap_err();

    assert!(err.is_persistence());
    let partial = err.partial().unwrap();
    assert_eq!(partial.rows_committed, 2);
    assert_eq!(partial.rows_failed, 3);
    assert_eq!(partial.last_committed_batch, Some(0));
    assert!(!partial.is_complete());

    assert_eq!(conn.rollbacks(), 1);
    assert_eq!(conn.committed_row_count(), 2);
    assert_eq!(conn.row_count(), 2);
    assert!(conn.auto_commit());
}

#[test]
fn test_first_batch_failure_commits_nothing() {
    let mut conn = RecordingConnection::new().fail_batch(0);
    let err = create(&team(), &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap_err();

    let partial = err.partial().unwrap();
    assert_eq!(partial.rows_committed, 0);
    assert_eq!(partial.rows_failed, 7);
    assert_eq!(partial.last_committed_batch, None);
    assert_eq!(conn.row_count(), 0);
}

#[test]
fn test_persistence_error_names_operation() {
    let mut conn = RecordingConnection::new().fail_batch(0);
    let err = create(&team(), &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap_err();

    match &err {
        StoreError::Persistence { operation, detail, .. } => {
            assert_eq!(*operation, "create");
            assert!(detail.contains("injected failure"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("Persistence error during create"));
}

#[test]
fn test_failed_rollback_still_reports_original_error() {
    let mut conn = RecordingConnection::new().fail_batch(0).fail_rollback();
    let err = create(&team(), &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap_err();

    assert!(err.is_persistence());
    assert!(err.to_string().contains("injected failure"));
    assert_eq!(conn.rollbacks(), 1);
    assert!(conn.auto_commit());
}

#[test]
fn test_query_failure_during_read() {
    let mut writer = RecordingConnection::new();
    let stored = create(&team(), &mut writer, &StoreConfig::default(), &AnsiDialect).unwrap();

    let mut reader = writer.clone().fail_queries();
    let err = read(&stored.root_id, &mut reader, &StoreConfig::default(), &AnsiDialect)
        .unwrap_err();
    match err {
        StoreError::Persistence { operation, partial, .. } => {
            assert_eq!(operation, "read");
            assert!(partial.is_none());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_update_failure_restores_previous_content() {
    let mut conn = RecordingConnection::new();
    let config = StoreConfig::default();
    let stored = create(&team(), &mut conn, &config, &AnsiDialect).unwrap();

    // deactivation is batch 1, the first insert batch is 2
    conn.set_fail_batch(Some(2));
    let err = update(&stored.root_id, &five_fields(), &mut conn, &config, &AnsiDialect)
        .unwrap_err();

    assert_eq!(err.partial().unwrap().rows_committed, 0);
    assert_eq!(conn.active_row_count(), 7);
    conn.set_fail_batch(None);
    assert_eq!(
        read(&stored.root_id, &mut conn, &config, &AnsiDialect).unwrap(),
        Some(team())
    );
}

#[test]
fn test_missing_table_is_not_a_persistence_error() {
    let mut conn = RecordingConnection::without_table();
    let err = create(&team(), &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap_err();

    assert!(!err.is_persistence());
    assert_eq!(err.to_string(), "Table not found: frame_store");
    assert!(conn.batch_sizes().is_empty());
}

#[test]
fn test_invalid_config_rejected_before_any_sql() {
    let mut conn = RecordingConnection::new();
    let config = StoreConfig::default().with_batch_size(0);
    let err = create(&team(), &mut conn, &config, &AnsiDialect).unwrap_err();

    assert!(matches!(err, StoreError::Config(_)));
    assert!(conn.statements().is_empty());
}

#[test]
fn test_oversized_name_rejected_before_any_sql() {
    let mut conn = RecordingConnection::new();
    let frame = Frame::new().with("n".repeat(65), 1i32);
    let err = create(&frame, &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap_err();

    assert!(matches!(err, StoreError::InvalidSlot(_)));
    assert!(conn.statements().is_empty());
}

#[cfg(feature = "sqlite")]
#[test]
fn test_sqlite_duplicate_key_mid_create() {
    let (mut conn, _) = sqlite_store();
    let config = StoreConfig::default().with_batch_size(2);

    // rows 11, 12, 13 under root 10
    let first = Frame::new().with("x", 1i32).with("y", 2i32).with("z", 3i32);
    create_with(
        &first,
        &mut conn,
        &config,
        &SqliteDialect,
        &SequentialIds::starting_at(10),
    )
    .unwrap();

    // rows 9..=13 under root 8; the second batch hits row 11
    let err = create_with(
        &five_fields(),
        &mut conn,
        &config,
        &SqliteDialect,
        &SequentialIds::starting_at(8),
    )
    .unwrap_err();

    let partial = err.partial().unwrap();
    assert_eq!(partial.rows_committed, 2);
    assert_eq!(partial.rows_failed, 3);
    assert!(err.to_string().contains("UNIQUE"));
    assert!(conn.auto_commit());

    let rows = conn.query("SELECT * FROM frame_store", &[]).unwrap();
    assert_eq!(rows.len(), 5);
}
