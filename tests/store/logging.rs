//! Structured log output of store operations

use crate::common::*;

#[test]
fn test_create_logs_batches_and_summary() {
    let logs = LogCapture::new();
    let mut conn = RecordingConnection::new();
    let frame: Frame = (0..251i32).map(|i| Field::new(format!("f{}", i), i)).collect();

    logs.run(|| create(&frame, &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap());

    assert_eq!(logs.lines_with("Batch executed").len(), 2);
    let summary = logs.lines_with("Frame created");
    assert_eq!(summary.len(), 1);
    assert!(summary[0].contains("framestore::store"));
    assert!(summary[0].contains("rows=251"));
}

#[test]
fn test_failed_create_logs_error() {
    let logs = LogCapture::new();
    let mut conn = RecordingConnection::new().fail_batch(0);

    let result = logs.run(|| create(&team(), &mut conn, &StoreConfig::default(), &AnsiDialect));
    assert!(result.is_err());

    let failures = logs.lines_with("Frame create failed");
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("ERROR"));
    assert!(failures[0].contains("framestore::store"));
    assert!(failures[0].contains("rows_failed=7"));
}

#[test]
fn test_failed_rollback_logs_warning() {
    let logs = LogCapture::new();
    let mut conn = RecordingConnection::new().fail_batch(0).fail_rollback();

    let result = logs.run(|| create(&team(), &mut conn, &StoreConfig::default(), &AnsiDialect));
    assert!(result.is_err());

    let warnings = logs.lines_with("Rollback failed");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("WARN"));
    assert!(warnings[0].contains("injected rollback failure"));
}

#[test]
fn test_unknown_id_logs_at_debug() {
    let logs = LogCapture::new();
    let mut conn = RecordingConnection::new();

    let found = logs.run(|| {
        read(&SysId::new(), &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap()
    });

    assert_eq!(found, None);
    assert_eq!(logs.lines_with("No active slots").len(), 1);
    assert!(logs.lines_with("Frame read").is_empty());
}
