//! Frame persistence over a relational row store
//!
//! A frame is flattened depth-first into [`FieldSlot`] rows and rebuilt by
//! querying children parent by parent:
//!
//! - `create`: flatten, then insert in batches of `batch_size`, committing
//!   after each batch
//! - `read`: select the active children of an id ordered by `Sequence`,
//!   recursing into FRAME and ARRAY slots
//! - `update`: retire the active descendants of an id and insert the new
//!   frame under it, in one transaction
//! - `delete`: retire an id and its active descendants
//!
//! Rows are never physically deleted; retiring sets `Active` to false and
//! stamps `ModifiedBy` / `ModifiedOn`.
//!
//! Every operation takes the connection as a parameter and leaves it open.
//! Auto-commit is switched off for writes and restored before returning.
//!
//! # Failure semantics
//!
//! A SQL error during `create` rolls back the batch in flight; earlier
//! batches stay committed. The returned [`StoreError::Persistence`] carries a
//! [`PersistResult`] describing what was committed.

use crate::config::StoreConfig;
use crate::connection::{RowStoreConnection, SqlValue};
use crate::dialect::SqlDialect;
use crate::error::{SqlError, StoreError, StoreResult};
use crate::id::{IdGenerator, SysId, UuidGenerator};
use crate::slot::FieldSlot;
use chrono::{DateTime, Utc};
use framestore_core::{registry, Field, Frame, TypeCode, Value};
use serde::Serialize;
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use tracing::{debug, error, info, warn};

/// Outcome of a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistResult {
    /// Id the frame was written under
    pub root_id: SysId,
    /// Rows committed
    pub rows_committed: usize,
    /// Rows not committed because of a failure
    pub rows_failed: usize,
    /// Zero-based index of the last committed batch
    pub last_committed_batch: Option<usize>,
}

impl PersistResult {
    fn new(root_id: SysId) -> Self {
        Self {
            root_id,
            rows_committed: 0,
            rows_failed: 0,
            last_committed_batch: None,
        }
    }

    /// Whether every row was committed
    pub fn is_complete(&self) -> bool {
        self.rows_failed == 0
    }
}

/// Persist a frame under a freshly generated root id
pub fn create<C: RowStoreConnection + ?Sized>(
    frame: &Frame,
    conn: &mut C,
    config: &StoreConfig,
    dialect: &dyn SqlDialect,
) -> StoreResult<PersistResult> {
    create_with(frame, conn, config, dialect, &UuidGenerator)
}

/// [`create`] with a caller-supplied id generator
pub fn create_with<C: RowStoreConnection + ?Sized>(
    frame: &Frame,
    conn: &mut C,
    config: &StoreConfig,
    dialect: &dyn SqlDialect,
    ids: &dyn IdGenerator,
) -> StoreResult<PersistResult> {
    const OP: &str = "create";
    config.validate()?;
    ensure_table(conn, config, OP)?;

    let root_id = ids.generate();
    let slots = get_slots(frame, root_id, ids)?;
    let statements = Statements::new(dialect, config);
    let mut progress = PersistResult::new(root_id);

    let mut txn = ManualCommit::begin(conn, OP)?;
    let now = Utc::now();
    let outcome = insert_slots(
        &mut *txn,
        &statements.insert,
        &slots,
        config,
        now,
        true,
        &mut progress,
        OP,
    );
    match outcome {
        Ok(batches) => {
            info!(
                target: "framestore::store",
                root_id = %root_id,
                rows = progress.rows_committed,
                batches,
                "Frame created"
            );
            Ok(progress)
        }
        Err(e) => {
            progress.rows_failed = slots.len() - progress.rows_committed;
            error!(
                target: "framestore::store",
                root_id = %root_id,
                rows_committed = progress.rows_committed,
                rows_failed = progress.rows_failed,
                error = %e,
                "Frame create failed"
            );
            txn.rollback_quietly(OP);
            Err(with_partial(e, progress))
        }
    }
}

/// Rebuild the frame stored under `id`
///
/// Returns `None` when `id` has no active children and names no active slot.
/// An active FRAME or ARRAY slot without children reads as an empty frame.
pub fn read<C: RowStoreConnection + ?Sized>(
    id: &SysId,
    conn: &mut C,
    config: &StoreConfig,
    dialect: &dyn SqlDialect,
) -> StoreResult<Option<Frame>> {
    const OP: &str = "read";
    config.validate()?;
    ensure_table(conn, config, OP)?;

    let statements = Statements::new(dialect, config);
    let children = select_children(conn, &statements, id, OP)?;
    if children.is_empty() {
        let own = select_slot(conn, &statements, id, OP)?;
        return Ok(match own {
            Some(slot) if slot.is_composite() => {
                debug!(target: "framestore::store", %id, "Empty composite slot");
                Some(Frame::new())
            }
            _ => {
                debug!(target: "framestore::store", %id, "No active slots");
                None
            }
        });
    }

    let frame = assemble(conn, &statements, children, 0)?;
    info!(target: "framestore::store", %id, fields = frame.len(), "Frame read");
    Ok(Some(frame))
}

/// Replace the content stored under `id` with `frame`
pub fn update<C: RowStoreConnection + ?Sized>(
    id: &SysId,
    frame: &Frame,
    conn: &mut C,
    config: &StoreConfig,
    dialect: &dyn SqlDialect,
) -> StoreResult<PersistResult> {
    update_with(id, frame, conn, config, dialect, &UuidGenerator)
}

/// [`update`] with a caller-supplied id generator
pub fn update_with<C: RowStoreConnection + ?Sized>(
    id: &SysId,
    frame: &Frame,
    conn: &mut C,
    config: &StoreConfig,
    dialect: &dyn SqlDialect,
    ids: &dyn IdGenerator,
) -> StoreResult<PersistResult> {
    const OP: &str = "update";
    config.validate()?;
    ensure_table(conn, config, OP)?;

    let slots = get_slots(frame, *id, ids)?;
    let statements = Statements::new(dialect, config);
    let mut progress = PersistResult::new(*id);

    let mut txn = ManualCommit::begin(conn, OP)?;
    let now = Utc::now();
    let outcome = (|| -> StoreResult<(usize, usize)> {
        let retired = descendants(&mut *txn, &statements, id, OP)?;
        let deactivated = deactivate(&mut *txn, &statements, &retired, config, now, OP)?;
        let batches = insert_slots(
            &mut *txn,
            &statements.insert,
            &slots,
            config,
            now,
            false,
            &mut progress,
            OP,
        )?;
        txn.commit().map_err(|e| sql_error(OP, e))?;
        Ok((deactivated, batches))
    })();

    match outcome {
        Ok((deactivated, batches)) => {
            progress.rows_committed = slots.len();
            progress.last_committed_batch = batches.checked_sub(1);
            info!(
                target: "framestore::store",
                %id,
                retired = deactivated,
                inserted = slots.len(),
                "Frame updated"
            );
            Ok(progress)
        }
        Err(e) => {
            progress.rows_failed = slots.len();
            error!(target: "framestore::store", %id, error = %e, "Frame update failed");
            txn.rollback_quietly(OP);
            Err(with_partial(e, progress))
        }
    }
}

/// Retire `id` and everything stored below it
///
/// Returns the number of rows flagged inactive.
pub fn delete<C: RowStoreConnection + ?Sized>(
    id: &SysId,
    conn: &mut C,
    config: &StoreConfig,
    dialect: &dyn SqlDialect,
) -> StoreResult<usize> {
    const OP: &str = "delete";
    config.validate()?;
    ensure_table(conn, config, OP)?;

    let statements = Statements::new(dialect, config);
    let mut txn = ManualCommit::begin(conn, OP)?;
    let now = Utc::now();
    let outcome = (|| -> StoreResult<usize> {
        let mut targets = descendants(&mut *txn, &statements, id, OP)?;
        if select_slot(&mut *txn, &statements, id, OP)?.is_some() {
            targets.push(*id);
        }
        if targets.is_empty() {
            return Ok(0);
        }
        let flagged = deactivate(&mut *txn, &statements, &targets, config, now, OP)?;
        txn.commit().map_err(|e| sql_error(OP, e))?;
        Ok(flagged)
    })();

    match outcome {
        Ok(flagged) => {
            info!(target: "framestore::store", %id, rows = flagged, "Frame deleted");
            Ok(flagged)
        }
        Err(e) => {
            error!(target: "framestore::store", %id, error = %e, "Frame delete failed");
            txn.rollback_quietly(OP);
            Err(e)
        }
    }
}

/// Flatten a frame into slots, pre-order
///
/// Each field gets a fresh id from `ids`. Top-level fields take `parent` as
/// their parent; the fields of a nested frame and the elements of an array
/// take the id of the slot that holds them. Sequences count from 0 under
/// each parent.
///
/// Frames nested deeper than the registry's `max_nesting_depth` are
/// rejected with [`StoreError::InvalidSlot`], since `read` could not rebuild
/// them.
pub fn get_slots(
    frame: &Frame,
    parent: SysId,
    ids: &dyn IdGenerator,
) -> StoreResult<Vec<FieldSlot>> {
    let mut slots = Vec::with_capacity(frame.len());
    let entries: Vec<Entry<'_>> = frame.iter().map(Entry::from_field).collect();
    flatten(&entries, parent, ids, 0, &mut slots)?;
    Ok(slots)
}

/// A field or array element awaiting flattening
struct Entry<'a> {
    name: Option<&'a str>,
    type_code: TypeCode,
    value: &'a Value,
}

impl<'a> Entry<'a> {
    fn from_field(field: &'a Field) -> Self {
        Self {
            name: field.name(),
            type_code: field.type_code(),
            value: field.value(),
        }
    }

    fn from_element(value: &'a Value) -> Self {
        Self {
            name: None,
            type_code: value.type_code(),
            value,
        }
    }
}

fn flatten(
    entries: &[Entry<'_>],
    parent: SysId,
    ids: &dyn IdGenerator,
    depth: usize,
    out: &mut Vec<FieldSlot>,
) -> StoreResult<()> {
    check_depth(depth)?;
    for (index, entry) in entries.iter().enumerate() {
        let sequence = i32::try_from(index).map_err(|_| {
            StoreError::InvalidSlot(format!("more than {} fields under {}", i32::MAX, parent))
        })?;
        let sys_id = ids.generate();
        let slot = FieldSlot::new(
            sys_id,
            parent,
            sequence,
            entry.name.map(str::to_string),
            entry.type_code,
            entry.value.to_text(),
        );
        slot.validate()?;
        out.push(slot);

        match entry.value {
            Value::Frame(nested) => {
                let children: Vec<Entry<'_>> = nested.iter().map(Entry::from_field).collect();
                flatten(&children, sys_id, ids, depth + 1, out)?;
            }
            Value::Array(items) => {
                let children: Vec<Entry<'_>> = items.iter().map(Entry::from_element).collect();
                flatten(&children, sys_id, ids, depth + 1, out)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Rebuild fields from sibling slots, recursing into composites
fn assemble<C: RowStoreConnection + ?Sized>(
    conn: &mut C,
    statements: &Statements,
    slots: Vec<FieldSlot>,
    depth: usize,
) -> StoreResult<Frame> {
    check_depth(depth)?;
    let mut frame = Frame::with_capacity(slots.len());
    for slot in slots {
        let value = match slot.type_code {
            TypeCode::Frame => {
                let children = select_children(conn, statements, &slot.sys_id, "read")?;
                Value::Frame(assemble(conn, statements, children, depth + 1)?)
            }
            TypeCode::Array => {
                let children = select_children(conn, statements, &slot.sys_id, "read")?;
                let elements = assemble(conn, statements, children, depth + 1)?;
                Value::Array(elements.into_iter().map(Field::into_value).collect())
            }
            TypeCode::String if slot.value.is_none() => Value::String(String::new()),
            TypeCode::Udef => Value::Null,
            code => {
                let text = slot.value.as_deref().ok_or_else(|| {
                    StoreError::InvalidSlot(format!("{} slot {} has no value", code, slot.sys_id))
                })?;
                registry().parse_text(code, Some(text))?
            }
        };
        frame.add_field(Field::with_type(slot.name, slot.type_code, value)?);
    }
    frame.clear_modified();
    Ok(frame)
}

/// Slots under `depth` composite ancestors, counted as the wire codec does
fn check_depth(depth: usize) -> StoreResult<()> {
    let max_depth = registry().limits().max_nesting_depth;
    if depth > max_depth {
        return Err(StoreError::InvalidSlot(format!(
            "slots nest deeper than {} levels",
            max_depth
        )));
    }
    Ok(())
}

/// Every active slot transitively below `id`, parents before children
fn descendants<C: RowStoreConnection + ?Sized>(
    conn: &mut C,
    statements: &Statements,
    id: &SysId,
    operation: &'static str,
) -> StoreResult<Vec<SysId>> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut pending = vec![*id];
    while let Some(parent) = pending.pop() {
        for slot in select_children(conn, statements, &parent, operation)? {
            if !seen.insert(slot.sys_id) {
                continue;
            }
            found.push(slot.sys_id);
            if slot.is_composite() {
                pending.push(slot.sys_id);
            }
        }
    }
    Ok(found)
}

#[allow(clippy::too_many_arguments)]
fn insert_slots<C: RowStoreConnection + ?Sized>(
    conn: &mut C,
    sql: &str,
    slots: &[FieldSlot],
    config: &StoreConfig,
    now: DateTime<Utc>,
    commit_each_batch: bool,
    progress: &mut PersistResult,
    operation: &'static str,
) -> StoreResult<usize> {
    let mut batches = 0;
    for (index, chunk) in slots.chunks(config.batch_size).enumerate() {
        let rows: Vec<Vec<SqlValue>> = chunk
            .iter()
            .map(|slot| slot.to_params(&config.entity, now))
            .collect();
        conn.execute_batch(sql, &rows)
            .map_err(|e| sql_error(operation, e))?;
        if commit_each_batch {
            conn.commit().map_err(|e| sql_error(operation, e))?;
            progress.rows_committed += chunk.len();
            progress.last_committed_batch = Some(index);
        }
        debug!(
            target: "framestore::store",
            batch = index,
            rows = chunk.len(),
            committed = commit_each_batch,
            "Batch executed"
        );
        batches += 1;
    }
    Ok(batches)
}

fn deactivate<C: RowStoreConnection + ?Sized>(
    conn: &mut C,
    statements: &Statements,
    targets: &[SysId],
    config: &StoreConfig,
    now: DateTime<Utc>,
    operation: &'static str,
) -> StoreResult<usize> {
    let mut flagged = 0;
    for chunk in targets.chunks(config.batch_size) {
        let rows: Vec<Vec<SqlValue>> = chunk
            .iter()
            .map(|id| {
                vec![
                    SqlValue::Bool(false),
                    SqlValue::from(config.entity.as_str()),
                    SqlValue::Timestamp(now),
                    SqlValue::Text(id.to_string()),
                ]
            })
            .collect();
        let counts = conn
            .execute_batch(&statements.deactivate, &rows)
            .map_err(|e| sql_error(operation, e))?;
        flagged += counts.iter().sum::<usize>();
    }
    Ok(flagged)
}

fn select_children<C: RowStoreConnection + ?Sized>(
    conn: &mut C,
    statements: &Statements,
    parent: &SysId,
    operation: &'static str,
) -> StoreResult<Vec<FieldSlot>> {
    let rows = conn
        .query(&statements.children, &active_key(parent))
        .map_err(|e| sql_error(operation, e))?;
    let mut slots = rows
        .iter()
        .map(FieldSlot::from_row)
        .collect::<StoreResult<Vec<_>>>()?;
    slots.sort_by_key(|slot| slot.sequence);
    Ok(slots)
}

fn select_slot<C: RowStoreConnection + ?Sized>(
    conn: &mut C,
    statements: &Statements,
    id: &SysId,
    operation: &'static str,
) -> StoreResult<Option<FieldSlot>> {
    let rows = conn
        .query(&statements.slot, &active_key(id))
        .map_err(|e| sql_error(operation, e))?;
    rows.first().map(FieldSlot::from_row).transpose()
}

fn active_key(id: &SysId) -> [SqlValue; 2] {
    [SqlValue::Text(id.to_string()), SqlValue::Bool(true)]
}

fn ensure_table<C: RowStoreConnection + ?Sized>(
    conn: &mut C,
    config: &StoreConfig,
    operation: &'static str,
) -> StoreResult<()> {
    let schema = config.schema.as_deref();
    match conn.table_exists(schema, &config.table) {
        Ok(true) => Ok(()),
        Ok(false) => Err(StoreError::TableNotFound {
            schema: config.schema.clone(),
            table: config.table.clone(),
        }),
        Err(e) => Err(sql_error(operation, e)),
    }
}

fn sql_error(operation: &'static str, err: SqlError) -> StoreError {
    StoreError::persistence(operation, &err, None)
}

fn with_partial(err: StoreError, progress: PersistResult) -> StoreError {
    match err {
        StoreError::Persistence {
            operation, detail, ..
        } => StoreError::Persistence {
            operation,
            detail,
            partial: Some(progress),
        },
        other => other,
    }
}

/// SQL text for one operation against the configured table
struct Statements {
    insert: String,
    children: String,
    slot: String,
    deactivate: String,
}

impl Statements {
    fn new(dialect: &dyn SqlDialect, config: &StoreConfig) -> Self {
        let schema = config.schema.as_deref();
        let table = config.table.as_str();
        Self {
            insert: dialect.insert_slot(schema, table),
            children: dialect.select_children(schema, table),
            slot: dialect.select_slot(schema, table),
            deactivate: dialect.deactivate_slot(schema, table),
        }
    }
}

/// Auto-commit off for the guard's lifetime
///
/// The previous mode is restored on drop, on every exit path.
struct ManualCommit<'c, C: RowStoreConnection + ?Sized> {
    conn: &'c mut C,
    restore: bool,
}

impl<'c, C: RowStoreConnection + ?Sized> ManualCommit<'c, C> {
    fn begin(conn: &'c mut C, operation: &'static str) -> StoreResult<Self> {
        let restore = conn.auto_commit();
        if restore {
            conn.set_auto_commit(false)
                .map_err(|e| sql_error(operation, e))?;
        }
        Ok(Self { conn, restore })
    }

    /// Roll back, logging instead of raising a failure
    fn rollback_quietly(&mut self, operation: &'static str) {
        match self.conn.rollback() {
            Ok(()) => debug!(target: "framestore::store", operation, "Rolled back"),
            Err(e) => warn!(
                target: "framestore::store",
                operation,
                error = %e,
                "Rollback failed"
            ),
        }
    }
}

impl<C: RowStoreConnection + ?Sized> Deref for ManualCommit<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.conn
    }
}

impl<C: RowStoreConnection + ?Sized> DerefMut for ManualCommit<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.conn
    }
}

impl<C: RowStoreConnection + ?Sized> Drop for ManualCommit<'_, C> {
    fn drop(&mut self) {
        if self.restore {
            if let Err(e) = self.conn.set_auto_commit(true) {
                warn!(target: "framestore::store", error = %e, "Failed to restore auto-commit");
            }
        }
    }
}
