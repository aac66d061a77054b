//! Flattened field rows
//!
//! A frame is stored as a tree of slots. Each slot is one field:
//! - scalar fields carry their text form in `value`
//! - FRAME and ARRAY fields carry no value; their content is the slots whose
//!   `parent` is this slot's `sys_id`
//! - ARRAY elements are anonymous slots sequenced by element index

use crate::connection::{SqlRow, SqlValue};
use crate::error::{StoreError, StoreResult};
use crate::id::SysId;
use crate::schema::{columns, NAME_WIDTH, VALUE_WIDTH};
use chrono::{DateTime, Utc};
use framestore_core::TypeCode;

/// One stored field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    /// Slot id
    pub sys_id: SysId,
    /// Enclosing slot, or the root id for top-level fields
    pub parent: SysId,
    /// Position among siblings, from 0
    pub sequence: i32,
    /// Soft-delete flag
    pub active: bool,
    /// Field name, `None` when anonymous
    pub name: Option<String>,
    /// Declared type
    pub type_code: TypeCode,
    /// Scalar text form, `None` for null and composite fields
    pub value: Option<String>,
    /// Creating entity
    pub created_by: Option<String>,
    /// Creation time
    pub created_on: Option<DateTime<Utc>>,
    /// Last modifying entity
    pub modified_by: Option<String>,
    /// Last modification time
    pub modified_on: Option<DateTime<Utc>>,
}

impl FieldSlot {
    /// Create an active slot without audit columns
    pub fn new(
        sys_id: SysId,
        parent: SysId,
        sequence: i32,
        name: Option<String>,
        type_code: TypeCode,
        value: Option<String>,
    ) -> Self {
        Self {
            sys_id,
            parent,
            sequence,
            active: true,
            name,
            type_code,
            value,
            created_by: None,
            created_on: None,
            modified_by: None,
            modified_on: None,
        }
    }

    /// Whether the slot holds a nested frame or array
    pub fn is_composite(&self) -> bool {
        self.type_code.is_composite()
    }

    /// Check the slot fits the table's column widths
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(name) = &self.name {
            if name.chars().count() > NAME_WIDTH as usize {
                return Err(StoreError::InvalidSlot(format!(
                    "field name {:?} exceeds {} characters",
                    name, NAME_WIDTH
                )));
            }
        }
        if let Some(value) = &self.value {
            let len = value.chars().count();
            if len > VALUE_WIDTH as usize {
                return Err(StoreError::InvalidSlot(format!(
                    "{} value of field {:?} is {} characters, limit is {}",
                    self.type_code.name(),
                    self.name.as_deref().unwrap_or(""),
                    len,
                    VALUE_WIDTH
                )));
            }
        }
        Ok(())
    }

    /// Insert parameters in table column order
    ///
    /// Audit columns are stamped with `entity` and `now`.
    pub fn to_params(&self, entity: &str, now: DateTime<Utc>) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.sys_id.to_string()),
            SqlValue::Bool(self.active),
            SqlValue::Text(self.parent.to_string()),
            SqlValue::Int(self.sequence as i64),
            self.name.clone().into(),
            self.value.clone().into(),
            SqlValue::Int(self.type_code.as_byte() as i64),
            SqlValue::from(entity),
            SqlValue::Timestamp(now),
            SqlValue::from(entity),
            SqlValue::Timestamp(now),
        ]
    }

    /// Rebuild a slot from a result row
    pub fn from_row(row: &SqlRow) -> StoreResult<Self> {
        let sys_id = id_column(row, columns::SYS_ID)?;
        let parent = id_column(row, columns::PARENT)?;
        let sequence = required(row, columns::SEQUENCE)?
            .as_int()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| bad_column(columns::SEQUENCE, row))?;
        let active = required(row, columns::ACTIVE)?
            .as_bool()
            .ok_or_else(|| bad_column(columns::ACTIVE, row))?;
        let type_code = required(row, columns::TYPE)?
            .as_int()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| bad_column(columns::TYPE, row))
            .and_then(|code| TypeCode::try_from(code).map_err(StoreError::from))?;

        Ok(Self {
            sys_id,
            parent,
            sequence,
            active,
            name: text(row, columns::NAME).filter(|n| !n.is_empty()),
            type_code,
            value: text(row, columns::VALUE),
            created_by: text(row, columns::CREATED_BY),
            created_on: row.get(columns::CREATED_ON).and_then(SqlValue::as_timestamp),
            modified_by: text(row, columns::MODIFIED_BY),
            modified_on: row.get(columns::MODIFIED_ON).and_then(SqlValue::as_timestamp),
        })
    }
}

fn required<'r>(row: &'r SqlRow, column: &str) -> StoreResult<&'r SqlValue> {
    match row.get(column) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(StoreError::InvalidSlot(format!("column {} is missing", column))),
    }
}

fn id_column(row: &SqlRow, column: &str) -> StoreResult<SysId> {
    required(row, column)?
        .as_text()
        .and_then(SysId::parse)
        .ok_or_else(|| bad_column(column, row))
}

fn text(row: &SqlRow, column: &str) -> Option<String> {
    row.get(column).and_then(SqlValue::as_text).map(str::to_string)
}

fn bad_column(column: &str, row: &SqlRow) -> StoreError {
    StoreError::InvalidSlot(format!(
        "column {} holds {}",
        column,
        row.get(column).map(ToString::to_string).unwrap_or_default()
    ))
}
