//! Slot table layout
//!
//! Every stored field is one row of an eleven-column table. The layout is
//! fixed; only the schema and table names vary.

use crate::connection::RowStoreConnection;
use crate::dialect::SqlDialect;
use crate::error::SqlError;
use serde::Serialize;

/// Column names, in table order
pub mod columns {
    /// Primary key
    pub const SYS_ID: &str = "SysId";
    /// Soft-delete flag
    pub const ACTIVE: &str = "Active";
    /// Enclosing slot, or the frame's root id
    pub const PARENT: &str = "Parent";
    /// Position among siblings
    pub const SEQUENCE: &str = "Sequence";
    /// Field name, NULL when anonymous
    pub const NAME: &str = "Name";
    /// Scalar text form, NULL for null and composite fields
    pub const VALUE: &str = "Value";
    /// Type code
    pub const TYPE: &str = "Type";
    /// Audit: creating entity
    pub const CREATED_BY: &str = "CreatedBy";
    /// Audit: creation time
    pub const CREATED_ON: &str = "CreatedOn";
    /// Audit: last modifying entity
    pub const MODIFIED_BY: &str = "ModifiedBy";
    /// Audit: last modification time
    pub const MODIFIED_ON: &str = "ModifiedOn";
}

/// Width of the `Name` column
pub const NAME_WIDTH: u32 = 64;

/// Width of the `Value` column
pub const VALUE_WIDTH: u32 = 4096;

/// Width of id and audit-entity columns
pub const ID_WIDTH: u32 = 36;

/// Portable column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    /// VARCHAR(n)
    Varchar(u32),
    /// BOOLEAN
    Boolean,
    /// INT
    Int,
    /// SMALLINT
    SmallInt,
    /// DATE (stored with time of day)
    Date,
}

/// One column of the slot table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: &'static str,
    /// Column type
    pub column_type: ColumnType,
    /// Whether NULL is allowed
    pub nullable: bool,
    /// Whether this is the primary key
    pub primary_key: bool,
}

impl ColumnDefinition {
    const fn new(name: &'static str, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name,
            column_type,
            nullable,
            primary_key: false,
        }
    }

    const fn key(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: false,
            primary_key: true,
        }
    }
}

const SLOT_COLUMNS: [ColumnDefinition; 11] = [
    ColumnDefinition::key(columns::SYS_ID, ColumnType::Varchar(ID_WIDTH)),
    ColumnDefinition::new(columns::ACTIVE, ColumnType::Boolean, false),
    ColumnDefinition::new(columns::PARENT, ColumnType::Varchar(ID_WIDTH), true),
    ColumnDefinition::new(columns::SEQUENCE, ColumnType::Int, true),
    ColumnDefinition::new(columns::NAME, ColumnType::Varchar(NAME_WIDTH), true),
    ColumnDefinition::new(columns::VALUE, ColumnType::Varchar(VALUE_WIDTH), true),
    ColumnDefinition::new(columns::TYPE, ColumnType::SmallInt, true),
    ColumnDefinition::new(columns::CREATED_BY, ColumnType::Varchar(ID_WIDTH), false),
    ColumnDefinition::new(columns::CREATED_ON, ColumnType::Date, false),
    ColumnDefinition::new(columns::MODIFIED_BY, ColumnType::Varchar(ID_WIDTH), false),
    ColumnDefinition::new(columns::MODIFIED_ON, ColumnType::Date, false),
];

/// Slot table definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinition {
    /// Schema, `None` for the connection default
    pub schema: Option<String>,
    /// Table name
    pub name: String,
    /// Columns, in table order
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// Column named `name`, ignoring ASCII case
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Column names, in table order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

/// The slot table layout under the given schema and table name
pub fn table_schema(schema: Option<&str>, table: &str) -> TableDefinition {
    TableDefinition {
        schema: schema.map(str::to_string),
        name: table.to_string(),
        columns: SLOT_COLUMNS.to_vec(),
    }
}

/// Create the slot table if it does not already exist
///
/// Returns `true` when the table was created. The store never calls this;
/// provisioning the table is left to the application.
pub fn create_table<C: RowStoreConnection + ?Sized>(
    conn: &mut C,
    dialect: &dyn SqlDialect,
    schema: Option<&str>,
    table: &str,
) -> Result<bool, SqlError> {
    if conn.table_exists(schema, table)? {
        return Ok(false);
    }
    let definition = table_schema(schema, table);
    conn.execute(&dialect.create_table(&definition), &[])?;
    if !conn.auto_commit() {
        conn.commit()?;
    }
    Ok(true)
}
