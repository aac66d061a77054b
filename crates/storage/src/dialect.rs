//! SQL text generation
//!
//! The store issues five statements: insert a slot, select the active
//! children of a parent, select one active slot, soft-delete a slot, and
//! (writer side only) create the table. Dialects differ in identifier
//! quoting, schema qualification and column type names.

use crate::schema::{columns, ColumnDefinition, ColumnType, TableDefinition};

/// Statement builder for one database product
pub trait SqlDialect: Send + Sync {
    /// Dialect name, for logs
    fn name(&self) -> &'static str;

    /// Quote an identifier
    fn quote(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Schema-qualified, quoted table name
    fn qualified_table(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quote(schema), self.quote(table)),
            None => self.quote(table),
        }
    }

    /// Type name for a column
    fn column_type(&self, column_type: ColumnType) -> String {
        match column_type {
            ColumnType::Varchar(n) => format!("VARCHAR({})", n),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Int => "INT".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::Date => "DATE".to_string(),
        }
    }

    /// INSERT of one slot row; parameters follow table column order
    fn insert_slot(&self, schema: Option<&str>, table: &str) -> String {
        let names = SLOT_ORDER
            .iter()
            .map(|c| self.quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let marks = vec!["?"; SLOT_ORDER.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.qualified_table(schema, table),
            names,
            marks
        )
    }

    /// SELECT of the children of a parent; parameters: `Parent`, `Active`
    fn select_children(&self, schema: Option<&str>, table: &str) -> String {
        format!(
            "SELECT * FROM {} WHERE {} = ? AND {} = ? ORDER BY {} ASC",
            self.qualified_table(schema, table),
            self.quote(columns::PARENT),
            self.quote(columns::ACTIVE),
            self.quote(columns::SEQUENCE)
        )
    }

    /// SELECT of one slot; parameters: `SysId`, `Active`
    fn select_slot(&self, schema: Option<&str>, table: &str) -> String {
        format!(
            "SELECT * FROM {} WHERE {} = ? AND {} = ?",
            self.qualified_table(schema, table),
            self.quote(columns::SYS_ID),
            self.quote(columns::ACTIVE)
        )
    }

    /// Soft-delete UPDATE; parameters: `Active`, `ModifiedBy`, `ModifiedOn`, `SysId`
    fn deactivate_slot(&self, schema: Option<&str>, table: &str) -> String {
        format!(
            "UPDATE {} SET {} = ?, {} = ?, {} = ? WHERE {} = ?",
            self.qualified_table(schema, table),
            self.quote(columns::ACTIVE),
            self.quote(columns::MODIFIED_BY),
            self.quote(columns::MODIFIED_ON),
            self.quote(columns::SYS_ID)
        )
    }

    /// CREATE TABLE for a table definition
    fn create_table(&self, definition: &TableDefinition) -> String {
        let body = definition
            .columns
            .iter()
            .map(|c| self.column_clause(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE {} ({})",
            self.qualified_table(definition.schema.as_deref(), &definition.name),
            body
        )
    }

    /// One column clause of a CREATE TABLE
    fn column_clause(&self, column: &ColumnDefinition) -> String {
        let mut clause = format!(
            "{} {}",
            self.quote(column.name),
            self.column_type(column.column_type)
        );
        if column.primary_key {
            clause.push_str(" PRIMARY KEY");
        } else if !column.nullable {
            clause.push_str(" NOT NULL");
        }
        clause
    }
}

const SLOT_ORDER: [&str; 11] = [
    columns::SYS_ID,
    columns::ACTIVE,
    columns::PARENT,
    columns::SEQUENCE,
    columns::NAME,
    columns::VALUE,
    columns::TYPE,
    columns::CREATED_BY,
    columns::CREATED_ON,
    columns::MODIFIED_BY,
    columns::MODIFIED_ON,
];

/// ANSI SQL with double-quoted identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl SqlDialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }
}

/// SQLite
///
/// SQLite has a single schema per attached database, so schema names other
/// than `main` and `temp` are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn qualified_table(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(s) if s.eq_ignore_ascii_case("main") || s.eq_ignore_ascii_case("temp") => {
                format!("{}.{}", self.quote(s), self.quote(table))
            }
            _ => self.quote(table),
        }
    }

    fn column_type(&self, column_type: ColumnType) -> String {
        match column_type {
            // RFC 3339 text
            ColumnType::Date => "TEXT".to_string(),
            ColumnType::Varchar(n) => format!("VARCHAR({})", n),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Int => "INTEGER".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
        }
    }
}

/// Pick a dialect from a connection's product name
pub fn resolve_dialect(product_name: &str) -> Box<dyn SqlDialect> {
    if product_name.to_ascii_lowercase().contains("sqlite") {
        Box::new(SqliteDialect)
    } else {
        Box::new(AnsiDialect)
    }
}
