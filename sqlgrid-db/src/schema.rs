// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Schema inspection: user tables, columns and primary-key detection.

use rusqlite::params;
use tracing::debug;

use crate::connection::Session;
use crate::error::{Error, Result};
use crate::types::{ColumnDescriptor, TableDescriptor};

/// User tables in catalog order. `sqlite_` is matched literally, not as a wildcard.
const LIST_TABLES_SQL: &str = r#"
SELECT name FROM sqlite_master
WHERE type = 'table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
"#;

/// `hidden`: 0 normal, 1 hidden virtual-table column, 2/3 generated column.
const TABLE_COLUMNS_SQL: &str = r#"
SELECT name, type, pk, hidden FROM pragma_table_xinfo(?1)
"#;

/// Quote an identifier for interpolation into SQL.
///
/// Table and column names cannot be bound as parameters, so they are wrapped in
/// double quotes with embedded quotes doubled.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

struct RawColumn {
    name: String,
    decl_type: Option<String>,
    pk: i64,
    hidden: i64,
}

impl Session {
    /// List user tables, excluding the engine's internal `sqlite_*` tables.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(LIST_TABLES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Describe a table's columns and its single-column primary key.
    ///
    /// Tables without a primary key, or with a composite one, come back with
    /// `primary_key: None`; callers are expected to warn that editing is disabled.
    pub fn describe(&self, table: &str) -> Result<TableDescriptor> {
        let raw = self
            .raw_columns(table)
            .map_err(|source| Error::Schema {
                table: table.to_owned(),
                source,
            })?;
        if raw.is_empty() {
            return Err(Error::TableNotFound(table.to_owned()));
        }

        let key_columns: Vec<&str> = raw
            .iter()
            .filter(|c| c.pk > 0)
            .map(|c| c.name.as_str())
            .collect();
        let primary_key = match key_columns.as_slice() {
            [single] => Some((*single).to_owned()),
            [] => None,
            composite => {
                debug!(
                    "Table '{table}' has a composite primary key ({}), treating as none",
                    composite.join(", ")
                );
                None
            }
        };

        let columns = raw
            .into_iter()
            .filter(|c| c.hidden != 1)
            .map(|c| ColumnDescriptor {
                is_primary_key: primary_key.as_deref() == Some(c.name.as_str()),
                generated: c.hidden >= 2,
                decl_type: c.decl_type.unwrap_or_default(),
                name: c.name,
            })
            .collect();

        Ok(TableDescriptor {
            name: table.to_owned(),
            columns,
            primary_key,
        })
    }

    fn raw_columns(&self, table: &str) -> rusqlite::Result<Vec<RawColumn>> {
        let mut stmt = self.conn.prepare_cached(TABLE_COLUMNS_SQL)?;
        let columns = stmt
            .query_map(params![table], |row| {
                Ok(RawColumn {
                    name: row.get(0)?,
                    decl_type: row.get(1)?,
                    pk: row.get(2)?,
                    hidden: row.get(3)?,
                })
            })?
            .collect();
        columns
    }
}
