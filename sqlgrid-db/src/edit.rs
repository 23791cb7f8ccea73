// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Single-cell edits keyed by a primary key.

use rusqlite::named_params;
use tracing::debug;

use crate::connection::Session;
use crate::error::{Error, Result};
use crate::schema::quote_identifier;
use crate::types::{Cell, TableDescriptor};

/// One cell mutation: set `column` to `new_value` on the row where
/// `pk_column = pk_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub table: String,
    pub column: String,
    pub new_value: Cell,
    pub pk_column: String,
    pub pk_value: Cell,
}

impl CellEdit {
    /// Build an edit, checking the preconditions that do not need the schema.
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        new_value: Cell,
        pk_column: impl Into<String>,
        pk_value: Cell,
    ) -> Result<Self> {
        let edit = Self {
            table: table.into(),
            column: column.into(),
            new_value,
            pk_column: pk_column.into(),
            pk_value,
        };
        if edit.pk_column.is_empty() {
            return Err(Error::MissingPrimaryKey(edit.table));
        }
        if edit.column == edit.pk_column {
            return Err(Error::PrimaryKeyNotEditable {
                table: edit.table,
                column: edit.column,
            });
        }
        if edit.new_value.is_binary() || edit.pk_value.is_binary() {
            return Err(Error::BinaryEditValue);
        }
        Ok(edit)
    }

    fn update_sql(&self) -> String {
        format!(
            "UPDATE {} SET {} = :value WHERE {} = :id",
            quote_identifier(&self.table),
            quote_identifier(&self.column),
            quote_identifier(&self.pk_column)
        )
    }
}

impl TableDescriptor {
    /// Build an edit of `column` on the row identified by `pk_value`.
    ///
    /// Rejects tables without a single-column primary key, the key column itself,
    /// unknown and generated columns, all before any SQL is constructed.
    pub fn cell_edit(&self, column: &str, new_value: Cell, pk_value: Cell) -> Result<CellEdit> {
        let pk_column = self
            .primary_key
            .as_deref()
            .ok_or_else(|| Error::MissingPrimaryKey(self.name.clone()))?;
        let descriptor = self.column(column).ok_or_else(|| Error::UnknownColumn {
            table: self.name.clone(),
            column: column.to_owned(),
        })?;
        if descriptor.generated {
            return Err(Error::GeneratedColumn {
                table: self.name.clone(),
                column: column.to_owned(),
            });
        }
        CellEdit::new(&self.name, column, new_value, pk_column, pk_value)
    }
}

impl Session {
    /// Apply one cell edit.
    ///
    /// Values are bound, identifiers quoted. The update runs in a transaction and is
    /// rolled back unless it changed exactly one row.
    pub fn apply_edit(&mut self, edit: &CellEdit) -> Result<()> {
        let edit_error = |source: rusqlite::Error| Error::Edit {
            table: edit.table.clone(),
            column: edit.column.clone(),
            source,
        };

        let tx = self.conn.transaction().map_err(edit_error)?;
        let affected = {
            let mut stmt = tx.prepare(&edit.update_sql()).map_err(edit_error)?;
            stmt.execute(named_params! {
                ":value": &edit.new_value,
                ":id": &edit.pk_value,
            })
            .map_err(edit_error)?
        };

        if affected != 1 {
            // Dropping `tx` rolls back.
            return Err(Error::UnexpectedRowCount {
                table: edit.table.clone(),
                affected,
            });
        }
        tx.commit().map_err(edit_error)?;

        debug!(
            "Updated {}.{} where {} = {}",
            edit.table, edit.column, edit.pk_column, edit.pk_value
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preconditions() {
        assert!(matches!(
            CellEdit::new("t", "name", Cell::from("x"), "", Cell::from(1_i64)),
            Err(Error::MissingPrimaryKey(_))
        ));
        assert!(matches!(
            CellEdit::new("t", "id", Cell::from("x"), "id", Cell::from(1_i64)),
            Err(Error::PrimaryKeyNotEditable { .. })
        ));
        assert!(matches!(
            CellEdit::new("t", "name", Cell::Binary(vec![0]), "id", Cell::from(1_i64)),
            Err(Error::BinaryEditValue)
        ));
    }

    #[test]
    fn test_update_sql_quotes_identifiers() {
        let edit = CellEdit::new("my table", "na\"me", Cell::Null, "id", Cell::from(1_i64))
            .unwrap();
        assert_eq!(
            edit.update_sql(),
            r#"UPDATE "my table" SET "na""me" = :value WHERE "id" = :id"#
        );
    }

    #[test]
    fn test_value_is_bound_not_interpolated() {
        let mut session = Session::from_sql(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob');",
        )
        .unwrap();
        let table = session.describe("users").unwrap();
        let hostile = "x' WHERE 1=1; DROP TABLE users; --";
        let edit = table
            .cell_edit("name", Cell::from(hostile), Cell::from(1_i64))
            .unwrap();
        session.apply_edit(&edit).unwrap();

        let grid = session.load_grid("users", crate::ScanOrder::PrimaryKey).unwrap();
        assert_eq!(grid.rows[0][1], Cell::from(hostile));
        assert_eq!(grid.rows[1][1], Cell::from("Bob"));
    }

    #[test]
    fn test_constraint_violation_is_edit_failure() {
        let mut session = Session::from_sql(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO users VALUES (1, 'Alice');",
        )
        .unwrap();
        let table = session.describe("users").unwrap();
        let edit = table.cell_edit("name", Cell::Null, Cell::from(1_i64)).unwrap();
        let err = session.apply_edit(&edit).unwrap_err();
        assert!(err.is_edit_failure(), "unexpected error: {err}");

        let grid = session.load_grid("users", crate::ScanOrder::Natural).unwrap();
        assert_eq!(grid.rows[0][1], Cell::from("Alice"));
    }
}
