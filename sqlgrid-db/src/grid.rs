// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Full-table scans into typed rows.

use crate::connection::Session;
use crate::error::{Error, Result};
use crate::schema::quote_identifier;
use crate::types::{Cell, Row, TableDescriptor};

/// Row order of a table scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanOrder {
    /// Whatever order the engine returns; not guaranteed stable
    #[default]
    Natural,
    /// Ordered by the primary key when the table has one, natural otherwise
    PrimaryKey,
}

pub(crate) fn read_row(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Row> {
    (0..width)
        .map(|i| row.get_ref(i).map(Cell::from_value_ref))
        .collect()
}

/// Select statement listing the descriptor's columns so rows align with it.
pub(crate) fn select_sql(table: &TableDescriptor, order: ScanOrder) -> String {
    let columns = table
        .column_names()
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("SELECT {columns} FROM {}", quote_identifier(&table.name));
    if let (ScanOrder::PrimaryKey, Some(pk)) = (order, &table.primary_key) {
        sql.push_str(" ORDER BY ");
        sql.push_str(&quote_identifier(pk));
    }
    sql
}

/// A prepared full-table scan. Each call to [`TableScan::rows`] starts a fresh scan.
pub struct TableScan<'s> {
    table: String,
    stmt: rusqlite::Statement<'s>,
    width: usize,
}

impl TableScan<'_> {
    /// Lazily yield the table's rows.
    pub fn rows(&mut self) -> Result<impl Iterator<Item = Result<Row>> + '_> {
        let width = self.width;
        let table = &self.table;
        let rows = self
            .stmt
            .query_map([], move |row| read_row(row, width))
            .map_err(|source| Error::Schema {
                table: table.clone(),
                source,
            })?;
        Ok(rows.map(move |row| {
            row.map_err(|source| Error::Schema {
                table: table.clone(),
                source,
            })
        }))
    }
}

/// A table's descriptor together with one complete scan of its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub table: TableDescriptor,
    pub rows: Vec<Row>,
}

impl Grid {
    pub fn is_editable(&self, column: &str) -> bool {
        self.table.is_editable(column)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.table.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Primary-key value identifying `row`, `None` for tables without a key.
    pub fn primary_key_value(&self, row: usize) -> Option<&Cell> {
        self.cell(row, self.table.primary_key.as_deref()?)
    }

    /// Index of the row whose primary key equals `key`.
    pub fn find_row(&self, key: &Cell) -> Option<usize> {
        (0..self.rows.len()).find(|&row| self.primary_key_value(row) == Some(key))
    }
}

impl Session {
    /// Prepare a full scan of `table`.
    pub fn scan(&self, table: &TableDescriptor, order: ScanOrder) -> Result<TableScan<'_>> {
        let stmt = self
            .conn
            .prepare(&select_sql(table, order))
            .map_err(|source| Error::Schema {
                table: table.name.clone(),
                source,
            })?;
        Ok(TableScan {
            table: table.name.clone(),
            stmt,
            width: table.columns.len(),
        })
    }

    /// Describe `table` and collect one scan of it.
    pub fn load_grid(&self, table: &str, order: ScanOrder) -> Result<Grid> {
        let descriptor = self.describe(table)?;
        let rows = self
            .scan(&descriptor, order)?
            .rows()?
            .collect::<Result<Vec<_>>>()?;
        Ok(Grid {
            table: descriptor,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Number;

    fn fixture() -> Session {
        Session::from_sql(
            "CREATE TABLE mixed (id INTEGER PRIMARY KEY, label TEXT, score REAL, data BLOB, note);
             INSERT INTO mixed VALUES (2, 'b', 1.5, x'0102', NULL);
             INSERT INTO mixed VALUES (1, 'a', NULL, NULL, 7);",
        )
        .unwrap()
    }

    #[test]
    fn test_select_sql() {
        let session = fixture();
        let table = session.describe("mixed").unwrap();
        assert_eq!(
            select_sql(&table, ScanOrder::Natural),
            r#"SELECT "id", "label", "score", "data", "note" FROM "mixed""#
        );
        assert!(select_sql(&table, ScanOrder::PrimaryKey).ends_with(r#" ORDER BY "id""#));
    }

    #[test]
    fn test_values_are_classified() {
        let session = fixture();
        let grid = session.load_grid("mixed", ScanOrder::PrimaryKey).unwrap();
        assert_eq!(
            grid.rows[0],
            vec![
                Cell::Number(Number::Integer(1)),
                Cell::Text("a".into()),
                Cell::Null,
                Cell::Null,
                Cell::Number(Number::Integer(7)),
            ]
        );
        assert_eq!(grid.rows[1][2], Cell::Number(Number::Real(1.5)));
        assert_eq!(grid.rows[1][3], Cell::Binary(vec![1, 2]));
    }

    #[test]
    fn test_scan_is_restartable() {
        let session = fixture();
        let table = session.describe("mixed").unwrap();
        let mut scan = session.scan(&table, ScanOrder::Natural).unwrap();
        let first: Vec<Row> = scan.rows().unwrap().collect::<Result<_>>().unwrap();
        let second: Vec<Row> = scan.rows().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_find_row_by_key() {
        let session = fixture();
        let grid = session.load_grid("mixed", ScanOrder::PrimaryKey).unwrap();
        assert_eq!(grid.find_row(&Cell::from(2_i64)), Some(1));
        assert_eq!(grid.cell(1, "label"), Some(&Cell::from("b")));
        assert_eq!(grid.find_row(&Cell::from(9_i64)), None);
    }
}
