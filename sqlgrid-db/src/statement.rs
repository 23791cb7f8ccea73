// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Prepared statements with named binding and row stepping.
//!
//! Dropping a [`Statement`] releases it; a [`Cursor`] borrows its statement, so a
//! statement cannot be released while rows are still being stepped and every early
//! return disposes both.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::grid::read_row;
use crate::types::{Cell, Row};

/// A prepared statement on a [`crate::Session`].
pub struct Statement<'s> {
    inner: rusqlite::Statement<'s>,
}

impl<'s> Statement<'s> {
    pub(crate) fn new(inner: rusqlite::Statement<'s>) -> Self {
        Self { inner }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.inner
            .column_names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Bind named parameters, e.g. `[(":id", &Cell::from(1_i64))]`.
    pub fn bind(&mut self, params: &[(&str, &Cell)]) -> Result<()> {
        for (name, value) in params {
            let index = self
                .inner
                .parameter_index(name)?
                .ok_or_else(|| Error::UnknownParameter((*name).to_owned()))?;
            self.inner.raw_bind_parameter(index, *value)?;
        }
        Ok(())
    }

    /// Run a statement that returns no rows, returning the number of changed rows.
    pub fn execute(&mut self) -> Result<usize> {
        Ok(self.inner.raw_execute()?)
    }

    /// Start stepping through the result rows with the current bindings.
    pub fn cursor(&mut self) -> Cursor<'_> {
        let columns = self.column_names();
        Cursor {
            columns,
            rows: self.inner.raw_query(),
            current: None,
        }
    }
}

/// Row-by-row access to a statement's results.
pub struct Cursor<'stmt> {
    columns: Vec<String>,
    rows: rusqlite::Rows<'stmt>,
    current: Option<Row>,
}

impl Cursor<'_> {
    /// Advance one row. Returns `false` once the results are exhausted.
    pub fn step(&mut self) -> Result<bool> {
        let width = self.columns.len();
        self.current = match self.rows.next()? {
            Some(row) => Some(read_row(row, width)?),
            None => None,
        };
        Ok(self.current.is_some())
    }

    /// Values of the current row, in column order.
    pub fn values(&self) -> Option<&[Cell]> {
        self.current.as_deref()
    }

    /// The current row keyed by column name.
    pub fn row(&self) -> Option<BTreeMap<String, Cell>> {
        self.current.as_ref().map(|values| {
            self.columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Cell, Error, Session};

    #[test]
    fn test_bind_and_step() {
        let session = Session::from_sql(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob');",
        )
        .unwrap();

        let mut stmt = session
            .prepare("SELECT id, name FROM users WHERE id = :id")
            .unwrap();
        stmt.bind(&[(":id", &Cell::from(2_i64))]).unwrap();

        let mut cursor = stmt.cursor();
        assert!(cursor.step().unwrap());
        let row = cursor.row().unwrap();
        assert_eq!(row["name"], Cell::from("Bob"));
        assert_eq!(cursor.values().unwrap()[0], Cell::from(2_i64));
        assert!(!cursor.step().unwrap());
        assert!(cursor.row().is_none());
    }

    #[test]
    fn test_unknown_parameter() {
        let session = Session::from_sql("CREATE TABLE t (v TEXT);").unwrap();
        let mut stmt = session.prepare("SELECT v FROM t WHERE v = :v").unwrap();
        let err = stmt.bind(&[(":missing", &Cell::Null)]).unwrap_err();
        assert!(matches!(err, Error::UnknownParameter(name) if name == ":missing"));
    }

    #[test]
    fn test_execute_reports_changes() {
        let session = Session::from_sql(
            "CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1), (2), (3);",
        )
        .unwrap();
        let mut stmt = session.prepare("DELETE FROM t WHERE v >= :min").unwrap();
        stmt.bind(&[(":min", &Cell::from(2_i64))]).unwrap();
        assert_eq!(stmt.execute().unwrap(), 2);
    }
}
