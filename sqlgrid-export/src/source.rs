// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Read-only view of a database used by the encoders.

use sqlgrid_db::{Row, ScanOrder, Session, TableDescriptor};

/// Everything an export needs from the engine.
///
/// Every method takes `&self`: exporting never mutates the session.
pub trait TableSource {
    fn list_tables(&self) -> sqlgrid_db::Result<Vec<String>>;

    fn describe(&self, table: &str) -> sqlgrid_db::Result<TableDescriptor>;

    fn rows(&self, table: &TableDescriptor, order: ScanOrder) -> sqlgrid_db::Result<Vec<Row>>;
}

impl TableSource for Session {
    fn list_tables(&self) -> sqlgrid_db::Result<Vec<String>> {
        Session::list_tables(self)
    }

    fn describe(&self, table: &str) -> sqlgrid_db::Result<TableDescriptor> {
        Session::describe(self, table)
    }

    fn rows(&self, table: &TableDescriptor, order: ScanOrder) -> sqlgrid_db::Result<Vec<Row>> {
        let mut scan = self.scan(table, order)?;
        let rows = scan.rows()?.collect::<sqlgrid_db::Result<Vec<Row>>>()?;
        Ok(rows)
    }
}
