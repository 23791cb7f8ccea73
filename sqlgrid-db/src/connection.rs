// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Session lifecycle: loading database images and exporting snapshots.

use std::path::Path;

use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::{Batch, Connection, OpenFlags, params};
use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::read_row;
use crate::statement::Statement;
use crate::types::ResultSet;

/// Every SQLite database file starts with this 16-byte string.
const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Size of the fixed database file header.
const SQLITE_HEADER_LEN: usize = 100;

const WORKING_COPY_NAME: &str = "session.sqlite";
const SNAPSHOT_NAME: &str = "snapshot.sqlite";

/// One loaded database.
///
/// The session owns a private working copy of the loaded image. Dropping it closes
/// the connection and then removes the working copy.
#[derive(Debug)]
pub struct Session {
    pub(crate) conn: Connection,
    // Declared after `conn` so the directory outlives the connection on drop.
    workdir: TempDir,
}

impl Session {
    /// Load a database image.
    ///
    /// Bytes that are not a SQLite database fail with [`Error::InvalidFormat`]; no
    /// session is created in that case.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        check_header(bytes)?;

        let workdir = new_workdir()?;
        let path = workdir.path().join(WORKING_COPY_NAME);
        std::fs::write(&path, bytes)
            .map_err(|e| Error::io(format!("Failed to write working copy {}", path.display()), e))?;

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(Error::invalid_format)?;
        let session = Self { conn, workdir };
        session.probe()?;

        debug!("Opened session from {} bytes", bytes.len());
        Ok(session)
    }

    /// Create a session holding a blank database initialized by `script`.
    pub fn from_sql(script: &str) -> Result<Self> {
        let workdir = new_workdir()?;
        let path = workdir.path().join(WORKING_COPY_NAME);
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(script)?;

        debug!("Created session from SQL script");
        Ok(Self { conn, workdir })
    }

    /// Touch the catalog so unreadable images fail here instead of on first use.
    fn probe(&self) -> Result<()> {
        self.conn
            .query_row("SELECT count(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(Error::invalid_format)?;
        Ok(())
    }

    /// Run one or more SQL statements.
    ///
    /// Each statement that yields at least one row contributes a [`ResultSet`], in
    /// statement order. Statements without rows contribute nothing.
    pub fn exec(&self, sql: &str) -> Result<Vec<ResultSet>> {
        let mut batch = Batch::new(&self.conn, sql);
        let mut results = Vec::new();

        while let Some(mut stmt) = batch.next()? {
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let width = columns.len();

            let mut rows = Vec::new();
            let mut cursor = stmt.raw_query();
            while let Some(row) = cursor.next()? {
                rows.push(read_row(row, width)?);
            }

            if !rows.is_empty() {
                results.push(ResultSet { columns, rows });
            }
        }
        Ok(results)
    }

    /// Prepare a single statement for bind/step access.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        Ok(Statement::new(self.conn.prepare(sql)?))
    }

    /// Serialize the current state, including edits applied in this session.
    pub fn export(&self) -> Result<Vec<u8>> {
        let snapshot = self.workdir.path().join(SNAPSHOT_NAME);
        remove_if_exists(&snapshot)?;

        let target = snapshot
            .to_str()
            .ok_or_else(|| Error::NonUtf8Path(snapshot.clone()))?;
        self.conn.execute("VACUUM INTO ?1", params![target])?;

        let bytes = std::fs::read(&snapshot)
            .map_err(|e| Error::io(format!("Failed to read snapshot {}", snapshot.display()), e))?;
        remove_if_exists(&snapshot)?;

        debug!("Exported snapshot of {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Get raw connection (for advanced usage).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn check_header(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::invalid_format("input is empty"));
    }
    if bytes.len() < SQLITE_HEADER_LEN {
        return Err(Error::invalid_format(format!(
            "input is {} bytes, shorter than the {SQLITE_HEADER_LEN}-byte header",
            bytes.len()
        )));
    }
    if !bytes.starts_with(SQLITE_MAGIC) {
        return Err(Error::invalid_format("missing SQLite header magic"));
    }
    Ok(())
}

fn new_workdir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("sqlgrid-session-")
        .tempdir()
        .map_err(|e| Error::io("Failed to create session working directory", e))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(format!("Failed to remove {}", path.display()), e)),
    }
}
