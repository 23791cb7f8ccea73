// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! The single-slot artifact store.

use std::path::Path;

use log::debug;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Error, Result};

/// File name of the cache database inside the cache directory.
pub const CACHE_FILE_NAME: &str = "sqlgrid-cache.sqlite";

/// Name used when an artifact was stored without one.
pub const DEFAULT_DISPLAY_NAME: &str = "database.db";

const ARTIFACT_KEY: &str = "last_artifact";
const DISPLAY_NAME_KEY: &str = "last_display_name";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    key   TEXT PRIMARY KEY NOT NULL,
    value BLOB
);
"#;

/// The cached record: a database image and the name it was loaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArtifact {
    pub bytes: Vec<u8>,
    pub display_name: String,
}

impl PendingArtifact {
    pub fn new(bytes: Vec<u8>, display_name: impl Into<String>) -> Self {
        Self {
            bytes,
            display_name: display_name.into(),
        }
    }
}

/// Durable storage for at most one [`PendingArtifact`].
///
/// `put` replaces whatever was stored before.
pub trait ArtifactStore: Send + 'static {
    fn get(&self) -> Result<Option<PendingArtifact>>;

    fn put(&mut self, artifact: &PendingArtifact) -> Result<()>;
}

/// [`ArtifactStore`] backed by a small SQLite key-value table.
pub struct SqliteArtifactStore {
    conn: Connection,
}

impl SqliteArtifactStore {
    /// Open (or create) the store in `cache_dir`.
    pub fn open(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir).map_err(|source| Error::CreateDir {
            path: cache_dir.to_owned(),
            source,
        })?;
        let path = cache_dir.join(CACHE_FILE_NAME);
        let conn = Connection::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        debug!("Opened artifact cache at {}", path.display());
        Ok(Self { conn })
    }

    /// Create a store that lives only as long as this value.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    fn value<T: rusqlite::types::FromSql>(&self, key: &str) -> Result<Option<T>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl ArtifactStore for SqliteArtifactStore {
    fn get(&self) -> Result<Option<PendingArtifact>> {
        let Some(bytes) = self.value::<Vec<u8>>(ARTIFACT_KEY)? else {
            return Ok(None);
        };
        let display_name = self
            .value::<String>(DISPLAY_NAME_KEY)?
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_owned());
        Ok(Some(PendingArtifact {
            bytes,
            display_name,
        }))
    }

    fn put(&mut self, artifact: &PendingArtifact) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO entries (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            stmt.execute(params![ARTIFACT_KEY, artifact.bytes])?;
            stmt.execute(params![DISPLAY_NAME_KEY, artifact.display_name])?;
        }
        tx.commit()?;
        debug!(
            "Cached '{}' ({} bytes)",
            artifact.display_name,
            artifact.bytes.len()
        );
        Ok(())
    }
}
