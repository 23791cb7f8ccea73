// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Orchestration of loads, edits, saves and exports over the active session.

use std::path::{Path, PathBuf};

use log::{info, warn};
use sqlgrid_cache::{
    ArtifactStore, CacheWriter, DEFAULT_DISPLAY_NAME, PendingArtifact, SqliteArtifactStore,
};
use sqlgrid_db::{Cell, Grid};
use sqlgrid_export::ExportFormat;

use crate::config::Config;
use crate::error::{IoContext, Result};
use crate::holder::SessionHolder;

/// Result of [`Workbench::edit_cell`].
#[derive(Debug)]
pub enum EditOutcome {
    /// The edit was applied; the grid shows the new state.
    Applied(Grid),
    /// The engine rejected the edit. `grid` is freshly reloaded so stale values
    /// shown to the user can be discarded.
    Reverted { error: sqlgrid_db::Error, grid: Grid },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub display_name: String,
    pub size: usize,
    pub tables: usize,
    pub dirty: bool,
}

pub struct Workbench {
    config: Config,
    holder: SessionHolder,
    cache: Option<CacheWriter>,
}

impl Workbench {
    /// A workbench without a durable cache.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            holder: SessionHolder::new(),
            cache: None,
        }
    }

    /// Open the cache configured in `config` and resume the session stored in it.
    ///
    /// Must be called from within a tokio runtime. A cache that cannot be opened or
    /// read is logged and skipped.
    pub fn start(config: Config) -> Self {
        if !config.enable_cache {
            return Self::new(config);
        }
        let store = match SqliteArtifactStore::open(&config.cache_dir) {
            Ok(store) => store,
            Err(e) => {
                warn!("Session cache unavailable, continuing without it: {e}");
                return Self::new(config);
            }
        };
        let cached = store.get().unwrap_or_else(|e| {
            warn!("Failed to read session cache: {e}");
            None
        });

        let mut workbench = Self {
            config,
            holder: SessionHolder::new(),
            cache: Some(CacheWriter::spawn(store)),
        };
        if let Some(artifact) = cached {
            workbench.restore(&artifact);
        }
        workbench
    }

    /// Make a cached artifact the active session. Returns whether it loaded.
    pub fn restore(&mut self, artifact: &PendingArtifact) -> bool {
        match self
            .holder
            .replace(&artifact.bytes, artifact.display_name.as_str())
        {
            Ok(()) => {
                info!("Restored '{}' from cache", artifact.display_name);
                true
            }
            Err(e) => {
                warn!(
                    "Ignoring cached database '{}': {e}",
                    artifact.display_name
                );
                false
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn holder(&self) -> &SessionHolder {
        &self.holder
    }

    /// Load a database file, replacing the active session. Returns its tables.
    pub async fn open_file(&mut self, path: &Path) -> Result<Vec<String>> {
        let bytes = tokio::fs::read(path)
            .await
            .io_context(|| format!("Failed to read {}", path.display()))?;
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
        self.open_bytes(bytes, display_name).await
    }

    /// Load an in-memory database image, replacing the active session.
    pub async fn open_bytes(
        &mut self,
        bytes: Vec<u8>,
        display_name: impl Into<String>,
    ) -> Result<Vec<String>> {
        let display_name = display_name.into();
        self.holder.replace(&bytes, display_name.as_str())?;
        info!("Opened '{display_name}' ({} bytes)", bytes.len());

        let tables = self.tables()?;
        self.persist(bytes).await;
        Ok(tables)
    }

    pub fn tables(&self) -> Result<Vec<String>> {
        Ok(self.holder.session()?.list_tables()?)
    }

    /// Load `table` for display.
    pub fn show_table(&self, table: &str) -> Result<Grid> {
        let grid = self
            .holder
            .session()?
            .load_grid(table, self.config.scan_order())?;
        if !grid.table.has_primary_key() {
            warn!("Table '{table}' has no single-column primary key; editing is disabled");
        }
        Ok(grid)
    }

    /// Set `column` of the row whose primary key reads `key` to `new_value`.
    ///
    /// Requests that can never succeed (no primary key, editing the key column,
    /// unknown or generated columns) fail before any SQL runs. Engine rejections
    /// come back as [`EditOutcome::Reverted`]. After a successful edit the cache
    /// holds the new state before this returns.
    pub async fn edit_cell(
        &mut self,
        table: &str,
        column: &str,
        key: &str,
        new_value: Cell,
    ) -> Result<EditOutcome> {
        let order = self.config.scan_order();
        let session = self.holder.session_mut()?;
        let grid = session.load_grid(table, order)?;
        let edit = grid
            .table
            .cell_edit(column, new_value, key_cell(&grid, key))?;

        if let Err(error) = session.apply_edit(&edit) {
            if !error.is_edit_failure() {
                return Err(error.into());
            }
            warn!("Edit of {table}.{column} failed, reverting: {error}");
            let grid = session.load_grid(table, order)?;
            return Ok(EditOutcome::Reverted { error, grid });
        }

        let grid = session.load_grid(table, order)?;
        let bytes = session.export()?;
        let size = bytes.len();
        self.persist(bytes).await;
        self.holder.mark_dirty(size);
        Ok(EditOutcome::Applied(grid))
    }

    /// Write the database snapshot and refresh the cache with it.
    pub async fn save(&mut self, output: Option<&Path>) -> Result<PathBuf> {
        let artifact = sqlgrid_export::export_snapshot(self.holder.session()?)?;
        let path = self.output_path(output, &self.config.snapshot_file_name);
        write_artifact(&path, &artifact.bytes).await?;
        let size = artifact.bytes.len();
        self.persist(artifact.bytes).await;
        self.holder.mark_clean(size);
        Ok(path)
    }

    pub async fn export_table(
        &self,
        table: &str,
        format: ExportFormat,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let artifact = sqlgrid_export::export_table(
            self.holder.session()?,
            table,
            format,
            self.config.scan_order(),
        )?;
        let path = self.output_path(output, &artifact.file_name);
        write_artifact(&path, &artifact.bytes).await?;
        Ok(path)
    }

    /// Write every table as CSV into one ZIP archive.
    pub async fn export_all(&self, output: Option<&Path>) -> Result<PathBuf> {
        let artifact =
            sqlgrid_export::export_all(self.holder.session()?, self.config.scan_order())?;
        let path = self.output_path(output, &self.config.archive_file_name);
        write_artifact(&path, &artifact.bytes).await?;
        Ok(path)
    }

    pub fn status(&self) -> Result<Status> {
        let tables = self.tables()?.len();
        Ok(Status {
            display_name: self
                .holder
                .display_name()
                .unwrap_or(DEFAULT_DISPLAY_NAME)
                .to_owned(),
            size: self.holder.size().unwrap_or(0),
            tables,
            dirty: self.holder.is_dirty(),
        })
    }

    /// Wait for pending cache writes and stop the writer.
    pub async fn shutdown(self) {
        let Some(cache) = self.cache else {
            return;
        };
        if let Err(e) = cache.shutdown().await {
            warn!("Failed to shut down session cache: {e}");
        }
    }

    fn output_path(&self, output: Option<&Path>, file_name: &str) -> PathBuf {
        output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.output_dir.join(file_name))
    }

    /// Submit `bytes` as the cached session and wait for the write to settle.
    ///
    /// Cache failures are logged, never returned.
    async fn persist(&self, bytes: Vec<u8>) {
        let Some(cache) = &self.cache else {
            return;
        };
        let display_name = self.holder.display_name().unwrap_or(DEFAULT_DISPLAY_NAME);
        cache.submit(PendingArtifact::new(bytes, display_name));
        if let Err(e) = cache.flush().await {
            warn!("Session cache write did not complete: {e}");
        }
    }
}

/// The typed primary-key value whose text form is `key`.
///
/// Falls back to `key` as text when no row matches, which then updates nothing.
fn key_cell(grid: &Grid, key: &str) -> Cell {
    (0..grid.rows.len())
        .filter_map(|row| grid.primary_key_value(row))
        .find(|value| value.export_text() == key)
        .cloned()
        .unwrap_or_else(|| Cell::from(key))
}

async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .io_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .io_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
