// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Error types for the durable cache.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open cache at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The background writer is gone, so pending writes can no longer settle
    #[error("Cache writer stopped")]
    WriterStopped,

    #[error("Cache writer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
