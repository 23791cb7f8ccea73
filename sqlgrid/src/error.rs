// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SqlgridError>;

#[derive(Error, Debug)]
pub enum SqlgridError {
    #[error("Database error: {0}")]
    Db(#[from] sqlgrid_db::Error),

    #[error("Export error: {0}")]
    Export(#[from] sqlgrid_export::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] sqlgrid_cache::Error),

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Nothing was opened and nothing could be restored from the cache
    #[error("No database loaded; run `sqlgrid open <FILE>` first")]
    NoSession,
}

impl SqlgridError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}

/// Helper trait for adding context to IO errors
pub trait IoContext<T> {
    fn io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| SqlgridError::io(f(), e))
    }
}
