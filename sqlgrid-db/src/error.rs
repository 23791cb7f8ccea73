// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Error types for engine operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, inspecting or editing a database.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem error on the session working copy
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Path that SQLite cannot be handed as a string
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    /// Input bytes are not a loadable database image
    #[error("Not a SQLite database: {reason}")]
    InvalidFormat { reason: String },

    /// Table is not present in the catalog
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Introspection or scan query failed
    #[error("Failed to read table '{table}': {source}")]
    Schema {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Table has no single-column primary key
    #[error("Table '{0}' has no single-column primary key, editing is disabled")]
    MissingPrimaryKey(String),

    /// Attempt to edit the key column itself
    #[error("Column '{column}' is the primary key of '{table}' and cannot be edited")]
    PrimaryKeyNotEditable { table: String, column: String },

    /// Column is not part of the table
    #[error("Column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Generated columns are computed by the engine
    #[error("Column '{column}' of table '{table}' is generated and cannot be edited")]
    GeneratedColumn { table: String, column: String },

    /// Binary cells are display-only
    #[error("Binary values cannot be written through a cell edit")]
    BinaryEditValue,

    /// The update statement failed
    #[error("Failed to update '{table}'.'{column}': {source}")]
    Edit {
        table: String,
        column: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The update did not match exactly one row
    #[error("Update of '{table}' matched {affected} rows, expected exactly 1")]
    UnexpectedRowCount { table: String, affected: usize },

    /// Named parameter missing from a prepared statement
    #[error("Unknown statement parameter: {0}")]
    UnknownParameter(String),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn invalid_format(reason: impl ToString) -> Self {
        Self::InvalidFormat {
            reason: reason.to_string(),
        }
    }

    /// Whether this error rejected a load because the bytes are not a database.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. })
    }

    /// Whether this error was raised while running an update against the engine,
    /// as opposed to being rejected before any SQL was built.
    pub fn is_edit_failure(&self) -> bool {
        matches!(self, Self::Edit { .. } | Self::UnexpectedRowCount { .. })
    }
}
