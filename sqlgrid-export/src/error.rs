// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Error types for exports.

use thiserror::Error;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading the table from the engine failed
    #[error("Failed to read table '{table}': {source}")]
    Source {
        table: String,
        #[source]
        source: sqlgrid_db::Error,
    },

    /// Engine error outside a specific table
    #[error("Database error: {0}")]
    Db(#[from] sqlgrid_db::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Archive encoding failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Table does not fit on a single worksheet
    #[error("Table '{table}' exceeds worksheet limits ({rows} rows, {columns} columns)")]
    SheetTooLarge {
        table: String,
        rows: usize,
        columns: usize,
    },
}
