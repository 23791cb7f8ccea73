// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Exports of sqlgrid tables: CSV, XLSX, a ZIP of every table as CSV, and the raw
//! database snapshot.
//!
//! Encoders read through [`TableSource`], which only borrows the session, so no
//! export can change the data it is exporting.

mod archive;
mod csv_file;
mod error;
mod source;
mod xlsx;

use std::collections::HashSet;

use log::warn;
use sqlgrid_db::{Row, ScanOrder, Session, TableDescriptor};

pub use archive::encode_zip;
pub use csv_file::encode_csv;
pub use error::{Error, Result};
pub use source::TableSource;
pub use xlsx::{encode_xlsx, sheet_name};

/// Suggested file name of the raw database snapshot.
pub const SNAPSHOT_FILE_NAME: &str = "database_modifiee.db";
/// Suggested file name of the all-tables archive.
pub const ARCHIVE_FILE_NAME: &str = "database_export.zip";

pub const SNAPSHOT_MIME: &str = "application/octet-stream";
pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const ZIP_MIME: &str = "application/zip";

/// Single-table export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Xlsx => XLSX_MIME,
        }
    }
}

/// An encoded export, ready to be written or offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `<table>.<extension>`, with path separators replaced so the name stays a single
/// path component.
pub fn table_file_name(table: &str, extension: &str) -> String {
    let stem: String = table
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{stem}.{extension}")
}

fn read_table<S: TableSource + ?Sized>(
    source: &S,
    table: &str,
    order: ScanOrder,
) -> Result<(TableDescriptor, Vec<Row>)> {
    let source_error = |source| Error::Source {
        table: table.to_owned(),
        source,
    };
    let descriptor = source.describe(table).map_err(source_error)?;
    let rows = source.rows(&descriptor, order).map_err(source_error)?;
    Ok((descriptor, rows))
}

fn table_csv<S: TableSource + ?Sized>(source: &S, table: &str, order: ScanOrder) -> Result<Vec<u8>> {
    let (descriptor, rows) = read_table(source, table, order)?;
    encode_csv(descriptor.column_names(), &rows)
}

/// Export one table. Any failure is returned to the caller.
pub fn export_table<S: TableSource + ?Sized>(
    source: &S,
    table: &str,
    format: ExportFormat,
    order: ScanOrder,
) -> Result<Artifact> {
    let bytes = match format {
        ExportFormat::Csv => table_csv(source, table, order)?,
        ExportFormat::Xlsx => {
            let (descriptor, rows) = read_table(source, table, order)?;
            let columns: Vec<&str> = descriptor.column_names().collect();
            encode_xlsx(table, &columns, &rows)?
        }
    };
    Ok(Artifact {
        file_name: table_file_name(table, format.extension()),
        mime_type: format.mime_type(),
        bytes,
    })
}

/// Export every user table as `<table>.csv` inside one ZIP archive.
///
/// Tables that fail to export are skipped with a warning and the archive is built
/// from the rest. Failing to list the tables at all is an error. Tables whose file
/// names collide get a ` (2)`, ` (3)`, ... suffix in listing order.
pub fn export_all<S: TableSource + ?Sized>(source: &S, order: ScanOrder) -> Result<Artifact> {
    let tables = source.list_tables()?;
    let mut entries = Vec::with_capacity(tables.len());
    let mut used = HashSet::new();

    for table in &tables {
        match table_csv(source, table, order) {
            Ok(bytes) => {
                let name = unique_entry_name(&mut used, table);
                entries.push((name, bytes));
            }
            Err(e) => warn!("Skipping table '{table}' in archive export: {e}"),
        }
    }

    Ok(Artifact {
        file_name: ARCHIVE_FILE_NAME.to_owned(),
        mime_type: ZIP_MIME,
        bytes: encode_zip(&entries)?,
    })
}

fn unique_entry_name(used: &mut HashSet<String>, table: &str) -> String {
    let mut name = table_file_name(table, "csv");
    let mut n = 2;
    while !used.insert(name.clone()) {
        name = table_file_name(&format!("{table} ({n})"), "csv");
        n += 1;
    }
    name
}

/// The raw binary snapshot of the whole database.
pub fn export_snapshot(session: &Session) -> Result<Artifact> {
    Ok(Artifact {
        file_name: SNAPSHOT_FILE_NAME.to_owned(),
        mime_type: SNAPSHOT_MIME,
        bytes: session.export()?,
    })
}
