// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Grid value and schema types.

use std::fmt;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use tracing::debug;

/// Numeric payload of a cell, keeping SQLite's integer/real storage classes apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Real(r) => r,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Real(r) => write!(f, "{r}"),
        }
    }
}

/// A single grid value, classified once when the row is read.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Number(Number),
    /// Display-only; never written back through an edit
    Binary(Vec<u8>),
}

/// Marker written for binary cells in text exports.
pub const BLOB_MARKER: &str = "[BLOB]";

impl Cell {
    /// TEXT that is not valid UTF-8 is kept byte for byte as [`Cell::Binary`].
    pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Number(Number::Integer(i)),
            ValueRef::Real(r) => Cell::Number(Number::Real(r)),
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(text) => Cell::Text(text.to_owned()),
                Err(e) => {
                    debug!("TEXT value is not valid UTF-8 ({e}), reading it as binary");
                    Cell::Binary(t.to_vec())
                }
            },
            ValueRef::Blob(b) => Cell::Binary(b.to_vec()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Cell::Binary(_))
    }

    /// Kind of binary payload, `None` for non-binary cells.
    pub fn blob_kind(&self) -> Option<BlobKind> {
        match self {
            Cell::Binary(bytes) => Some(BlobKind::sniff(bytes)),
            _ => None,
        }
    }

    /// Text form used by exports: null is empty, binary is [`BLOB_MARKER`].
    pub fn export_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(t) => t.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Binary(_) => BLOB_MARKER.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Text(t) => f.write_str(t),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Binary(bytes) => match BlobKind::sniff(bytes).mime_type() {
                Some(mime) => write!(f, "[{mime}, {} bytes]", bytes.len()),
                None => f.write_str(BLOB_MARKER),
            },
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(Number::Integer(value))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(Number::Real(value))
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Cell::Null => ValueRef::Null,
            Cell::Text(t) => ValueRef::Text(t.as_bytes()),
            Cell::Number(Number::Integer(i)) => ValueRef::Integer(*i),
            Cell::Number(Number::Real(r)) => ValueRef::Real(*r),
            Cell::Binary(b) => ValueRef::Blob(b),
        }))
    }
}

/// Image formats recognized in binary cells so consumers can render them inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Png,
    Jpeg,
    Gif,
    Webp,
    Unknown,
}

impl BlobKind {
    /// Classify a blob by its magic bytes.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            BlobKind::Png
        } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            BlobKind::Jpeg
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            BlobKind::Gif
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            BlobKind::Webp
        } else {
            BlobKind::Unknown
        }
    }

    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            BlobKind::Png => Some("image/png"),
            BlobKind::Jpeg => Some("image/jpeg"),
            BlobKind::Gif => Some("image/gif"),
            BlobKind::Webp => Some("image/webp"),
            BlobKind::Unknown => None,
        }
    }
}

/// One table row, positionally aligned with [`TableDescriptor::columns`].
pub type Row = Vec<Cell>;

/// Rows produced by one statement of [`crate::Session::exec`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Column metadata from introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared SQL type, empty when the column has none
    pub decl_type: String,
    /// True only for the recognized single-column primary key
    pub is_primary_key: bool,
    /// Generated columns are readable but never editable
    pub generated: bool,
}

/// Table metadata from introspection.
///
/// Recomputed on every table selection; never cached across edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    /// Name of the single-column primary key, `None` when absent or composite
    pub primary_key: Option<String>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_primary_key(&self) -> bool {
        self.primary_key.is_some()
    }

    /// Whether cells of `column` may be offered for editing.
    pub fn is_editable(&self, column: &str) -> bool {
        self.has_primary_key()
            && self
                .column(column)
                .is_some_and(|c| !c.is_primary_key && !c.generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, is_primary_key: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.into(),
            decl_type: String::new(),
            is_primary_key,
            generated: false,
        }
    }

    #[test]
    fn test_editable_requires_primary_key() {
        let mut table = TableDescriptor {
            name: "users".into(),
            columns: vec![column("id", true), column("name", false)],
            primary_key: Some("id".into()),
        };
        assert!(table.is_editable("name"));
        assert!(!table.is_editable("id"));
        assert!(!table.is_editable("missing"));

        table.primary_key = None;
        table.columns[0].is_primary_key = false;
        assert!(!table.is_editable("name"));
    }

    #[test]
    fn test_generated_column_not_editable() {
        let mut total = column("total", false);
        total.generated = true;
        let table = TableDescriptor {
            name: "orders".into(),
            columns: vec![column("id", true), total],
            primary_key: Some("id".into()),
        };
        assert!(!table.is_editable("total"));
    }

    #[test]
    fn test_export_text() {
        assert_eq!(Cell::Null.export_text(), "");
        assert_eq!(Cell::from(42_i64).export_text(), "42");
        assert_eq!(Cell::from(2.5).export_text(), "2.5");
        assert_eq!(Cell::from(3.0).export_text(), "3");
        assert_eq!(Cell::Binary(vec![1, 2]).export_text(), BLOB_MARKER);
    }

    #[test]
    fn test_blob_sniffing() {
        assert_eq!(BlobKind::sniff(b"\x89PNG\r\n\x1a\nrest"), BlobKind::Png);
        assert_eq!(BlobKind::sniff(&[0xff, 0xd8, 0xff, 0xe0]), BlobKind::Jpeg);
        assert_eq!(BlobKind::sniff(b"GIF89a..."), BlobKind::Gif);
        assert_eq!(BlobKind::sniff(b"RIFF\0\0\0\0WEBPVP8 "), BlobKind::Webp);
        assert_eq!(BlobKind::sniff(b"\0\x01"), BlobKind::Unknown);
        assert_eq!(Cell::Binary(b"\0".to_vec()).to_string(), BLOB_MARKER);
        assert_eq!(Cell::from("x").blob_kind(), None);
    }

    #[test]
    fn test_invalid_utf8_text_reads_as_binary() {
        let bytes = [b'a', 0xff, b'b'];
        assert_eq!(
            Cell::from_value_ref(ValueRef::Text(&bytes)),
            Cell::Binary(bytes.to_vec())
        );
        assert_eq!(
            Cell::from_value_ref(ValueRef::Text("héllo".as_bytes())),
            Cell::from("héllo")
        );
    }
}
