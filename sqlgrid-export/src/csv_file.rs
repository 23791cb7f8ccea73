// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! CSV encoding.
//!
//! Header row first, one `\n`-terminated line per row. Fields are quoted only when
//! they contain the delimiter, a quote or a line break; embedded quotes are doubled.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use sqlgrid_db::{Cell, Row};

use crate::error::{Error, Result};

pub fn encode_csv<'a>(columns: impl IntoIterator<Item = &'a str>, rows: &[Row]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row.iter().map(Cell::export_text))?;
    }
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn encode_one(value: Cell) -> String {
        let bytes = encode_csv(["a", "b"], &[vec![value, Cell::Null]]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let line = text.strip_prefix("a,b\n").unwrap();
        line.strip_suffix(",\n").unwrap().to_owned()
    }

    #[rstest]
    #[case::plain(Cell::from("Alicia"), "Alicia")]
    #[case::comma(Cell::from("a,b"), "\"a,b\"")]
    #[case::quote(Cell::from("say \"hi\""), "\"say \"\"hi\"\"\"")]
    #[case::comma_and_quote(Cell::from("a,\"b\""), "\"a,\"\"b\"\"\"")]
    #[case::newline(Cell::from("line1\nline2"), "\"line1\nline2\"")]
    #[case::spaces(Cell::from(" padded "), " padded ")]
    #[case::null(Cell::Null, "")]
    #[case::integer(Cell::from(7_i64), "7")]
    #[case::real(Cell::from(0.25), "0.25")]
    fn test_field_encoding(#[case] value: Cell, #[case] expected: &str) {
        assert_eq!(encode_one(value), expected);
    }

    #[test]
    fn test_header_then_rows() {
        let rows = vec![vec![Cell::from(1_i64), Cell::from("Alicia")]];
        let bytes = encode_csv(["id", "name"], &rows).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "id,name\n1,Alicia\n");
    }

    #[test]
    fn test_empty_table_is_header_only() {
        let bytes = encode_csv(["id", "name"], &[]).unwrap();
        assert_eq!(bytes, b"id,name\n");
    }
}
