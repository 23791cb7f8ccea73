// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Single-sheet XLSX encoding.

use rust_xlsxwriter::Workbook;
use sqlgrid_db::{BLOB_MARKER, Cell, Number, Row};

use crate::error::{Error, Result};

/// Excel's limit on worksheet name length, in characters.
const MAX_SHEET_NAME_CHARS: usize = 31;
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;
/// Largest magnitude an `f64` holds for every integer up to it.
const MAX_EXACT_INTEGER: i64 = 1 << 53;

/// Make a table name acceptable as a worksheet name.
///
/// Characters Excel forbids (`[]:*?/\`) become `_`, leading/trailing apostrophes are
/// dropped and the result is cut to 31 characters.
pub fn sheet_name(table: &str) -> String {
    let cleaned: String = table
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let trimmed: String = cleaned
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    // Truncation can expose a trailing apostrophe again.
    let trimmed = trimmed.trim_end_matches('\'');
    if trimmed.is_empty() {
        "Sheet1".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Encode `rows` as a workbook with one sheet named after `table`.
///
/// Row 0 holds the column names; each following row maps cells to their column.
/// Nulls stay blank, numbers are written as numbers, binary cells as a marker.
/// Integers an `f64` cannot hold exactly are written as text.
pub fn encode_xlsx(table: &str, columns: &[&str], rows: &[Row]) -> Result<Vec<u8>> {
    if rows.len() + 1 > MAX_ROWS || columns.len() > MAX_COLUMNS {
        return Err(Error::SheetTooLarge {
            table: table.to_owned(),
            rows: rows.len(),
            columns: columns.len(),
        });
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(table))?;

    // Bounds were checked above, so the narrowing casts cannot truncate.
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let row_num = (index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Null => {}
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col, text)?;
                }
                Cell::Number(Number::Integer(i))
                    if i.unsigned_abs() > MAX_EXACT_INTEGER as u64 =>
                {
                    worksheet.write_string(row_num, col, i.to_string())?;
                }
                Cell::Number(number) => {
                    worksheet.write_number(row_num, col, number.as_f64())?;
                }
                Cell::Binary(_) => {
                    worksheet.write_string(row_num, col, BLOB_MARKER)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("users", "users")]
    #[case::forbidden("a/b[c]:d*e?f\\g", "a_b_c__d_e_f_g")]
    #[case::apostrophes("'quoted'", "quoted")]
    #[case::long(
        "a_table_name_that_is_far_too_long_for_excel",
        "a_table_name_that_is_far_too_lo"
    )]
    #[case::only_apostrophes("''", "Sheet1")]
    fn test_sheet_name(#[case] table: &str, #[case] expected: &str) {
        assert_eq!(sheet_name(table), expected);
    }

    fn zip_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_workbook_has_single_named_sheet() {
        let rows = vec![
            vec![Cell::from(1_i64), Cell::from("Alicia")],
            vec![Cell::from(2_i64), Cell::Null],
        ];
        let bytes = encode_xlsx("users", &["id", "name"], &rows).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let workbook = zip_entry(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="users""#));
        assert_eq!(workbook.matches("<sheet ").count(), 1);

        let strings = zip_entry(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("Alicia"));
        assert!(strings.contains("name"));
    }

    #[test]
    fn test_large_integers_keep_every_digit() {
        let rows = vec![
            vec![Cell::from(9_007_199_254_740_993_i64)],
            vec![Cell::from(i64::MIN)],
            vec![Cell::from(9_007_199_254_740_992_i64)],
        ];
        let bytes = encode_xlsx("ids", &["id"], &rows).unwrap();

        let strings = zip_entry(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("9007199254740993"));
        assert!(strings.contains(&i64::MIN.to_string()));
        assert!(!strings.contains("9007199254740992"));

        let sheet = zip_entry(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<v>9007199254740992</v>"));
    }
}
