// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Smoke tests for sqlgrid-db.
//!
//! These tests load database images the way a user upload would: a fixture is
//! built in-process, exported to bytes, and reopened with `Session::open`.

use sqlgrid_db::{Cell, Error, ScanOrder, Session};

fn load(script: &str) -> Session {
    let bytes = Session::from_sql(script).unwrap().export().unwrap();
    Session::open(&bytes).unwrap()
}

fn users() -> Session {
    load(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
         INSERT INTO users VALUES (1, 'Alice');",
    )
}

/// Edit a non-key cell and read it back.
#[test]
fn test_edit_roundtrip() {
    let mut session = users();
    let table = session.describe("users").unwrap();
    assert_eq!(table.primary_key.as_deref(), Some("id"));

    let edit = table
        .cell_edit("name", Cell::from("Alicia"), Cell::from(1_i64))
        .unwrap();
    session.apply_edit(&edit).unwrap();

    let grid = session.load_grid("users", ScanOrder::Natural).unwrap();
    assert_eq!(grid.rows, vec![vec![Cell::from(1_i64), Cell::from("Alicia")]]);
}

/// A key value that matches nothing is an error and changes nothing.
#[test]
fn test_edit_missing_row_leaves_table_unchanged() {
    let mut session = users();
    let before = session.load_grid("users", ScanOrder::Natural).unwrap();
    let edit = before
        .table
        .cell_edit("name", Cell::from("Ghost"), Cell::from(42_i64))
        .unwrap();

    let err = session.apply_edit(&edit).unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedRowCount { affected: 0, .. }
    ));
    assert_eq!(session.load_grid("users", ScanOrder::Natural).unwrap(), before);
}

/// Text keys typed by a user still match integer primary keys.
#[test]
fn test_text_key_matches_integer_column() {
    let mut session = users();
    let table = session.describe("users").unwrap();
    let edit = table
        .cell_edit("name", Cell::from("Al"), Cell::from("1"))
        .unwrap();
    session.apply_edit(&edit).unwrap();
    let grid = session.load_grid("users", ScanOrder::Natural).unwrap();
    assert_eq!(grid.cell(0, "name"), Some(&Cell::from("Al")));
}

/// Tables without a primary key offer no editable cells and reject edits up front.
#[test]
fn test_no_primary_key_rejects_edit() {
    let session = load(
        "CREATE TABLE log (ts TEXT, message TEXT);
         INSERT INTO log VALUES ('2024-01-01', 'boot');",
    );
    let grid = session.load_grid("log", ScanOrder::Natural).unwrap();
    assert!(grid.table.primary_key.is_none());
    assert!(grid.table.column_names().all(|c| !grid.is_editable(c)));

    let err = grid
        .table
        .cell_edit("message", Cell::from("x"), Cell::from("2024-01-01"))
        .unwrap_err();
    assert!(matches!(err, Error::MissingPrimaryKey(table) if table == "log"));
}

/// Non-database bytes fail without disturbing an existing session.
#[test]
fn test_invalid_bytes_keep_previous_session() {
    let session = users();
    let err = Session::open(b"definitely not a database, just some text").unwrap_err();
    assert!(err.is_invalid_format());
    assert_eq!(session.list_tables().unwrap(), vec!["users".to_string()]);
}

/// Export then reload reproduces tables, columns and rows.
#[test]
fn test_snapshot_roundtrip() {
    let mut session = load(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, avatar BLOB);
         CREATE TABLE tags (label TEXT, weight REAL);
         INSERT INTO users VALUES (1, 'Alice', x'89504E470D0A1A0A'), (2, NULL, NULL);
         INSERT INTO tags VALUES ('a,b', 0.5), ('say \"hi\"', NULL);",
    );
    let table = session.describe("users").unwrap();
    session
        .apply_edit(
            &table
                .cell_edit("name", Cell::from("Bob"), Cell::from(2_i64))
                .unwrap(),
        )
        .unwrap();

    let reloaded = Session::open(&session.export().unwrap()).unwrap();
    assert_eq!(reloaded.list_tables().unwrap(), session.list_tables().unwrap());
    for name in session.list_tables().unwrap() {
        assert_eq!(
            reloaded.load_grid(&name, ScanOrder::Natural).unwrap(),
            session.load_grid(&name, ScanOrder::Natural).unwrap()
        );
    }
    let users = reloaded.load_grid("users", ScanOrder::PrimaryKey).unwrap();
    assert_eq!(users.cell(1, "name"), Some(&Cell::from("Bob")));
    assert!(users.cell(0, "avatar").unwrap().is_binary());
}

/// TEXT holding invalid UTF-8 is read back unaltered, as binary.
#[test]
fn test_invalid_utf8_text_is_not_rewritten() {
    let session = load(
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);
         INSERT INTO notes VALUES (1, CAST(x'61FF62' AS TEXT)), (2, 'plain');",
    );
    let grid = session.load_grid("notes", ScanOrder::PrimaryKey).unwrap();
    assert_eq!(grid.cell(0, "body"), Some(&Cell::Binary(vec![0x61, 0xff, 0x62])));
    assert_eq!(grid.cell(1, "body"), Some(&Cell::from("plain")));
}
