// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT


use std::path::Path;

use sqlgrid_db::Session;

use crate::config::Config;

/// Config with every directory inside `root`.
pub(crate) fn test_config(root: &Path) -> Config {
    Config {
        cache_dir: root.join("cache"),
        output_dir: root.join("out"),
        ..Config::default()
    }
}

/// Image of a small database with one keyed and one unkeyed table.
pub(crate) fn fixture_bytes() -> Vec<u8> {
    Session::from_sql(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
         INSERT INTO users VALUES (1, 'Alice');
         INSERT INTO users VALUES (2, 'Bob');
         CREATE TABLE log (message TEXT);
         INSERT INTO log VALUES ('started');",
    )
    .unwrap()
    .export()
    .unwrap()
}
