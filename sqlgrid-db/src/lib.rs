// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! SQLite engine layer for sqlgrid.
//!
//! This crate loads a raw database image into a private working copy and exposes
//! the operations the grid editor needs on top of it: schema inspection, full-table
//! scans into typed rows, and single-cell edits keyed by a primary key.
//!
//! **Architecture**: this is the Engine Layer. Encoders live in `sqlgrid-export`, the
//! durable cache in `sqlgrid-cache`, and the orchestration in `sqlgrid`.
//!
//! # Key Features
//!
//! - Byte-buffer loading with header validation (`Session::open`)
//! - Binary snapshots of the current state (`Session::export`)
//! - Table/column introspection with single-column primary-key detection
//! - Restartable table scans yielding tagged [`Cell`] values
//! - Transactional cell edits that must hit exactly one row
//!
//! # Example
//!
//! ```ignore
//! use sqlgrid_db::{Cell, ScanOrder, Session};
//!
//! let mut session = Session::open(&std::fs::read("app.db")?)?;
//! let users = session.describe("users")?;
//! let edit = users.cell_edit("name", Cell::from("Alicia"), Cell::from(1_i64))?;
//! session.apply_edit(&edit)?;
//! let grid = session.load_grid("users", ScanOrder::Natural)?;
//! ```

mod connection;
mod edit;
mod error;
mod grid;
mod schema;
mod statement;
mod types;

pub use connection::Session;
pub use edit::CellEdit;
pub use error::{Error, Result};
pub use grid::{Grid, ScanOrder, TableScan};
pub use schema::quote_identifier;
pub use statement::{Cursor, Statement};
pub use types::*;
