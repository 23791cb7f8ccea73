// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Command-line data grid for SQLite databases.
//!
//! A [`workbench::Workbench`] owns the active session, resumes it from the durable
//! cache on startup and writes it back after every load, edit and save.

pub mod config;
pub mod error;
pub mod holder;
pub mod workbench;

#[cfg(test)]
mod tests;
