// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Durable cache of the last database sqlgrid worked on.
//!
//! The cache holds exactly one [`PendingArtifact`]: the raw bytes of the database
//! and the name it was loaded under. It is read once at startup to resume the
//! previous session and overwritten after every load, successful edit and save.
//!
//! Writes go through a [`CacheWriter`], which runs them on a background task so
//! callers never block on disk I/O. Newer submissions supersede older ones that
//! have not started yet.

mod error;
mod store;
mod writer;

pub use error::{Error, Result};
pub use store::{
    ArtifactStore, CACHE_FILE_NAME, DEFAULT_DISPLAY_NAME, PendingArtifact, SqliteArtifactStore,
};
pub use writer::CacheWriter;
