// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

//! Ownership of the single active session.

use sqlgrid_db::Session;

use crate::error::{Result, SqlgridError};

struct Loaded {
    session: Session,
    display_name: String,
    size: usize,
}

/// Holds the one live [`Session`] and whether it has unsaved edits.
#[derive(Default)]
pub struct SessionHolder {
    current: Option<Loaded>,
    dirty: bool,
}

impl SessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `bytes` and make the result the active session.
    ///
    /// The previous session is dropped only once the new one opened, so invalid
    /// input leaves it untouched.
    pub fn replace(&mut self, bytes: &[u8], display_name: impl Into<String>) -> Result<()> {
        let session = Session::open(bytes)?;
        self.current = Some(Loaded {
            session,
            display_name: display_name.into(),
            size: bytes.len(),
        });
        self.dirty = false;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn session(&self) -> Result<&Session> {
        self.current
            .as_ref()
            .map(|loaded| &loaded.session)
            .ok_or(SqlgridError::NoSession)
    }

    pub fn session_mut(&mut self) -> Result<&mut Session> {
        self.current
            .as_mut()
            .map(|loaded| &mut loaded.session)
            .ok_or(SqlgridError::NoSession)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.current.as_ref().map(|loaded| loaded.display_name.as_str())
    }

    /// Size in bytes of the last image loaded or exported from the session.
    pub fn size(&self) -> Option<usize> {
        self.current.as_ref().map(|loaded| loaded.size)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record an applied edit whose snapshot is `size` bytes.
    pub fn mark_dirty(&mut self, size: usize) {
        self.set_size(size);
        self.dirty = true;
    }

    /// Record a saved snapshot of `size` bytes.
    pub fn mark_clean(&mut self, size: usize) {
        self.set_size(size);
        self.dirty = false;
    }

    fn set_size(&mut self, size: usize) {
        if let Some(loaded) = self.current.as_mut() {
            loaded.size = size;
        }
    }
}
