// SPDX-License-Identifier: Apache-2.0

//! Cursor-based access: stepping through a list and reading or detaching
//! the entry under the cursor.

use alloc::string::String;

use super::{Node, NvList};
use crate::error::{ErrorKind, Result};
use crate::value::{Value, ValueKind};

/// Position of one entry in a list.
///
/// A cursor stays valid until its entry is removed. After that it is
/// rejected with [`ErrorKind::NotFound`], even when the slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub(super) slot: usize,
    pub(super) generation: u32,
}

impl Cursor {
    pub(super) fn new(slot: usize, generation: u32) -> Self {
        Self { slot, generation }
    }
}

/// Where a nested list is attached in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    /// The parent's entry holding the nested list.
    pub cursor: Cursor,
    /// Position within the parent's entry when it is an array of lists.
    pub index: Option<usize>,
}

impl ParentLink {
    pub(super) fn new(cursor: Cursor, index: Option<usize>) -> Self {
        Self { cursor, index }
    }
}

impl NvList {
    /// Advances `cursor` to the next entry and returns its name and kind.
    ///
    /// A `None` cursor starts at the first entry. At the end, and when the
    /// cursor no longer points at a live entry, the cursor is reset to `None`
    /// and `None` is returned.
    pub fn next(&self, cursor: &mut Option<Cursor>) -> Option<(&str, ValueKind)> {
        let slot = match *cursor {
            None => self.head,
            Some(current) => self.resolve(current).ok().and_then(|node| node.next),
        };
        let Some(slot) = slot else {
            *cursor = None;
            return None;
        };
        let entry = self.slots.get(slot)?;
        let node = entry.node.as_ref()?;
        *cursor = Some(Cursor::new(slot, entry.generation));
        Some((node.name.as_str(), node.value.kind()))
    }

    /// The name and value under `cursor`.
    pub fn get_at(&self, cursor: Cursor) -> Result<(&str, &Value)> {
        let node = self.resolve(cursor)?;
        Ok((node.name.as_str(), &node.value))
    }

    /// Removes the entry under `cursor` and returns its name and value.
    pub fn take_at(&mut self, cursor: Cursor) -> Result<(String, Value)> {
        self.ensure_writable()?;
        self.resolve(cursor)?;
        self.remove_slot(cursor.slot).ok_or(ErrorKind::NotFound)
    }

    /// Drops the entry under `cursor`.
    pub fn free_at(&mut self, cursor: Cursor) -> Result<()> {
        self.take_at(cursor).map(drop)
    }

    fn resolve(&self, cursor: Cursor) -> Result<&Node> {
        let entry = self.slots.get(cursor.slot).ok_or(ErrorKind::NotFound)?;
        if entry.generation != cursor.generation {
            return Err(ErrorKind::NotFound);
        }
        entry.node.as_ref().ok_or(ErrorKind::NotFound)
    }
}
