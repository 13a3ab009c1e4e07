// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII arena guard that returns memory to its manager on drop.
//!
//! A [`ScopedArena`] is exclusively owned by one inference call. Every exit
//! path of that call, whether success, early `?` return, cancellation or
//! unwinding, drops the guard, and the drop hands the buffer back exactly
//! once.

use crate::manager::ManagerInner;
use crate::MemoryError;
use std::fmt;
use std::sync::Arc;

/// Process-unique identity of one acquired arena.
///
/// Tensor handles record the id of the arena they were resolved against so
/// that they cannot be used with any other arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(pub(crate) u64);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arena#{}", self.0)
    }
}

/// An RAII guard owning one inference arena.
///
/// # Example
/// ```
/// use memory_manager::{ArenaManager, MemoryBudget};
///
/// let manager = ArenaManager::new(MemoryBudget::from_kb(4));
/// let mut arena = manager.acquire(64).unwrap();
/// arena.region_mut(0, 4).unwrap().copy_from_slice(&[1, 2, 3, 4]);
/// assert_eq!(arena.region(2, 2).unwrap(), &[3, 4]);
/// drop(arena);
/// assert_eq!(manager.stats().total_releases, 1);
/// ```
pub struct ScopedArena {
    id: ArenaId,
    data: Vec<u8>,
    manager: Arc<ManagerInner>,
}

impl ScopedArena {
    pub(crate) fn new(id: ArenaId, data: Vec<u8>, manager: Arc<ManagerInner>) -> Self {
        Self { id, data, manager }
    }

    /// Returns this arena's identity.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Capacity in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false` for an acquired arena; zero-sized arenas are refused.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole arena, read-only.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The whole arena, writable.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// A bounds-checked sub-slice `offset..offset + len`.
    pub fn region(&self, offset: usize, len: usize) -> Result<&[u8], MemoryError> {
        let end = self.region_end(offset, len)?;
        Ok(&self.data[offset..end])
    }

    /// A bounds-checked writable sub-slice `offset..offset + len`.
    pub fn region_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8], MemoryError> {
        let end = self.region_end(offset, len)?;
        Ok(&mut self.data[offset..end])
    }

    /// Returns the arena to its manager now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }

    fn region_end(&self, offset: usize, len: usize) -> Result<usize, MemoryError> {
        offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(MemoryError::RegionOutOfBounds {
                offset,
                len,
                arena_bytes: self.data.len(),
            })
    }
}

impl Drop for ScopedArena {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.data);
        self.manager.release(self.id, buffer);
    }
}

impl fmt::Debug for ScopedArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedArena")
            .field("id", &self.id)
            .field("len", &self.data.len())
            .finish()
    }
}
