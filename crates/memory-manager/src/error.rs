// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for arena management.

/// Errors that can occur while acquiring or addressing an arena.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The requested arena would exceed the memory budget.
    #[error("arena allocation failed: requested {requested_bytes} bytes, but only {available_bytes} available (budget: {budget_bytes})")]
    ArenaAllocFailed {
        requested_bytes: usize,
        available_bytes: usize,
        budget_bytes: usize,
    },

    /// The allocator could not provide the memory.
    #[error("allocator refused a {requested_bytes} byte arena")]
    AllocatorRefused { requested_bytes: usize },

    /// Attempted to acquire a zero-sized arena.
    #[error("cannot acquire a zero-sized arena")]
    ZeroSizedArena,

    /// A region lies (partly) outside the arena.
    #[error("region {offset}..{offset}+{len} lies outside a {arena_bytes} byte arena")]
    RegionOutOfBounds {
        offset: usize,
        len: usize,
        arena_bytes: usize,
    },

    /// A budget string could not be parsed.
    #[error("invalid memory budget: {0}")]
    InvalidBudget(String),
}

impl MemoryError {
    /// Returns `true` when the error means no arena could be obtained.
    pub fn is_alloc_failure(&self) -> bool {
        matches!(
            self,
            MemoryError::ArenaAllocFailed { .. }
                | MemoryError::AllocatorRefused { .. }
                | MemoryError::ZeroSizedArena
        )
    }
}
