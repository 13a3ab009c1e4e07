// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Budget-enforcing arena manager.
//!
//! The [`ArenaManager`] is the Arena Lifecycle Manager of the pipeline. It:
//!
//! 1. Enforces a hard ceiling on live arena bytes; requests that would
//!    exceed it fail with [`MemoryError::ArenaAllocFailed`] and nothing is
//!    allocated.
//! 2. Delegates the memory itself to an [`ArenaAllocator`].
//! 3. Tracks acquisitions and releases so leaks and double releases are
//!    observable.
//!
//! There is no retry: a refused acquisition is final for that call.
//!
//! # Thread Safety
//! `ArenaManager` is `Send + Sync`; counters are atomics and statistics sit
//! behind a `Mutex`.

use crate::{AllocationStats, ArenaAllocator, ArenaId, HeapAllocator, MemoryBudget, MemoryError, ScopedArena};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Manager state shared with every live [`ScopedArena`] via `Arc`.
pub struct ManagerInner {
    budget: MemoryBudget,
    allocator: Box<dyn ArenaAllocator>,
    live_bytes: AtomicUsize,
    next_id: AtomicU64,
    stats: Mutex<AllocationStats>,
}

impl ManagerInner {
    /// Called from `ScopedArena::drop`; runs exactly once per arena.
    pub(crate) fn release(&self, id: ArenaId, buffer: Vec<u8>) {
        let bytes = buffer.len();
        self.live_bytes.fetch_sub(bytes, Ordering::AcqRel);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_release();
        }
        self.allocator.release(buffer);
        tracing::trace!("{id} released ({bytes} bytes)");
    }

    fn record_failure(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_failure();
        }
    }
}

/// Hands out [`ScopedArena`]s within a [`MemoryBudget`].
///
/// # Example
/// ```
/// use memory_manager::{ArenaManager, MemoryBudget, MemoryError};
///
/// let manager = ArenaManager::new(MemoryBudget::from_bytes(1024));
///
/// let arena = manager.acquire(1024).unwrap();
/// assert!(matches!(manager.acquire(1), Err(MemoryError::ArenaAllocFailed { .. })));
///
/// drop(arena);
/// assert_eq!(manager.available_bytes(), 1024);
/// ```
pub struct ArenaManager {
    inner: Arc<ManagerInner>,
}

impl ArenaManager {
    /// Creates a manager backed by the heap.
    pub fn new(budget: MemoryBudget) -> Self {
        Self::with_allocator(budget, HeapAllocator)
    }

    /// Creates a manager backed by a custom allocator.
    pub fn with_allocator(budget: MemoryBudget, allocator: impl ArenaAllocator + 'static) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                budget,
                allocator: Box::new(allocator),
                live_bytes: AtomicUsize::new(0),
                next_id: AtomicU64::new(1),
                stats: Mutex::new(AllocationStats::default()),
            }),
        }
    }

    /// Acquires a zero-filled arena of exactly `required_bytes`.
    ///
    /// The arena is returned when the guard is dropped or explicitly
    /// [released](ScopedArena::release).
    pub fn acquire(&self, required_bytes: usize) -> Result<ScopedArena, MemoryError> {
        if required_bytes == 0 {
            self.inner.record_failure();
            return Err(MemoryError::ZeroSizedArena);
        }

        let budget = self.inner.budget.as_bytes();

        // Reserve budget first so concurrent callers cannot both pass the check.
        let reserved = self
            .inner
            .live_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                live.checked_add(required_bytes).filter(|&total| total <= budget)
            });
        let previous = match reserved {
            Ok(previous) => previous,
            Err(live) => {
                self.inner.record_failure();
                return Err(MemoryError::ArenaAllocFailed {
                    requested_bytes: required_bytes,
                    available_bytes: budget.saturating_sub(live),
                    budget_bytes: budget,
                });
            }
        };

        let mut data = match self.inner.allocator.allocate(required_bytes) {
            Some(data) => data,
            None => {
                self.inner
                    .live_bytes
                    .fetch_sub(required_bytes, Ordering::AcqRel);
                self.inner.record_failure();
                return Err(MemoryError::AllocatorRefused {
                    requested_bytes: required_bytes,
                });
            }
        };
        data.resize(required_bytes, 0);

        let id = ArenaId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_acquire(required_bytes, previous + required_bytes);
        }
        tracing::trace!("{id} acquired ({required_bytes} bytes)");

        Ok(ScopedArena::new(id, data, Arc::clone(&self.inner)))
    }

    /// Bytes currently held by live arenas.
    pub fn live_bytes(&self) -> usize {
        self.inner.live_bytes.load(Ordering::Acquire)
    }

    /// Bytes that can still be acquired before hitting the budget.
    pub fn available_bytes(&self) -> usize {
        self.inner.budget.as_bytes().saturating_sub(self.live_bytes())
    }

    /// Returns the memory budget.
    pub fn budget(&self) -> MemoryBudget {
        self.inner.budget
    }

    /// Returns a snapshot of the statistics.
    pub fn stats(&self) -> AllocationStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ArenaManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaManager")
            .field("budget", &self.inner.budget)
            .field("live_bytes", &self.live_bytes())
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
