// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! Scoped working-memory arenas for a single forward pass on a
//! memory-constrained device.
//!
//! # Key Components
//!
//! - [`MemoryBudget`]: a hard ceiling on live arena bytes with
//!   human-readable parsing (`"64K"`, `"1M"`, etc.).
//! - [`ArenaAllocator`]: the allocate/release seam an engine's memory comes
//!   through. [`HeapAllocator`] is the default.
//! - [`ArenaManager`]: enforces the budget, hands out arenas and tracks
//!   statistics.
//! - [`ScopedArena`]: an RAII guard owning one arena. Dropping it (or calling
//!   [`ScopedArena::release`]) returns the memory exactly once.
//! - [`AllocationStats`]: acquisition/release counters and peak usage.
//!
//! # Ownership Model
//!
//! ```text
//! ArenaManager::acquire(bytes)
//!       │
//!       ▼
//!   ScopedArena  ◄─── owns Vec<u8>, holds Arc<ManagerInner>
//!       │
//!       │  drop() / release()
//!       ▼
//!   ManagerInner::release()  ──► ArenaAllocator::release()
//! ```
//!
//! # Example
//! ```
//! use memory_manager::{ArenaManager, MemoryBudget};
//!
//! let manager = ArenaManager::new(MemoryBudget::from_kb(64));
//!
//! let arena = manager.acquire(16 * 1024).unwrap();
//! assert_eq!(manager.live_bytes(), 16 * 1024);
//!
//! arena.release();
//! assert_eq!(manager.live_bytes(), 0);
//! assert_eq!(manager.stats().live_arenas(), 0);
//! ```

mod allocator;
mod arena;
mod budget;
mod error;
pub mod manager;
mod stats;

pub use allocator::{ArenaAllocator, HeapAllocator};
pub use arena::{ArenaId, ScopedArena};
pub use budget::MemoryBudget;
pub use error::MemoryError;
pub use manager::ArenaManager;
pub use stats::AllocationStats;
