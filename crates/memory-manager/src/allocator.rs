// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The allocate/release seam behind every arena.
//!
//! Compiled engines are initialised with an allocator and reset with the
//! matching deallocator. [`ArenaAllocator`] is that pair; tests substitute
//! counting or failing implementations.

/// Source of arena memory.
pub trait ArenaAllocator: Send + Sync {
    /// Returns a zero-filled buffer of exactly `bytes` bytes, or `None` if
    /// the memory is not available.
    fn allocate(&self, bytes: usize) -> Option<Vec<u8>>;

    /// Takes back a buffer previously returned by [`allocate`](Self::allocate).
    fn release(&self, buffer: Vec<u8>);
}

/// Allocates arenas on the heap, reporting exhaustion instead of aborting.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl ArenaAllocator for HeapAllocator {
    fn allocate(&self, bytes: usize) -> Option<Vec<u8>> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(bytes).ok()?;
        buffer.resize(bytes, 0);
        Some(buffer)
    }

    fn release(&self, buffer: Vec<u8>) {
        drop(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_allocator_zeroed() {
        let buf = HeapAllocator.allocate(128).unwrap();
        assert_eq!(buf.len(), 128);
        assert!(buf.iter().all(|&b| b == 0));
        HeapAllocator.release(buf);
    }

    #[test]
    fn test_heap_allocator_refuses_impossible_request() {
        assert!(HeapAllocator.allocate(usize::MAX).is_none());
    }
}
