// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena statistics for profiling and leak detection.
//!
//! Every successful acquisition must be matched by exactly one release;
//! [`AllocationStats::live_arenas`] exposes the difference.

/// Cumulative statistics about arena usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationStats {
    /// Successful arena acquisitions.
    pub total_acquisitions: u64,
    /// Arenas returned to the allocator.
    pub total_releases: u64,
    /// Acquisitions refused by the budget or the allocator.
    pub failed_acquisitions: u64,
    /// High-water mark of live arena bytes.
    pub peak_live_bytes: usize,
    /// Total bytes ever handed out.
    pub cumulative_bytes: u64,
}

impl AllocationStats {
    /// Arenas acquired but not yet released.
    pub fn live_arenas(&self) -> u64 {
        self.total_acquisitions.saturating_sub(self.total_releases)
    }

    pub(crate) fn record_acquire(&mut self, bytes: usize, live_bytes: usize) {
        self.total_acquisitions += 1;
        self.cumulative_bytes += bytes as u64;
        self.peak_live_bytes = self.peak_live_bytes.max(live_bytes);
    }

    pub(crate) fn record_release(&mut self) {
        self.total_releases += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_acquisitions += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Arenas: {} acquired, {} released, {} failed, peak {:.1} KB, {:.1} KB cumulative",
            self.total_acquisitions,
            self.total_releases,
            self.failed_acquisitions,
            self.peak_live_bytes as f64 / 1024.0,
            self.cumulative_bytes as f64 / 1024.0,
        )
    }
}
