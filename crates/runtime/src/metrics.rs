// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Aggregate metrics over repeated pipeline calls.
//!
//! [`InferenceMetrics`] collects per-call status and timing so the CLI's
//! `bench` command and the benchmarks can report latency and failure mix.

use crate::{InferenceResult, RuntimeError, StatusCode};
use std::collections::BTreeMap;
use std::time::Duration;

/// Aggregate metrics for a series of pipeline calls.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct InferenceMetrics {
    /// Total wall-clock time across all calls.
    pub total_duration: Duration,
    /// Sum of classification time of successful calls, in microseconds.
    pub total_classification_us: u64,
    /// Fastest successful classification, in microseconds.
    pub min_classification_us: Option<u64>,
    /// Slowest successful classification, in microseconds.
    pub max_classification_us: u64,
    /// Successful calls.
    pub successes: usize,
    /// Failed calls by status name.
    pub failures: BTreeMap<&'static str, usize>,
}

impl InferenceMetrics {
    /// Creates an empty metrics container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one pipeline call.
    pub fn record(
        &mut self,
        outcome: &Result<(), RuntimeError>,
        result: &InferenceResult,
        wall: Duration,
    ) {
        self.total_duration += wall;
        match StatusCode::of(outcome) {
            StatusCode::Ok => {
                let us = result.timing.classification_us;
                self.successes += 1;
                self.total_classification_us += us;
                self.max_classification_us = self.max_classification_us.max(us);
                self.min_classification_us =
                    Some(self.min_classification_us.map_or(us, |m| m.min(us)));
            }
            code => *self.failures.entry(code.as_str()).or_default() += 1,
        }
    }

    /// Number of recorded calls.
    pub fn calls(&self) -> usize {
        self.successes + self.failures.values().sum::<usize>()
    }

    /// Mean classification time of successful calls, in microseconds.
    pub fn mean_classification_us(&self) -> f64 {
        if self.successes == 0 {
            return 0.0;
        }
        self.total_classification_us as f64 / self.successes as f64
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Inference: {} calls in {:.2}ms, {} ok, classification mean {:.1}us \
             (min {}us, max {}us)",
            self.calls(),
            self.total_duration.as_secs_f64() * 1000.0,
            self.successes,
            self.mean_classification_us(),
            self.min_classification_us.unwrap_or(0),
            self.max_classification_us,
        );
        for (status, count) in &self.failures {
            s.push_str(&format!(", {count} {status}"));
        }
        s
    }
}
