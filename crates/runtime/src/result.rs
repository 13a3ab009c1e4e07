// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The uniform result record filled by a pipeline call.

use std::time::Duration;

/// Score of one class.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassScore {
    pub label: String,
    pub value: f32,
}

/// One detected object. Coordinates are normalised to `[0, 1]` of the
/// model input, with `(x, y)` the top-left corner.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BoundingBox {
    pub label: String,
    pub class_id: usize,
    pub value: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Stage durations. Milliseconds are truncated from microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Timing {
    pub dsp_ms: u64,
    pub dsp_us: u64,
    pub classification_ms: u64,
    pub classification_us: u64,
}

impl Timing {
    pub fn stamp_dsp(&mut self, elapsed: Duration) {
        self.dsp_us = micros(elapsed);
        self.dsp_ms = self.dsp_us / 1000;
    }

    pub fn stamp_classification(&mut self, elapsed: Duration) {
        self.classification_us = micros(elapsed);
        self.classification_ms = self.classification_us / 1000;
    }
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

/// Result of one inference.
///
/// Created by the caller and reused across calls; the decoder replaces the
/// score and box lists on every successful invocation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct InferenceResult {
    /// One entry per class, in label order (classification models).
    pub classification: Vec<ClassScore>,
    /// Detected objects (detection models).
    pub bounding_boxes: Vec<BoundingBox>,
    pub timing: Timing,
}

impl InferenceResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest-scoring class and its index.
    pub fn top(&self) -> Option<(usize, &ClassScore)> {
        self.classification
            .iter()
            .enumerate()
            .fold(None, |best, (i, c)| match best {
                Some((_, b)) if b.value >= c.value => best,
                _ => Some((i, c)),
            })
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Timing: DSP {} ms, classification {} ms ({} us)",
            self.timing.dsp_ms, self.timing.classification_ms, self.timing.classification_us
        );
        for c in &self.classification {
            out.push_str(&format!("\n  {}: {:.5}", c.label, c.value));
        }
        for b in &self.bounding_boxes {
            out.push_str(&format!(
                "\n  {} ({:.5}) [x: {:.3}, y: {:.3}, width: {:.3}, height: {:.3}]",
                b.label, b.value, b.x, b.y, b.width, b.height
            ));
        }
        out
    }
}
