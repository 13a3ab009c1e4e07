// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The inference engine seam.
//!
//! The pipeline drives a compiled model through [`InferenceEngine`]: the
//! engine lays its tensors out inside an arena the pipeline owns, runs the
//! forward pass over that arena, and is reset before the arena is returned.
//!
//! ```text
//! acquire(arena_bytes) ──► init(arena) ──► input/output(idx) ──► invoke(arena)
//!                                                                   │
//!                          release(arena) ◄── reset() ◄── decode ◄──┘
//! ```

mod dense;

pub use dense::DenseEngine;

use crate::EngineError;
use memory_manager::ScopedArena;
use tensor_core::TensorSpec;

/// Where one model tensor lives inside the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorSlot {
    pub spec: TensorSpec,
    /// Byte offset from the start of the arena.
    pub offset: usize,
}

impl TensorSlot {
    pub fn new(spec: TensorSpec, offset: usize) -> Self {
        Self { spec, offset }
    }

    /// Size of the tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.spec.size_bytes()
    }

    /// One past the last byte of the tensor.
    pub fn end(&self) -> usize {
        self.offset + self.size_bytes()
    }
}

/// Output of a detection post-processing operator bundled with the model.
///
/// These buffers belong to the engine, not the arena; every `invoke`
/// overwrites them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostProcessBuffers {
    /// `[ymin, xmin, ymax, xmax]` per detection, normalised.
    pub boxes: Vec<[f32; 4]>,
    pub scores: Vec<f32>,
    /// Class ids, stored as floats by the operator.
    pub classes: Vec<f32>,
    /// Number of valid detections.
    pub count: usize,
}

impl PostProcessBuffers {
    /// Creates buffers for at most `capacity` detections.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boxes: vec![[0.0; 4]; capacity],
            scores: vec![0.0; capacity],
            classes: vec![0.0; capacity],
            count: 0,
        }
    }

    /// Number of detections that can be read consistently from all buffers.
    pub fn len(&self) -> usize {
        self.count
            .min(self.boxes.len())
            .min(self.scores.len())
            .min(self.classes.len())
    }

    /// Returns `true` if no detection can be read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A compiled model the pipeline can drive.
///
/// Tensor descriptions (`input` / `output`) are static and available before
/// `init`; their offsets are only meaningful inside an initialised arena.
pub trait InferenceEngine {
    /// Human-readable engine name.
    fn name(&self) -> &str;

    /// Arena size the compiled model needs.
    fn arena_bytes(&self) -> usize;

    /// Lays the model's tensors out inside `arena`.
    fn init(&mut self, arena: &mut ScopedArena) -> Result<(), EngineError>;

    /// Input tensor by index.
    fn input(&self, index: usize) -> Option<&TensorSlot>;

    /// Output tensor by index.
    fn output(&self, index: usize) -> Option<&TensorSlot>;

    /// Runs exactly one forward pass over the arena.
    fn invoke(&mut self, arena: &mut ScopedArena) -> Result<(), EngineError>;

    /// Forgets the arena layout; called before the arena is released.
    fn reset(&mut self);

    /// Detection post-processing output, for models that bundle the operator.
    fn post_process(&self) -> Option<&PostProcessBuffers> {
        None
    }
}
