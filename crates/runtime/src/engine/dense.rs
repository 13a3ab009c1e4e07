// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reference engine: a single dense layer with an optional softmax.
//!
//! Stands in for a compiled model on hosts without an accelerator so the
//! pipeline, the CLI and the benchmarks have something real to drive.
//! Quantized inputs are dequantized with the input tensor's parameters and
//! results are quantized with the output tensor's, exactly as an int8
//! kernel library would present them.

use crate::engine::{InferenceEngine, TensorSlot};
use crate::EngineError;
use memory_manager::ScopedArena;
use model_meta::{Activation, DenseWeights, LoadedModel, ModelManifest, TaskKind};
use tensor_core::{matmul, softmax, Shape, TensorView, TensorViewMut};

/// Tensor start offsets inside the arena are rounded up to this.
const TENSOR_ALIGN: usize = 16;

/// Dense-layer engine over an arena laid out as `[input | pad | output]`.
pub struct DenseEngine {
    name: String,
    weights: DenseWeights,
    input: TensorSlot,
    output: TensorSlot,
    arena_bytes: usize,
    initialised: bool,
}

impl DenseEngine {
    /// Builds the engine for a loaded model.
    pub fn new(model: LoadedModel) -> Result<Self, EngineError> {
        Self::from_parts(&model.manifest, model.weights)
    }

    /// Builds the engine from a manifest and matching weights.
    pub fn from_parts(manifest: &ModelManifest, weights: DenseWeights) -> Result<Self, EngineError> {
        if manifest.task == TaskKind::Detection {
            return Err(EngineError::Unsupported(
                "the dense engine has no detection post-processing operator".into(),
            ));
        }

        let inputs = manifest.input.num_elements();
        let outputs = manifest.output.num_elements();
        if weights.inputs() != inputs || weights.outputs() != outputs || weights.bias.len() != outputs {
            return Err(EngineError::Unsupported(format!(
                "weights {} do not map {inputs} inputs to {outputs} outputs",
                weights.weight_shape
            )));
        }

        let input = TensorSlot::new(manifest.input.clone(), 0);
        let output = TensorSlot::new(manifest.output.clone(), align_up(input.end(), TENSOR_ALIGN));
        let arena_bytes = manifest.arena_bytes.max(output.end());

        tracing::debug!(
            "dense engine '{}': input @{} ({} B), output @{} ({} B), arena {} B",
            manifest.name,
            input.offset,
            input.size_bytes(),
            output.offset,
            output.size_bytes(),
            arena_bytes,
        );

        Ok(Self {
            name: manifest.name.clone(),
            weights,
            input,
            output,
            arena_bytes,
            initialised: false,
        })
    }

    /// Returns `true` between `init` and `reset`.
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }
}

impl InferenceEngine for DenseEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn arena_bytes(&self) -> usize {
        self.arena_bytes
    }

    fn init(&mut self, arena: &mut ScopedArena) -> Result<(), EngineError> {
        if arena.len() < self.output.end() {
            return Err(EngineError::ArenaTooSmall {
                required: self.output.end(),
                actual: arena.len(),
            });
        }
        self.initialised = true;
        Ok(())
    }

    fn input(&self, index: usize) -> Option<&TensorSlot> {
        (index == 0).then_some(&self.input)
    }

    fn output(&self, index: usize) -> Option<&TensorSlot> {
        (index == 0).then_some(&self.output)
    }

    fn invoke(&mut self, arena: &mut ScopedArena) -> Result<(), EngineError> {
        if !self.initialised {
            return Err(EngineError::NotInitialised(self.name.clone()));
        }

        let x = {
            let bytes = arena.region(self.input.offset, self.input.size_bytes())?;
            TensorView::new(&self.input.spec, bytes)?.to_real_vec()
        };

        let mut y = vec![0.0f32; self.weights.outputs()];
        matmul(
            &self.weights.weight,
            &self.weights.weight_shape,
            &x,
            &Shape::matrix(x.len(), 1),
            &mut y,
        )?;
        for (value, bias) in y.iter_mut().zip(&self.weights.bias) {
            *value += bias;
        }

        if self.weights.activation == Activation::Softmax {
            let width = self.output.spec.shape.last_dim().max(1);
            for row in y.chunks_mut(width) {
                softmax(row);
            }
        }

        let bytes = arena.region_mut(self.output.offset, self.output.size_bytes())?;
        let mut out = TensorViewMut::new(&self.output.spec, bytes)?;
        for (i, &value) in y.iter().enumerate() {
            out.set_real(i, value)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.initialised = false;
    }
}

impl std::fmt::Debug for DenseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseEngine")
            .field("name", &self.name)
            .field("weights", &self.weights.weight_shape)
            .field("activation", &self.weights.activation)
            .field("arena_bytes", &self.arena_bytes)
            .field("initialised", &self.initialised)
            .finish()
    }
}

fn align_up(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}
