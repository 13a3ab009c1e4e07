// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor binding resolution and the one-time quantization contract check.
//!
//! A [`TensorHandle`] remembers which arena it was resolved against; views
//! can only be formed over that arena and borrow it for their lifetime, so a
//! handle cannot outlive the memory it describes in any useful way.

use crate::engine::{InferenceEngine, TensorSlot};
use crate::{EngineError, RuntimeError};
use memory_manager::{ArenaId, ScopedArena};
use model_meta::{ContractViolation, QuantizationContract, TensorIndices, TensorRole};
use tensor_core::{TensorSpec, TensorView, TensorViewMut};

/// A non-owning reference to one tensor inside one arena.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorHandle {
    arena: ArenaId,
    offset: usize,
    spec: TensorSpec,
}

impl TensorHandle {
    fn new(arena: ArenaId, slot: &TensorSlot) -> Self {
        Self {
            arena,
            offset: slot.offset,
            spec: slot.spec.clone(),
        }
    }

    /// The arena this handle was resolved against.
    pub fn arena_id(&self) -> ArenaId {
        self.arena
    }

    pub fn spec(&self) -> &TensorSpec {
        &self.spec
    }

    /// Read-only view over the tensor's bytes.
    pub fn view<'a>(&'a self, arena: &'a ScopedArena) -> Result<TensorView<'a>, RuntimeError> {
        self.check_arena(arena)?;
        let bytes = arena.region(self.offset, self.spec.size_bytes())?;
        Ok(TensorView::new(&self.spec, bytes)?)
    }

    /// Writable view over the tensor's bytes.
    pub fn view_mut<'a>(
        &'a self,
        arena: &'a mut ScopedArena,
    ) -> Result<TensorViewMut<'a>, RuntimeError> {
        self.check_arena(arena)?;
        let bytes = arena.region_mut(self.offset, self.spec.size_bytes())?;
        Ok(TensorViewMut::new(&self.spec, bytes)?)
    }

    fn check_arena(&self, arena: &ScopedArena) -> Result<(), RuntimeError> {
        if arena.id() != self.arena {
            return Err(RuntimeError::ForeignArena {
                handle: self.arena,
                arena: arena.id(),
            });
        }
        Ok(())
    }
}

/// Label and score outputs of detectors that expose them separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHandles {
    pub labels: TensorHandle,
    pub scores: TensorHandle,
}

/// All tensors one pipeline call touches.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBindings {
    pub input: TensorHandle,
    pub output: TensorHandle,
    pub score_tensors: Option<ScoreHandles>,
}

impl TensorBindings {
    /// Resolves the configured tensors of an initialised engine.
    pub fn resolve<E: InferenceEngine + ?Sized>(
        engine: &E,
        arena: &ScopedArena,
        indices: &TensorIndices,
    ) -> Result<Self, RuntimeError> {
        let id = arena.id();
        let input = engine
            .input(indices.input)
            .ok_or(EngineError::MissingTensor {
                kind: "input",
                index: indices.input,
            })?;
        let output = engine
            .output(indices.output)
            .ok_or(EngineError::MissingTensor {
                kind: "output",
                index: indices.output,
            })?;

        let score_tensors = match indices.score_tensors {
            Some(idx) => {
                let labels = engine.output(idx.labels).ok_or(EngineError::MissingTensor {
                    kind: "labels",
                    index: idx.labels,
                })?;
                let scores = engine.output(idx.scores).ok_or(EngineError::MissingTensor {
                    kind: "scores",
                    index: idx.scores,
                })?;
                Some(ScoreHandles {
                    labels: TensorHandle::new(id, labels),
                    scores: TensorHandle::new(id, scores),
                })
            }
            None => None,
        };

        Ok(Self {
            input: TensorHandle::new(id, input),
            output: TensorHandle::new(id, output),
            score_tensors,
        })
    }

    /// Checks every bound tensor against the contract.
    pub fn check_contract(&self, contract: &QuantizationContract) -> Result<(), ContractViolation> {
        contract.check(TensorRole::Input, self.input.spec())?;
        contract.check(TensorRole::Output, self.output.spec())?;
        if let Some(st) = &self.score_tensors {
            contract.check(TensorRole::Scores, st.scores.spec())?;
            contract.check(TensorRole::Labels, st.labels.spec())?;
        }
        Ok(())
    }
}

/// Whether this pipeline has already verified its quantization contract.
#[derive(Debug, Default)]
pub struct ContractState {
    verified: bool,
}

impl ContractState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Verifies the contract on the first call and does nothing afterwards.
    ///
    /// # Panics
    /// If the compiled model disagrees with the configured contract. The
    /// pipeline cannot encode or decode correctly in that case.
    pub fn verify(&mut self, contract: &QuantizationContract, bindings: &TensorBindings) {
        if self.verified {
            return;
        }
        if let Err(violation) = bindings.check_contract(contract) {
            panic!("quantization contract violated: {violation}");
        }
        tracing::debug!("quantization contract verified");
        self.verified = true;
    }
}
