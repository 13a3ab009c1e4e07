// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The inference pipeline entry points.
//!
//! ```text
//! features ──► acquire arena ──► engine.init ──► bind + contract (first call)
//!                                                      │
//!                                                      ▼
//!   result ◄── decode ◄── stamp timing ◄── invoke ◄── encode
//!     │
//!     └──► engine.reset ──► release arena ──► cancellation check
//! ```
//!
//! Exactly one arena is live per call. It is released on every return path
//! after acquisition: explicitly on normal and error returns, by `Drop` when
//! a panic unwinds through the call.

use crate::binding::{ContractState, TensorBindings, TensorHandle};
use crate::decoder::{self, DecodeContext};
use crate::dsp::{QuantizedFeatureExtractor, Signal};
use crate::engine::{DenseEngine, InferenceEngine};
use crate::{encoder, invoker};
use crate::{CancelToken, EngineError, InferenceResult, PipelineConfig, RuntimeError};
use memory_manager::{ArenaManager, ScopedArena};
use model_meta::{ModelLoader, ModelManifest, QuantizationContract};
use std::time::Instant;
use tensor_core::DType;

/// Drives one compiled model from features to results.
///
/// # Example
/// ```no_run
/// use runtime::{InferenceResult, Pipeline, PipelineConfig};
///
/// # fn example() -> Result<(), runtime::RuntimeError> {
/// let mut pipeline = Pipeline::from_config(&PipelineConfig::default())?;
/// let mut result = InferenceResult::new();
/// pipeline.run(&[0.1, 0.2, 0.3, 0.4], &mut result)?;
/// println!("{}", result.summary());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E: InferenceEngine> {
    engine: E,
    manager: ArenaManager,
    manifest: ModelManifest,
    contract: QuantizationContract,
    contract_state: ContractState,
    cancel: CancelToken,
    debug: bool,
}

impl<E: InferenceEngine> Pipeline<E> {
    /// Creates a pipeline over `engine`, configured by `manifest`.
    pub fn new(engine: E, manifest: ModelManifest, manager: ArenaManager) -> Self {
        tracing::info!(
            "pipeline '{}' ({}): engine {}, arena {} bytes, budget {}",
            manifest.name,
            manifest.task,
            engine.name(),
            engine.arena_bytes(),
            manager.budget(),
        );
        Self {
            contract: manifest.contract(),
            engine,
            manager,
            manifest,
            contract_state: ContractState::new(),
            cancel: CancelToken::new(),
            debug: false,
        }
    }

    /// Enables line-oriented output of features and predictions at `info`.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Uses an externally owned cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Overrides the manifest's detection threshold.
    pub fn with_detection_threshold(mut self, threshold: f32) -> Self {
        self.manifest.detection_threshold = threshold;
        self
    }

    /// A handle that cancels this pipeline's calls.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    pub fn arena_manager(&self) -> &ArenaManager {
        &self.manager
    }

    /// Returns `true` once the first call has verified the contract.
    pub fn contract_verified(&self) -> bool {
        self.contract_state.is_verified()
    }

    /// Runs inference over a dense float feature vector.
    ///
    /// `result` is cleared first, so on failure it holds no stale scores.
    ///
    /// # Panics
    /// On the first call, if the compiled model's tensors disagree with the
    /// manifest's quantization contract.
    pub fn run(&mut self, features: &[f32], result: &mut InferenceResult) -> Result<(), RuntimeError> {
        *result = InferenceResult::default();
        let outcome = self.run_features(features, result);
        self.report(&outcome);
        outcome
    }

    /// Runs the quantized image path: `extractor` writes int8 features
    /// straight into the input tensor.
    ///
    /// Only available for int8 inputs; any other input type returns
    /// [`RuntimeError::UnsupportedPath`] before an arena is acquired or the
    /// extractor is called.
    pub fn run_image_quantized(
        &mut self,
        signal: &dyn Signal,
        extractor: &mut dyn QuantizedFeatureExtractor,
        result: &mut InferenceResult,
    ) -> Result<(), RuntimeError> {
        *result = InferenceResult::default();
        let outcome = self.run_signal(signal, extractor, result);
        self.report(&outcome);
        outcome
    }

    fn run_features(&mut self, features: &[f32], result: &mut InferenceResult) -> Result<(), RuntimeError> {
        let mut arena = self.manager.acquire(self.engine.arena_bytes())?;
        let outcome = self.forward(&mut arena, result, |arena, input, _| {
            encoder::encode(features, &mut input.view_mut(arena)?)
        });
        self.finish(arena, outcome)
    }

    fn run_signal(
        &mut self,
        signal: &dyn Signal,
        extractor: &mut dyn QuantizedFeatureExtractor,
        result: &mut InferenceResult,
    ) -> Result<(), RuntimeError> {
        let index = self.manifest.tensors.input;
        let dtype = self
            .engine
            .input(index)
            .ok_or(EngineError::MissingTensor { kind: "input", index })?
            .spec
            .dtype;
        if dtype != DType::I8 {
            return Err(RuntimeError::UnsupportedPath { dtype });
        }

        let mut arena = self.manager.acquire(self.engine.arena_bytes())?;
        let cancel = self.cancel.clone();
        let debug = self.debug;

        let outcome = self.forward(&mut arena, result, |arena, input, result| {
            let start = Instant::now();
            extractor.extract_quantized(signal, &mut input.view_mut(arena)?)?;
            if cancel.is_canceled() {
                return Err(RuntimeError::Canceled);
            }
            result.timing.stamp_dsp(start.elapsed());

            if debug {
                let features = input.view(arena)?.to_real_vec();
                let line: Vec<String> = features.iter().map(|v| format!("{v:.5}")).collect();
                tracing::info!("Features ({} ms.): {}", result.timing.dsp_ms, line.join(" "));
            }
            Ok(())
        });
        self.finish(arena, outcome)
    }

    /// Initialises the engine in `arena`, fills the input, runs the forward
    /// pass and decodes the output.
    ///
    /// If `invoke` fails, neither timing nor decoding happens.
    fn forward<F>(
        &mut self,
        arena: &mut ScopedArena,
        result: &mut InferenceResult,
        fill_input: F,
    ) -> Result<(), RuntimeError>
    where
        F: FnOnce(&mut ScopedArena, &TensorHandle, &mut InferenceResult) -> Result<(), RuntimeError>,
    {
        self.engine.init(arena)?;
        let bindings = TensorBindings::resolve(&self.engine, arena, &self.manifest.tensors)?;
        self.contract_state.verify(&self.contract, &bindings);

        fill_input(arena, &bindings.input, result)?;

        let elapsed = invoker::invoke(&mut self.engine, arena)?;
        result.timing.stamp_classification(elapsed);

        let ctx = DecodeContext {
            task: self.manifest.task,
            labels: &self.manifest.labels,
            threshold: self.manifest.detection_threshold,
        };
        let output = bindings.output.view(arena)?;
        decoder::decode(&ctx, &output, self.engine.post_process(), result)?;

        if self.debug {
            log_predictions(result);
        }
        Ok(())
    }

    /// Resets the engine, releases the arena, then polls for cancellation.
    fn finish(&mut self, arena: ScopedArena, outcome: Result<(), RuntimeError>) -> Result<(), RuntimeError> {
        self.engine.reset();
        arena.release();
        outcome?;

        if self.cancel.is_canceled() {
            return Err(RuntimeError::Canceled);
        }
        Ok(())
    }

    fn report(&self, outcome: &Result<(), RuntimeError>) {
        if let Err(e) = outcome {
            if self.debug {
                tracing::warn!("inference failed ({}): {e}", e.code());
            }
        }
    }
}

impl Pipeline<DenseEngine> {
    /// Loads the model named by `config` and builds a pipeline over the
    /// reference engine.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, RuntimeError> {
        let budget = config.parse_budget()?;
        let threshold = config.threshold_override()?;

        let model = ModelLoader::load(&config.model_path)?;
        let manifest = model.manifest.clone();
        let engine = DenseEngine::new(model)?;

        let mut pipeline = Pipeline::new(engine, manifest, ArenaManager::new(budget))
            .with_debug(config.debug);
        if let Some(t) = threshold {
            pipeline = pipeline.with_detection_threshold(t);
        }
        Ok(pipeline)
    }
}

impl<E: InferenceEngine> std::fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("model", &self.manifest.name)
            .field("task", &self.manifest.task)
            .field("engine", &self.engine.name())
            .field("manager", &self.manager)
            .field("contract_verified", &self.contract_state.is_verified())
            .field("debug", &self.debug)
            .finish()
    }
}

fn log_predictions(result: &InferenceResult) {
    tracing::info!("Predictions (time: {} ms.):", result.timing.classification_ms);
    for c in &result.classification {
        tracing::info!("    {}: {:.5}", c.label, c.value);
    }
    for b in &result.bounding_boxes {
        tracing::info!(
            "    {} ({:.5}) [ x: {:.3}, y: {:.3}, width: {:.3}, height: {:.3} ]",
            b.label,
            b.value,
            b.x,
            b.y,
            b.width,
            b.height,
        );
    }
}
