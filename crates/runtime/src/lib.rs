// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The execution pipeline that drives a precompiled, quantization-aware
//! model and turns feature vectors into classification or detection
//! results.
//!
//! The pipeline takes:
//! - An [`InferenceEngine`] holding the compiled model.
//! - A `ModelManifest` from `model-meta` (task, labels, quantization contract).
//! - An `ArenaManager` from `memory-manager`.
//!
//! And, per call, acquires one arena, encodes the input, invokes the model,
//! decodes the output into an [`InferenceResult`] and releases the arena.
//!
//! # Entry Points
//! - [`Pipeline::run`]: dense float features, quantized if the model input is.
//! - [`Pipeline::run_image_quantized`]: a [`QuantizedFeatureExtractor`]
//!   writes int8 features directly into the input tensor.
//!
//! Every failure carries a [`StatusCode`] via [`RuntimeError::code`].
//!
//! # Concurrency
//! Calls take `&mut self` and never overlap. A [`CancelToken`] may be
//! cloned to another thread; the pipeline polls it after the blocking
//! stages.

pub mod binding;
mod cancel;
mod config;
pub mod decoder;
pub mod dsp;
pub mod encoder;
pub mod engine;
mod error;
pub mod invoker;
mod metrics;
mod pipeline;
mod result;

pub use binding::{ContractState, TensorBindings, TensorHandle};
pub use cancel::CancelToken;
pub use config::PipelineConfig;
pub use dsp::{QuantizedFeatureExtractor, RawQuantizedExtractor, Signal, SliceSignal};
pub use engine::{DenseEngine, InferenceEngine, PostProcessBuffers, TensorSlot};
pub use error::{DspError, EngineError, RuntimeError, StatusCode};
pub use metrics::InferenceMetrics;
pub use pipeline::Pipeline;
pub use result::{BoundingBox, ClassScore, InferenceResult, Timing};
