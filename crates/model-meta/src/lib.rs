// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-meta
//!
//! What the inference pipeline needs to know about a compiled model, as
//! emitted by the model build step:
//!
//! - [`TaskKind`]: classification, constrained (grid) detection, or
//!   detection through a bundled post-processing operator.
//! - [`TensorIndices`]: which engine tensors are the input, the output and,
//!   for detectors with separate score tensors, the label/score outputs.
//! - [`QuantizationContract`]: the dtypes and quantization parameters the
//!   pipeline was built against.
//! - [`ModelManifest`]: the JSON descriptor tying these together.
//! - [`ModelLoader`]: loads `model.json` plus `model.safetensors` dense
//!   weights for the reference engine.
//!
//! # Model Directory
//! - `model.json`: manifest (see [`ModelManifest`]).
//! - `model.safetensors`: `dense.weight` `[outputs, inputs]` and
//!   `dense.bias` `[outputs]`, f32; optional `activation` metadata key.
//!
//! # Example
//! ```no_run
//! use model_meta::ModelLoader;
//! use std::path::Path;
//!
//! let model = ModelLoader::load(Path::new("./models/keywords")).unwrap();
//! println!("{}", model.manifest.summary());
//! ```

mod contract;
mod error;
mod loader;
mod manifest;
mod task;

pub use contract::{ContractViolation, QuantizationContract, TensorExpectation, TensorRole};
pub use error::ModelError;
pub use loader::{Activation, DenseWeights, LoadedModel, ModelLoader, MANIFEST_FILE, WEIGHTS_FILE};
pub use manifest::ModelManifest;
pub use task::{ScoreTensorIndices, TaskKind, TensorIndices};
