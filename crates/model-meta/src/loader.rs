// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading from manifest + SafeTensors files.
//!
//! The loader reads a model directory containing:
//! - `model.json`: the manifest (see [`ModelManifest`]).
//! - `model.safetensors`: the dense weights of the reference engine.
//!
//! The weight file is memory-mapped and only the two tensors the reference
//! engine needs are copied out.

use crate::{ModelError, ModelManifest};
use std::collections::HashMap;
use std::path::Path;
use tensor_core::Shape;

/// Default manifest filename.
pub const MANIFEST_FILE: &str = "model.json";

/// Default SafeTensors filename.
pub const WEIGHTS_FILE: &str = "model.safetensors";

const WEIGHT_TENSOR: &str = "dense.weight";
const BIAS_TENSOR: &str = "dense.bias";
const ACTIVATION_KEY: &str = "activation";

/// Output activation applied after the dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    None,
    /// Softmax over the last output dimension.
    Softmax,
}

impl Activation {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "linear" => Some(Activation::None),
            "softmax" => Some(Activation::Softmax),
            _ => None,
        }
    }

    /// Name stored in the weights file metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Activation::None => "none",
            Activation::Softmax => "softmax",
        }
    }
}

/// Weights of a single dense layer, `y = W x + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseWeights {
    /// Row-major `[outputs, inputs]`.
    pub weight: Vec<f32>,
    pub weight_shape: Shape,
    /// `[outputs]`.
    pub bias: Vec<f32>,
    pub activation: Activation,
}

impl DenseWeights {
    /// Number of input features.
    pub fn inputs(&self) -> usize {
        self.weight_shape.dim(1).unwrap_or(0)
    }

    /// Number of output values.
    pub fn outputs(&self) -> usize {
        self.weight_shape.dim(0).unwrap_or(0)
    }
}

/// A manifest together with the weights it describes.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub manifest: ModelManifest,
    pub weights: DenseWeights,
}

impl LoadedModel {
    /// Writes `model.json` and `model.safetensors` into `model_dir`.
    pub fn save(&self, model_dir: &Path) -> Result<(), ModelError> {
        std::fs::create_dir_all(model_dir)?;
        std::fs::write(model_dir.join(MANIFEST_FILE), self.manifest.to_json()?)?;

        let weight_bytes = to_le_bytes(&self.weights.weight);
        let bias_bytes = to_le_bytes(&self.weights.bias);
        let weight = safetensors::tensor::TensorView::new(
            safetensors::Dtype::F32,
            self.weights.weight_shape.dims().to_vec(),
            &weight_bytes,
        )
        .map_err(|e| ModelError::SafeTensorsError(format!("{WEIGHT_TENSOR}: {e}")))?;
        let bias = safetensors::tensor::TensorView::new(
            safetensors::Dtype::F32,
            vec![self.weights.bias.len()],
            &bias_bytes,
        )
        .map_err(|e| ModelError::SafeTensorsError(format!("{BIAS_TENSOR}: {e}")))?;

        let mut metadata = HashMap::new();
        metadata.insert(
            ACTIVATION_KEY.to_string(),
            self.weights.activation.as_str().to_string(),
        );

        let bytes = safetensors::serialize(
            [(WEIGHT_TENSOR, weight), (BIAS_TENSOR, bias)],
            &Some(metadata),
        )
        .map_err(|e| ModelError::SafeTensorsError(format!("serialize failed: {e}")))?;
        std::fs::write(model_dir.join(WEIGHTS_FILE), bytes)?;
        Ok(())
    }
}

/// Loads a model directory from disk.
///
/// # Example
/// ```no_run
/// use model_meta::ModelLoader;
/// use std::path::Path;
///
/// let model = ModelLoader::load(Path::new("./models/keywords")).unwrap();
/// println!("{} outputs", model.weights.outputs());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Loads and validates a model from the given directory.
    ///
    /// Steps:
    /// 1. Parse `model.json` and validate it.
    /// 2. Memory-map `model.safetensors` and copy out the dense weights.
    /// 3. Check the weight shapes against the manifest's tensors.
    pub fn load(model_dir: &Path) -> Result<LoadedModel, ModelError> {
        let manifest = Self::load_manifest(model_dir)?;
        let weights = Self::read_weights(model_dir)?;
        check_weights(&manifest, &weights)?;

        tracing::info!(
            "Loaded model '{}' ({}, {} -> {}, activation {})",
            manifest.name,
            manifest.task,
            weights.inputs(),
            weights.outputs(),
            weights.activation.as_str(),
        );

        Ok(LoadedModel { manifest, weights })
    }

    /// Parses and validates only the manifest.
    pub fn load_manifest(model_dir: &Path) -> Result<ModelManifest, ModelError> {
        let manifest = ModelManifest::from_file(&model_dir.join(MANIFEST_FILE))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn read_weights(model_dir: &Path) -> Result<DenseWeights, ModelError> {
        let weights_path = model_dir.join(WEIGHTS_FILE);
        let file = std::fs::File::open(&weights_path).map_err(|e| {
            ModelError::SafeTensorsError(format!(
                "cannot open '{}': {e}",
                weights_path.display()
            ))
        })?;

        // SAFETY: the mapping is read-only and dropped before returning.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| ModelError::SafeTensorsError(format!("mmap failed: {e}")))?;

        let (_, metadata) = safetensors::SafeTensors::read_metadata(&mmap).map_err(|e| {
            ModelError::SafeTensorsError(format!("SafeTensors header error: {e}"))
        })?;
        let activation = match metadata
            .metadata()
            .as_ref()
            .and_then(|m| m.get(ACTIVATION_KEY))
        {
            Some(name) => Activation::parse(name).ok_or_else(|| {
                ModelError::SafeTensorsError(format!("unknown activation '{name}'"))
            })?,
            None => Activation::None,
        };

        let tensors = safetensors::SafeTensors::deserialize(&mmap).map_err(|e| {
            ModelError::SafeTensorsError(format!("SafeTensors parse error: {e}"))
        })?;

        let (weight, weight_shape) = read_f32_tensor(&tensors, WEIGHT_TENSOR)?;
        let (bias, _) = read_f32_tensor(&tensors, BIAS_TENSOR)?;

        Ok(DenseWeights {
            weight,
            weight_shape,
            bias,
            activation,
        })
    }
}

fn read_f32_tensor(
    tensors: &safetensors::SafeTensors<'_>,
    name: &str,
) -> Result<(Vec<f32>, Shape), ModelError> {
    let view = tensors.tensor(name).map_err(|_| ModelError::WeightNotFound {
        name: name.to_string(),
    })?;
    if view.dtype() != safetensors::Dtype::F32 {
        return Err(ModelError::SafeTensorsError(format!(
            "{name}: unsupported SafeTensors dtype {:?}",
            view.dtype()
        )));
    }
    let values = view
        .data()
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok((values, Shape::new(view.shape().to_vec())))
}

fn check_weights(manifest: &ModelManifest, weights: &DenseWeights) -> Result<(), ModelError> {
    let inputs = manifest.input.num_elements();
    let outputs = manifest.output.num_elements();
    let bad = |detail: String| ModelError::SafeTensorsError(format!("{WEIGHT_TENSOR}: {detail}"));

    if weights.weight_shape.rank() != 2 {
        return Err(bad(format!("expected rank 2, got {}", weights.weight_shape)));
    }
    if weights.inputs() != inputs || weights.outputs() != outputs {
        return Err(bad(format!(
            "shape {} does not map {inputs} inputs to {outputs} outputs",
            weights.weight_shape
        )));
    }
    if weights.bias.len() != outputs {
        return Err(ModelError::SafeTensorsError(format!(
            "{BIAS_TENSOR}: {} values for {outputs} outputs",
            weights.bias.len()
        )));
    }
    Ok(())
}

fn to_le_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
