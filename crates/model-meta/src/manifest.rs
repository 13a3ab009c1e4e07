// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model manifest parsing.
//!
//! The manifest (`model.json`) is generated alongside the compiled model and
//! carries everything the pipeline is configured with: task kind, labels,
//! tensor indices, the input/output quantization contract and the arena size.
//!
//! # Format
//! ```json
//! {
//!   "name": "keywords-int8",
//!   "task": "classification",
//!   "labels": ["noise", "yes"],
//!   "tensors": { "input": 0, "output": 0 },
//!   "input": {
//!     "dtype": "int8",
//!     "shape": [1, 4],
//!     "quant": { "scale": 0.0078, "zero_point": -1 }
//!   },
//!   "output": {
//!     "dtype": "int8",
//!     "shape": [1, 2],
//!     "quant": { "scale": 0.0039, "zero_point": -128 }
//!   },
//!   "arena_bytes": 4096,
//!   "detection_threshold": 0.5
//! }
//! ```

use crate::{ModelError, QuantizationContract, TaskKind, TensorExpectation, TensorIndices};
use std::path::Path;
use tensor_core::TensorSpec;

/// Top-level model manifest, deserialized from `model.json`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    /// Human-readable model name.
    pub name: String,
    /// How the output tensor(s) are interpreted.
    pub task: TaskKind,
    /// Class labels, in output order.
    pub labels: Vec<String>,
    /// Engine tensor indices.
    #[serde(default)]
    pub tensors: TensorIndices,
    /// Configured input tensor.
    pub input: TensorSpec,
    /// Configured output tensor.
    pub output: TensorSpec,
    /// Working memory the compiled model needs.
    pub arena_bytes: usize,
    /// Minimum score for a detection to be reported.
    #[serde(default = "default_threshold")]
    pub detection_threshold: f32,
}

fn default_threshold() -> f32 {
    0.5
}

impl ModelManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Serializes the manifest as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates that the manifest is internally consistent.
    ///
    /// Checks:
    /// - At least one label.
    /// - Quantized tensors declare their parameters, with a positive scale.
    /// - Classification outputs have one score per label.
    /// - Constrained detection outputs are `[1, H, W, labels + 1]`.
    /// - Score tensors are only configured for detection models.
    /// - A non-zero arena and a threshold within `[0, 1]`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.labels.is_empty() {
            return Err(invalid("labels", "at least one label is required"));
        }

        check_quant("input", &self.input)?;
        check_quant("output", &self.output)?;

        if self.input.num_elements() == 0 {
            return Err(invalid("input", "input tensor has no elements"));
        }

        match self.task {
            TaskKind::Classification => {
                let n = self.output.num_elements();
                if n != self.labels.len() {
                    return Err(invalid(
                        "output",
                        format!("{n} output scores for {} labels", self.labels.len()),
                    ));
                }
            }
            TaskKind::ConstrainedDetection => {
                let shape = &self.output.shape;
                if shape.rank() != 4 || shape.dim(0) != Some(1) {
                    return Err(invalid(
                        "output",
                        format!("expected a [1, H, W, C] grid, got {shape}"),
                    ));
                }
                if shape.last_dim() != self.labels.len() + 1 {
                    return Err(invalid(
                        "output",
                        format!(
                            "{} channels for {} labels plus background",
                            shape.last_dim(),
                            self.labels.len()
                        ),
                    ));
                }
            }
            TaskKind::Detection => {}
        }

        if self.tensors.score_tensors.is_some() && !self.task.is_detection() {
            return Err(invalid(
                "tensors",
                "score tensors are only meaningful for detection models",
            ));
        }

        if self.arena_bytes == 0 {
            return Err(invalid("arena_bytes", "arena size must be non-zero"));
        }

        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(invalid(
                "detection_threshold",
                format!("{} is outside [0, 1]", self.detection_threshold),
            ));
        }

        Ok(())
    }

    /// The quantization contract the compiled model must satisfy.
    pub fn contract(&self) -> QuantizationContract {
        QuantizationContract {
            input: TensorExpectation::from_spec(&self.input),
            output: TensorExpectation::from_spec(&self.output),
        }
    }

    /// Number of input features per inference.
    pub fn frame_size(&self) -> usize {
        self.input.num_elements()
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Model: {} ({})\n\
             Labels: {} [{}]\n\
             Input: {} {} {}\n\
             Output: {} {} {}\n\
             Arena: {} bytes\n\
             Threshold: {:.2}",
            self.name,
            self.task,
            self.labels.len(),
            self.labels.join(", "),
            self.input.dtype,
            self.input.shape,
            describe_quant(&self.input),
            self.output.dtype,
            self.output.shape,
            describe_quant(&self.output),
            self.arena_bytes,
            self.detection_threshold,
        )
    }
}

fn invalid(field: &'static str, detail: impl Into<String>) -> ModelError {
    ModelError::InvalidManifest {
        field,
        detail: detail.into(),
    }
}

fn check_quant(field: &'static str, spec: &TensorSpec) -> Result<(), ModelError> {
    if !spec.dtype.is_quantized() {
        return Ok(());
    }
    match spec.quant {
        None => Err(invalid(
            field,
            format!("{} tensor requires quantization parameters", spec.dtype),
        )),
        Some(q) if !(q.scale > 0.0 && q.scale.is_finite()) => {
            Err(invalid(field, format!("scale must be positive, got {}", q.scale)))
        }
        Some(_) => Ok(()),
    }
}

fn describe_quant(spec: &TensorSpec) -> String {
    match spec.quant {
        Some(q) if spec.dtype.is_quantized() => {
            format!("(scale {}, zero point {})", q.scale, q.zero_point)
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{DType, QuantParams, Shape};

    fn sample_manifest_json() -> &'static str {
        r#"{
            "name": "keywords-int8",
            "task": "classification",
            "labels": ["noise", "yes"],
            "tensors": { "input": 0, "output": 0 },
            "input": {
                "dtype": "int8",
                "shape": [1, 4],
                "quant": { "scale": 0.0078, "zero_point": -1 }
            },
            "output": {
                "dtype": "int8",
                "shape": [1, 2],
                "quant": { "scale": 0.0039, "zero_point": -128 }
            },
            "arena_bytes": 4096
        }"#
    }

    fn grid_manifest() -> ModelManifest {
        ModelManifest {
            name: "fomo".into(),
            task: TaskKind::ConstrainedDetection,
            labels: vec!["cup".into(), "lamp".into()],
            tensors: TensorIndices::default(),
            input: TensorSpec::quantized(DType::I8, Shape::new(vec![1, 8, 8, 1]), QuantParams::new(0.0039, -128)),
            output: TensorSpec::quantized(DType::I8, Shape::new(vec![1, 2, 2, 3]), QuantParams::new(0.0039, -128)),
            arena_bytes: 1024,
            detection_threshold: 0.5,
        }
    }

    #[test]
    fn test_parse_manifest() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.name, "keywords-int8");
        assert_eq!(m.task, TaskKind::Classification);
        assert_eq!(m.input.quant, Some(QuantParams::new(0.0078, -1)));
        assert_eq!(m.frame_size(), 4);
        assert_eq!(m.detection_threshold, 0.5);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        let back = ModelManifest::from_json(&m.to_json().unwrap()).unwrap();
        assert_eq!(m, back);
    }

    #[test]
    fn test_contract_from_manifest() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        let c = m.contract();
        assert_eq!(c.input.dtype, DType::I8);
        assert_eq!(c.output.quant, Some(QuantParams::new(0.0039, -128)));
    }

    #[test]
    fn test_label_count_mismatch() {
        let mut m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        m.labels.push("no".into());
        assert!(matches!(
            m.validate(),
            Err(ModelError::InvalidManifest { field: "output", .. })
        ));
    }

    #[test]
    fn test_missing_quant_params() {
        let mut m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        m.input.quant = None;
        assert!(matches!(
            m.validate(),
            Err(ModelError::InvalidManifest { field: "input", .. })
        ));
    }

    #[test]
    fn test_constrained_detection_shape() {
        let mut m = grid_manifest();
        assert!(m.validate().is_ok());

        m.output.shape = Shape::new(vec![1, 2, 2, 2]);
        assert!(m.validate().is_err());

        m.output.shape = Shape::matrix(4, 3);
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_score_tensors_only_for_detection() {
        let mut m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        m.tensors.score_tensors = Some(crate::ScoreTensorIndices { labels: 1, scores: 2 });
        assert!(matches!(
            m.validate(),
            Err(ModelError::InvalidManifest { field: "tensors", .. })
        ));
    }

    #[test]
    fn test_threshold_range() {
        let mut m = grid_manifest();
        m.detection_threshold = 1.5;
        assert!(matches!(
            m.validate(),
            Err(ModelError::InvalidManifest { field: "detection_threshold", .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ModelManifest::from_json("{ not json"),
            Err(ModelError::ManifestParseError(_))
        ));
    }

    #[test]
    fn test_summary() {
        let m = ModelManifest::from_json(sample_manifest_json()).unwrap();
        let s = m.summary();
        assert!(s.contains("keywords-int8"));
        assert!(s.contains("classification"));
        assert!(s.contains("zero point -1"));
    }
}
