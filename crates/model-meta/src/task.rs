// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Task kinds and tensor index layout.

use std::fmt;

/// The closed set of output interpretations, fixed when the model is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// One score per label, read from a `[1, N]` output.
    Classification,
    /// A `[1, H, W, C]` grid of per-cell class scores; channel 0 is background.
    ConstrainedDetection,
    /// Boxes produced by a detection post-processing operator bundled with
    /// the model, read from the engine's side-channel buffers.
    Detection,
}

impl TaskKind {
    /// Returns a human-readable label for this task.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Classification => "classification",
            TaskKind::ConstrainedDetection => "constrained-detection",
            TaskKind::Detection => "detection",
        }
    }

    /// Returns `true` for either detection variant.
    pub fn is_detection(self) -> bool {
        !matches!(self, TaskKind::Classification)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output indices of the separate label and score tensors some detectors expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreTensorIndices {
    /// Output index of the label tensor.
    pub labels: usize,
    /// Output index of the score tensor.
    pub scores: usize,
}

/// Engine tensor indices the pipeline binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct TensorIndices {
    /// Input tensor index.
    #[serde(default)]
    pub input: usize,
    /// Primary output tensor index.
    #[serde(default)]
    pub output: usize,
    /// Label/score outputs, for detectors that have them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_tensors: Option<ScoreTensorIndices>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serde() {
        let t: TaskKind = serde_json::from_str("\"constrained-detection\"").unwrap();
        assert_eq!(t, TaskKind::ConstrainedDetection);
        assert_eq!(serde_json::to_string(&TaskKind::Classification).unwrap(), "\"classification\"");
    }

    #[test]
    fn test_is_detection() {
        assert!(!TaskKind::Classification.is_detection());
        assert!(TaskKind::ConstrainedDetection.is_detection());
        assert!(TaskKind::Detection.is_detection());
    }

    #[test]
    fn test_indices_default() {
        let idx: TensorIndices = serde_json::from_str("{}").unwrap();
        assert_eq!(idx, TensorIndices::default());

        let idx: TensorIndices =
            serde_json::from_str(r#"{"output": 0, "score_tensors": {"labels": 3, "scores": 2}}"#).unwrap();
        assert_eq!(idx.score_tensors, Some(ScoreTensorIndices { labels: 3, scores: 2 }));
    }
}
