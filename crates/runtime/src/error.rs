// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the inference pipeline.
//!
//! Every failure the pipeline can report maps onto one [`StatusCode`], the
//! flat status surface applications switch on.

use memory_manager::ArenaId;
use std::fmt;
use tensor_core::DType;

/// Outcome of one pipeline call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 0,
    ArenaAllocFailed = 1,
    EngineError = 2,
    Canceled = 3,
    DspError = 4,
    UnsupportedPath = 5,
}

impl StatusCode {
    /// Returns the numeric status value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns the conventional upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::ArenaAllocFailed => "ARENA_ALLOC_FAILED",
            StatusCode::EngineError => "ENGINE_ERROR",
            StatusCode::Canceled => "CANCELED",
            StatusCode::DspError => "DSP_ERROR",
            StatusCode::UnsupportedPath => "UNSUPPORTED_PATH",
        }
    }

    /// Status of a pipeline call result.
    pub fn of<T>(result: &Result<T, RuntimeError>) -> Self {
        match result {
            Ok(_) => StatusCode::Ok,
            Err(e) => e.code(),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by an [`InferenceEngine`](crate::InferenceEngine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `invoke` was called before `init`.
    #[error("engine '{0}' has not been initialised")]
    NotInitialised(String),

    /// The arena cannot hold the model's tensors.
    #[error("arena of {actual} bytes is smaller than the {required} bytes the model needs")]
    ArenaTooSmall { required: usize, actual: usize },

    /// No tensor exists at a configured index.
    #[error("model has no {kind} tensor at index {index}")]
    MissingTensor { kind: &'static str, index: usize },

    /// A detection model produced no post-processing output.
    #[error("engine exposes no detection post-processing buffers")]
    MissingPostProcess,

    /// The engine cannot run this kind of model.
    #[error("unsupported model: {0}")]
    Unsupported(String),

    /// A kernel failed during the forward pass.
    #[error("kernel error: {0}")]
    Kernel(#[from] tensor_core::TensorError),

    /// A tensor region fell outside the arena.
    #[error("arena access: {0}")]
    Arena(#[from] memory_manager::MemoryError),

    /// Any other engine failure.
    #[error("{0}")]
    Failed(String),
}

/// Errors raised by the feature-extraction collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DspError {
    /// The signal does not hold the samples the extractor needs.
    #[error("signal has {actual} samples, {expected} required")]
    SignalLength { expected: usize, actual: usize },

    /// Reading from the signal failed.
    #[error("signal read at offset {offset} failed: {detail}")]
    SignalRead { offset: usize, detail: String },

    /// Writing into the input tensor failed.
    #[error("tensor write failed: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// An extractor-specific failure code.
    #[error("feature extraction failed (code {0})")]
    Failed(i32),
}

/// Errors that can occur during a pipeline call.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Arena acquisition or arena access failed.
    #[error("memory error: {0}")]
    MemoryError(#[from] memory_manager::MemoryError),

    /// The inference engine failed.
    #[error("engine error: {0}")]
    EngineError(#[from] EngineError),

    /// A tensor view could not be formed over arena memory.
    #[error("tensor error: {0}")]
    TensorError(#[from] tensor_core::TensorError),

    /// A tensor handle was used with an arena it was not resolved against.
    #[error("tensor handle belongs to {handle}, not {arena}")]
    ForeignArena { handle: ArenaId, arena: ArenaId },

    /// The cancellation flag was set.
    #[error("inference canceled")]
    Canceled,

    /// Feature extraction failed.
    #[error("DSP error: {0}")]
    DspError(#[from] DspError),

    /// The feature vector does not fill the input tensor exactly.
    #[error("expected {expected} features, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    /// The quantized image path needs an int8 input tensor.
    #[error("quantized image path requires an int8 input tensor, model input is {dtype}")]
    UnsupportedPath { dtype: DType },

    /// Model loading failed.
    #[error("model error: {0}")]
    ModelError(#[from] model_meta::ModelError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl RuntimeError {
    /// Maps this error onto the pipeline status codes.
    ///
    /// Configuration and model loading happen before any pipeline call and
    /// report as engine errors.
    pub fn code(&self) -> StatusCode {
        match self {
            RuntimeError::MemoryError(e) if e.is_alloc_failure() => StatusCode::ArenaAllocFailed,
            RuntimeError::Canceled => StatusCode::Canceled,
            RuntimeError::DspError(_) | RuntimeError::FeatureShape { .. } => StatusCode::DspError,
            RuntimeError::UnsupportedPath { .. } => StatusCode::UnsupportedPath,
            RuntimeError::MemoryError(_)
            | RuntimeError::EngineError(_)
            | RuntimeError::TensorError(_)
            | RuntimeError::ForeignArena { .. }
            | RuntimeError::ModelError(_)
            | RuntimeError::ConfigError(_) => StatusCode::EngineError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_manager::MemoryError;

    #[test]
    fn test_status_values() {
        assert_eq!(StatusCode::Ok.as_i32(), 0);
        assert_eq!(StatusCode::UnsupportedPath.as_i32(), 5);
        assert_eq!(StatusCode::Canceled.to_string(), "CANCELED");
    }

    #[test]
    fn test_error_codes() {
        let alloc = RuntimeError::from(MemoryError::ArenaAllocFailed {
            requested_bytes: 10,
            available_bytes: 0,
            budget_bytes: 0,
        });
        assert_eq!(alloc.code(), StatusCode::ArenaAllocFailed);

        let region = RuntimeError::from(MemoryError::RegionOutOfBounds {
            offset: 4,
            len: 4,
            arena_bytes: 6,
        });
        assert_eq!(region.code(), StatusCode::EngineError);

        assert_eq!(
            RuntimeError::FeatureShape { expected: 4, actual: 3 }.code(),
            StatusCode::DspError
        );
        assert_eq!(
            RuntimeError::from(DspError::Failed(-1002)).code(),
            StatusCode::DspError
        );
        assert_eq!(
            RuntimeError::UnsupportedPath { dtype: DType::F32 }.code(),
            StatusCode::UnsupportedPath
        );
        assert_eq!(
            RuntimeError::from(EngineError::Failed("boom".into())).code(),
            StatusCode::EngineError
        );
    }

    #[test]
    fn test_status_of() {
        let ok: Result<(), RuntimeError> = Ok(());
        assert_eq!(StatusCode::of(&ok), StatusCode::Ok);
        let canceled: Result<(), RuntimeError> = Err(RuntimeError::Canceled);
        assert_eq!(StatusCode::of(&canceled), StatusCode::Canceled);
    }
}
