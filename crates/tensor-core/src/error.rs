// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

use crate::{DType, Shape};

/// Errors that can occur while viewing or computing on tensors.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer size does not match the size implied by shape and dtype.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Two operands have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// The tensor's data type is not the one the accessor expects.
    #[error("unsupported dtype {dtype} for {op}")]
    UnsupportedDType { op: &'static str, dtype: DType },

    /// Element index past the end of the tensor.
    #[error("element index {index} out of bounds for tensor of {len} elements")]
    IndexOutOfBounds { index: usize, len: usize },
}
