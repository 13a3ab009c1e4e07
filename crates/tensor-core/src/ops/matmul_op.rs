// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Matrix multiplication operation.

use crate::{Shape, TensorError};

/// Performs matrix multiplication: `output = lhs @ rhs`.
///
/// `lhs` is `[M, K]`, `rhs` is `[K, N]` and `output` must hold `M * N`
/// values, all in row-major order.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if dimensions are incompatible and
/// [`TensorError::BufferSizeMismatch`] if a slice disagrees with its shape.
pub fn matmul(
    lhs: &[f32],
    lhs_shape: &Shape,
    rhs: &[f32],
    rhs_shape: &Shape,
    output: &mut [f32],
) -> Result<(), TensorError> {
    let (m, k) = as_matrix(lhs_shape, "matmul (lhs)")?;
    let (k2, n) = as_matrix(rhs_shape, "matmul (rhs)")?;
    if k != k2 {
        return Err(TensorError::ShapeMismatch {
            op: "matmul",
            lhs: lhs_shape.clone(),
            rhs: rhs_shape.clone(),
        });
    }
    check_elements(lhs.len(), m * k)?;
    check_elements(rhs.len(), k * n)?;
    check_elements(output.len(), m * n)?;

    output.iter_mut().for_each(|x| *x = 0.0);

    // ikj order keeps the inner loop sequential over a row of `output`.
    for i in 0..m {
        for p in 0..k {
            let a_ip = lhs[i * k + p];
            let c_row = &mut output[i * n..(i + 1) * n];
            let b_row = &rhs[p * n..(p + 1) * n];
            for (c, &b) in c_row.iter_mut().zip(b_row) {
                *c += a_ip * b;
            }
        }
    }

    Ok(())
}

fn as_matrix(shape: &Shape, op: &'static str) -> Result<(usize, usize), TensorError> {
    match shape.dims() {
        [rows, cols] => Ok((*rows, *cols)),
        _ => Err(TensorError::ShapeMismatch {
            op,
            lhs: shape.clone(),
            rhs: Shape::matrix(0, 0),
        }),
    }
}

fn check_elements(actual: usize, expected: usize) -> Result<(), TensorError> {
    if actual != expected {
        return Err(TensorError::BufferSizeMismatch {
            expected: expected * 4,
            actual: actual * 4,
        });
    }
    Ok(())
}
