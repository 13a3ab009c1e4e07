// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax activation operation.

/// Computes softmax in place over `values`:
/// `x[i] = exp(x[i] - max) / sum(exp(x - max))`.
///
/// Subtracting the maximum first keeps `exp` from overflowing. An empty
/// slice is left untouched.
pub fn softmax(values: &mut [f32]) {
    if values.is_empty() {
        return;
    }

    let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for v in values.iter_mut() {
        *v = (*v - max_val).exp();
        sum += *v;
    }

    if sum > 0.0 {
        let inv_sum = 1.0 / sum;
        values.iter_mut().for_each(|v| *v *= inv_sum);
    }
}
