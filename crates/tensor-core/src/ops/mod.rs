// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Float arithmetic used by the reference engine.
//!
//! Each operation writes into a caller-provided buffer so that engines can
//! keep all intermediates inside their arena.

mod matmul_op;
mod softmax_op;

pub use matmul_op::matmul;
pub use softmax_op::softmax;
