// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensor descriptors and element access for quantization-aware inference on
//! microcontroller-class devices.
//!
//! This crate provides:
//! - [`DType`]: the element types a compiled model exposes (f32, i8, u8).
//! - [`QuantParams`]: affine quantization (`real = (q - zero_point) * scale`).
//! - [`Shape`]: runtime shape descriptors.
//! - [`TensorSpec`]: dtype + shape + quantization of one model tensor.
//! - [`TensorView`] / [`TensorViewMut`]: typed, bounds-checked views over a
//!   tensor's bytes inside an arena.
//! - `matmul` and `softmax`, used by the reference engine.
//!
//! # Design Goals
//! - Views never own memory; the arena does.
//! - No `unsafe`: element access goes through native-endian byte conversion,
//!   so arena buffers need no particular alignment.
//! - Clean error types via `thiserror`.

mod dtype;
mod error;
mod ops;
mod quant;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use ops::{matmul, softmax};
pub use quant::QuantParams;
pub use shape::Shape;
pub use tensor::{TensorSpec, TensorView, TensorViewMut};
