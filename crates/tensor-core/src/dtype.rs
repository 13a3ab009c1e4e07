// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

use std::fmt;

/// Enumerates the numeric types a compiled model tensor can declare.
///
/// The pipeline selects its encode/decode branch from this value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    #[serde(rename = "float32", alias = "f32")]
    F32,
    /// 8-bit signed integer, affine quantized.
    #[serde(rename = "int8", alias = "i8")]
    I8,
    /// 8-bit unsigned integer, affine quantized.
    #[serde(rename = "uint8", alias = "u8")]
    U8,
}

impl DType {
    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::F32 => 4,
            DType::I8 | DType::U8 => 1,
        }
    }

    /// Returns `true` for the fixed-point types.
    pub fn is_quantized(self) -> bool {
        matches!(self, DType::I8 | DType::U8)
    }

    /// Inclusive integer range of a quantized type, `None` for floats.
    pub fn int_range(self) -> Option<(i32, i32)> {
        match self {
            DType::F32 => None,
            DType::I8 => Some((i8::MIN as i32, i8::MAX as i32)),
            DType::U8 => Some((u8::MIN as i32, u8::MAX as i32)),
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::F32 => "float32",
            DType::I8 => "int8",
            DType::U8 => "uint8",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
