// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Affine (scale / zero-point) quantization.
//!
//! A quantized tensor stores integers `q` that map to reals as
//! `real = (q - zero_point) * scale`. Encoding is the inverse,
//! `q = round(real / scale) + zero_point`, saturated to the integer range
//! of the target [`DType`].

use crate::DType;

/// Quantization parameters attached to an int8 / uint8 tensor.
///
/// # Examples
/// ```
/// use tensor_core::{DType, QuantParams};
///
/// let q = QuantParams::new(0.0078, -1);
/// assert_eq!(q.quantize_i8(0.1), 12);
///
/// let out = QuantParams::new(0.0039, 0);
/// assert!((out.dequantize(127) - 0.4953).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuantParams {
    /// Real-valued size of one integer step.
    pub scale: f32,
    /// Integer that represents real zero.
    pub zero_point: i32,
}

impl QuantParams {
    /// Creates quantization parameters.
    pub fn new(scale: f32, zero_point: i32) -> Self {
        Self { scale, zero_point }
    }

    /// Parameters that leave integer values unchanged (`scale = 1`, `zero_point = 0`).
    pub fn identity() -> Self {
        Self::new(1.0, 0)
    }

    /// Quantizes `value` for `dtype`, saturating at the type's bounds.
    ///
    /// For [`DType::F32`] there is no integer range; the unclamped rounded
    /// value is returned.
    pub fn quantize(&self, value: f32, dtype: DType) -> i32 {
        let q = (value / self.scale).round() + self.zero_point as f32;
        match dtype.int_range() {
            Some((lo, hi)) => q.clamp(lo as f32, hi as f32) as i32,
            None => q as i32,
        }
    }

    /// Quantizes `value` into a signed byte.
    pub fn quantize_i8(&self, value: f32) -> i8 {
        self.quantize(value, DType::I8) as i8
    }

    /// Quantizes `value` into an unsigned byte.
    pub fn quantize_u8(&self, value: f32) -> u8 {
        self.quantize(value, DType::U8) as u8
    }

    /// Maps a stored integer back to its real value.
    pub fn dequantize(&self, raw: i32) -> f32 {
        (raw - self.zero_point) as f32 * self.scale
    }

    /// The real interval representable by `dtype` under these parameters.
    pub fn representable_range(&self, dtype: DType) -> Option<(f32, f32)> {
        dtype
            .int_range()
            .map(|(lo, hi)| (self.dequantize(lo), self.dequantize(hi)))
    }
}

impl Default for QuantParams {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_i8_reference_values() {
        let q = QuantParams::new(0.0078, -1);
        // round(v / 0.0078) - 1
        assert_eq!(q.quantize_i8(0.1), 12);
        assert_eq!(q.quantize_i8(0.2), 25);
        assert_eq!(q.quantize_i8(0.3), 37);
        assert_eq!(q.quantize_i8(0.4), 50);
    }

    #[test]
    fn test_quantize_saturates() {
        let q = QuantParams::new(0.0078, -1);
        assert_eq!(q.quantize_i8(10.0), 127);
        assert_eq!(q.quantize_i8(-10.0), -128);

        let u = QuantParams::new(1.0 / 255.0, 0);
        assert_eq!(u.quantize_u8(2.0), 255);
        assert_eq!(u.quantize_u8(-1.0), 0);
    }

    #[test]
    fn test_dequantize() {
        let q = QuantParams::new(0.0039, 0);
        assert!((q.dequantize(127) - 0.4953).abs() < 1e-6);
        assert_eq!(q.dequantize(0), 0.0);

        let shifted = QuantParams::new(0.5, -128);
        assert_eq!(shifted.dequantize(-128), 0.0);
        assert_eq!(shifted.dequantize(-126), 1.0);
    }

    #[test]
    fn test_identity() {
        let q = QuantParams::identity();
        assert_eq!(q.quantize_i8(5.0), 5);
        assert_eq!(q.dequantize(-7), -7.0);
    }

    #[test]
    fn test_representable_range() {
        let q = QuantParams::new(0.5, 0);
        assert_eq!(q.representable_range(DType::I8), Some((-64.0, 63.5)));
        assert_eq!(q.representable_range(DType::F32), None);
    }

    mod roundtrip_prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn prop_i8_roundtrip_within_one_step(
                scale in 0.0005f32..0.5,
                zero_point in -128i32..=127,
                t in 0.0f32..=1.0,
            ) {
                let q = QuantParams::new(scale, zero_point);
                let (lo, hi) = q.representable_range(DType::I8).unwrap();
                let v = lo + (hi - lo) * t;
                let back = q.dequantize(q.quantize_i8(v) as i32);
                prop_assert!((back - v).abs() <= scale, "v={v} back={back} scale={scale}");
            }

            #[test]
            fn prop_u8_roundtrip_within_one_step(
                scale in 0.0005f32..0.5,
                zero_point in 0i32..=255,
                t in 0.0f32..=1.0,
            ) {
                let q = QuantParams::new(scale, zero_point);
                let (lo, hi) = q.representable_range(DType::U8).unwrap();
                let v = lo + (hi - lo) * t;
                let back = q.dequantize(q.quantize_u8(v) as i32);
                prop_assert!((back - v).abs() <= scale, "v={v} back={back} scale={scale}");
            }
        }
    }
}
