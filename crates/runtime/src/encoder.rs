// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Input encoding: float features into the input tensor's native type.

use crate::RuntimeError;
use tensor_core::{DType, TensorViewMut};

/// Writes `features` into `input`.
///
/// - float32: copied unchanged.
/// - int8 / uint8: `round(v / scale) + zero_point`, clamped to the integer
///   range, using the tensor's own quantization parameters.
///
/// The branch is chosen by the tensor's declared dtype alone.
pub fn encode(features: &[f32], input: &mut TensorViewMut<'_>) -> Result<(), RuntimeError> {
    if features.len() != input.len() {
        return Err(RuntimeError::FeatureShape {
            expected: input.len(),
            actual: features.len(),
        });
    }

    let dtype = input.dtype();
    let quant = input.spec().quant_or_identity();
    let bytes = input.as_bytes_mut();

    match dtype {
        DType::F32 => {
            for (dst, &v) in bytes.chunks_exact_mut(4).zip(features) {
                dst.copy_from_slice(&v.to_ne_bytes());
            }
        }
        DType::I8 => {
            for (dst, &v) in bytes.iter_mut().zip(features) {
                *dst = quant.quantize_i8(v) as u8;
            }
        }
        DType::U8 => {
            for (dst, &v) in bytes.iter_mut().zip(features) {
                *dst = quant.quantize_u8(v);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{QuantParams, Shape, TensorSpec};

    #[test]
    fn test_float_copy() {
        let spec = TensorSpec::float(Shape::matrix(1, 4));
        let mut data = vec![0u8; 16];
        let mut view = TensorViewMut::new(&spec, &mut data).unwrap();
        encode(&[0.1, 0.2, 0.3, 0.4], &mut view).unwrap();
        assert_eq!(view.as_view().to_real_vec(), vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_int8_quantize() {
        let spec = TensorSpec::quantized(DType::I8, Shape::matrix(1, 4), QuantParams::new(0.0078, -1));
        let mut data = vec![0u8; 4];
        let mut view = TensorViewMut::new(&spec, &mut data).unwrap();
        encode(&[0.1, 0.2, 0.3, 0.4], &mut view).unwrap();

        let raw: Vec<i32> = (0..4).map(|i| view.as_view().raw_at(i).unwrap()).collect();
        assert_eq!(raw, vec![12, 25, 37, 50]);
    }

    #[test]
    fn test_int8_clamps() {
        let spec = TensorSpec::quantized(DType::I8, Shape::vector(2), QuantParams::new(0.0078, -1));
        let mut data = vec![0u8; 2];
        let mut view = TensorViewMut::new(&spec, &mut data).unwrap();
        encode(&[10.0, -10.0], &mut view).unwrap();
        assert_eq!(view.as_view().raw_at(0).unwrap(), 127);
        assert_eq!(view.as_view().raw_at(1).unwrap(), -128);
    }

    #[test]
    fn test_uint8_quantize() {
        let spec = TensorSpec::quantized(DType::U8, Shape::vector(3), QuantParams::new(0.5, 0));
        let mut data = vec![0u8; 3];
        let mut view = TensorViewMut::new(&spec, &mut data).unwrap();
        encode(&[0.0, 1.2, 200.0], &mut view).unwrap();
        assert_eq!(data, vec![0, 2, 255]);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let spec = TensorSpec::float(Shape::vector(4));
        let mut data = vec![0u8; 16];
        let mut view = TensorViewMut::new(&spec, &mut data).unwrap();
        assert!(matches!(
            encode(&[1.0, 2.0, 3.0], &mut view),
            Err(RuntimeError::FeatureShape { expected: 4, actual: 3 })
        ));
    }

    mod arena_prop {
        use super::*;
        use crate::decoder::{decode, DecodeContext};
        use crate::InferenceResult;
        use memory_manager::{ArenaManager, MemoryBudget};
        use model_meta::TaskKind;
        use proptest::prelude::*;
        use tensor_core::TensorView;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            #[test]
            fn prop_int8_encode_then_decode_in_arena(
                scale in 0.001f32..0.1,
                zero_point in -20i32..=20,
                t in proptest::collection::vec(0.0f32..=1.0, 1..16),
            ) {
                let q = QuantParams::new(scale, zero_point);
                let (lo, hi) = q.representable_range(DType::I8).unwrap();
                let features: Vec<f32> = t.iter().map(|t| lo + (hi - lo) * t).collect();
                let spec = TensorSpec::quantized(DType::I8, Shape::matrix(1, features.len()), q);

                let manager = ArenaManager::new(MemoryBudget::from_kb(1));
                let mut arena = manager.acquire(64).unwrap();
                let region = arena.region_mut(16, spec.size_bytes()).unwrap();
                encode(&features, &mut TensorViewMut::new(&spec, region).unwrap()).unwrap();

                let labels: Vec<String> = (0..features.len()).map(|i| format!("f{i}")).collect();
                let ctx = DecodeContext {
                    task: TaskKind::Classification,
                    labels: &labels,
                    threshold: 0.5,
                };
                let view = TensorView::new(&spec, arena.region(16, spec.size_bytes()).unwrap()).unwrap();
                let mut result = InferenceResult::new();
                decode(&ctx, &view, None, &mut result).unwrap();

                prop_assert_eq!(result.classification.len(), features.len());
                for (score, v) in result.classification.iter().zip(&features) {
                    prop_assert!((score.value - v).abs() <= scale * 0.5 + 1e-5,
                        "v={} decoded={} scale={}", v, score.value, scale);
                }
            }
        }
    }
}
