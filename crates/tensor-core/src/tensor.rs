// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor descriptors and borrowed views over arena memory.
//!
//! The engine owns tensor memory (inside the arena); the pipeline only ever
//! borrows it. A [`TensorView`] / [`TensorViewMut`] pairs a [`TensorSpec`]
//! with a byte slice and is therefore tied to the lifetime of that slice by
//! the borrow checker.

use crate::{DType, QuantParams, Shape, TensorError};

/// Static description of one model tensor: element type, shape and, for
/// fixed-point tensors, the affine quantization parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorSpec {
    /// Declared element type.
    pub dtype: DType,
    /// Tensor shape.
    pub shape: Shape,
    /// Quantization parameters (absent for float tensors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quant: Option<QuantParams>,
}

impl TensorSpec {
    /// A float32 tensor.
    pub fn float(shape: Shape) -> Self {
        Self {
            dtype: DType::F32,
            shape,
            quant: None,
        }
    }

    /// A quantized tensor of the given integer type.
    pub fn quantized(dtype: DType, shape: Shape, quant: QuantParams) -> Self {
        Self {
            dtype,
            shape,
            quant: Some(quant),
        }
    }

    /// Number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Size of the tensor's buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.shape.size_bytes(self.dtype)
    }

    /// Quantization parameters, or identity parameters if none are declared.
    pub fn quant_or_identity(&self) -> QuantParams {
        self.quant.unwrap_or_default()
    }
}

/// A borrowed, read-only view over a tensor's bytes.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    spec: &'a TensorSpec,
    data: &'a [u8],
}

impl<'a> TensorView<'a> {
    /// Creates a view, checking that `data` is exactly the tensor's size.
    pub fn new(spec: &'a TensorSpec, data: &'a [u8]) -> Result<Self, TensorError> {
        check_len(spec, data.len())?;
        Ok(Self { spec, data })
    }

    /// Returns the tensor description.
    pub fn spec(&self) -> &'a TensorSpec {
        self.spec
    }

    /// Returns the declared element type.
    pub fn dtype(&self) -> DType {
        self.spec.dtype
    }

    /// Returns the tensor shape.
    pub fn shape(&self) -> &'a Shape {
        &self.spec.shape
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.spec.num_elements()
    }

    /// Returns `true` for a zero-element tensor.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Reads element `index` of a float32 tensor.
    pub fn f32_at(&self, index: usize) -> Result<f32, TensorError> {
        expect_dtype(self.spec, DType::F32, "f32_at")?;
        read_f32(self.data, index, self.len())
    }

    /// Reads element `index` as its raw stored integer (int8 / uint8 only).
    pub fn raw_at(&self, index: usize) -> Result<i32, TensorError> {
        if index >= self.len() {
            return Err(TensorError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        match self.spec.dtype {
            DType::I8 => Ok(self.data[index] as i8 as i32),
            DType::U8 => Ok(self.data[index] as i32),
            DType::F32 => Err(TensorError::UnsupportedDType {
                op: "raw_at",
                dtype: DType::F32,
            }),
        }
    }

    /// Reads element `index` as a real value, dequantizing fixed-point
    /// tensors with the tensor's own parameters.
    pub fn real_at(&self, index: usize) -> Result<f32, TensorError> {
        match self.spec.dtype {
            DType::F32 => read_f32(self.data, index, self.len()),
            DType::I8 | DType::U8 => {
                let raw = self.raw_at(index)?;
                Ok(self.spec.quant_or_identity().dequantize(raw))
            }
        }
    }

    /// Copies the whole tensor out as real values.
    pub fn to_real_vec(&self) -> Vec<f32> {
        (0..self.len())
            .map(|i| self.real_at(i).unwrap_or_default())
            .collect()
    }
}

/// A borrowed, writable view over a tensor's bytes.
#[derive(Debug)]
pub struct TensorViewMut<'a> {
    spec: &'a TensorSpec,
    data: &'a mut [u8],
}

impl<'a> TensorViewMut<'a> {
    /// Creates a mutable view, checking that `data` is exactly the tensor's size.
    pub fn new(spec: &'a TensorSpec, data: &'a mut [u8]) -> Result<Self, TensorError> {
        check_len(spec, data.len())?;
        Ok(Self { spec, data })
    }

    /// Returns the tensor description.
    pub fn spec(&self) -> &'a TensorSpec {
        self.spec
    }

    /// Returns the declared element type.
    pub fn dtype(&self) -> DType {
        self.spec.dtype
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.spec.num_elements()
    }

    /// Returns `true` for a zero-element tensor.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reborrows as a read-only view.
    pub fn as_view(&self) -> TensorView<'_> {
        TensorView {
            spec: self.spec,
            data: &*self.data,
        }
    }

    /// Returns the raw bytes for writing.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Writes element `index` of a float32 tensor.
    pub fn set_f32(&mut self, index: usize, value: f32) -> Result<(), TensorError> {
        expect_dtype(self.spec, DType::F32, "set_f32")?;
        let len = self.len();
        let bytes = slot_mut(self.data, index, len, 4)?;
        bytes.copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    /// Writes element `index` of an int8 tensor.
    pub fn set_i8(&mut self, index: usize, value: i8) -> Result<(), TensorError> {
        expect_dtype(self.spec, DType::I8, "set_i8")?;
        let len = self.len();
        slot_mut(self.data, index, len, 1)?[0] = value as u8;
        Ok(())
    }

    /// Writes element `index` of a uint8 tensor.
    pub fn set_u8(&mut self, index: usize, value: u8) -> Result<(), TensorError> {
        expect_dtype(self.spec, DType::U8, "set_u8")?;
        let len = self.len();
        slot_mut(self.data, index, len, 1)?[0] = value;
        Ok(())
    }

    /// Writes a real value into element `index`, quantizing with the
    /// tensor's own parameters when the tensor is fixed-point.
    pub fn set_real(&mut self, index: usize, value: f32) -> Result<(), TensorError> {
        match self.spec.dtype {
            DType::F32 => self.set_f32(index, value),
            DType::I8 => {
                let q = self.spec.quant_or_identity().quantize_i8(value);
                self.set_i8(index, q)
            }
            DType::U8 => {
                let q = self.spec.quant_or_identity().quantize_u8(value);
                self.set_u8(index, q)
            }
        }
    }
}

fn check_len(spec: &TensorSpec, actual: usize) -> Result<(), TensorError> {
    let expected = spec.size_bytes();
    if actual != expected {
        return Err(TensorError::BufferSizeMismatch { expected, actual });
    }
    Ok(())
}

fn expect_dtype(spec: &TensorSpec, want: DType, op: &'static str) -> Result<(), TensorError> {
    if spec.dtype != want {
        return Err(TensorError::UnsupportedDType {
            op,
            dtype: spec.dtype,
        });
    }
    Ok(())
}

fn read_f32(data: &[u8], index: usize, len: usize) -> Result<f32, TensorError> {
    if index >= len {
        return Err(TensorError::IndexOutOfBounds { index, len });
    }
    let start = index * 4;
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[start..start + 4]);
    Ok(f32::from_ne_bytes(word))
}

fn slot_mut(
    data: &mut [u8],
    index: usize,
    len: usize,
    width: usize,
) -> Result<&mut [u8], TensorError> {
    if index >= len {
        return Err(TensorError::IndexOutOfBounds { index, len });
    }
    let start = index * width;
    Ok(&mut data[start..start + width])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_sizes() {
        let f = TensorSpec::float(Shape::matrix(1, 4));
        assert_eq!(f.size_bytes(), 16);
        let q = TensorSpec::quantized(DType::I8, Shape::matrix(1, 4), QuantParams::new(0.5, 0));
        assert_eq!(q.size_bytes(), 4);
    }

    #[test]
    fn test_view_rejects_wrong_length() {
        let spec = TensorSpec::float(Shape::vector(2));
        let data = [0u8; 7];
        assert!(matches!(
            TensorView::new(&spec, &data),
            Err(TensorError::BufferSizeMismatch { expected: 8, actual: 7 })
        ));
    }

    #[test]
    fn test_f32_write_read() {
        let spec = TensorSpec::float(Shape::vector(3));
        let mut data = vec![0u8; 12];
        {
            let mut v = TensorViewMut::new(&spec, &mut data).unwrap();
            v.set_f32(0, 0.5).unwrap();
            v.set_real(2, -1.25).unwrap();
        }
        let v = TensorView::new(&spec, &data).unwrap();
        assert_eq!(v.f32_at(0).unwrap(), 0.5);
        assert_eq!(v.f32_at(1).unwrap(), 0.0);
        assert_eq!(v.real_at(2).unwrap(), -1.25);
        assert_eq!(v.to_real_vec(), vec![0.5, 0.0, -1.25]);
    }

    #[test]
    fn test_i8_quantizes_with_own_params() {
        let spec = TensorSpec::quantized(DType::I8, Shape::vector(2), QuantParams::new(0.0078, -1));
        let mut data = vec![0u8; 2];
        let mut v = TensorViewMut::new(&spec, &mut data).unwrap();
        v.set_real(0, 0.1).unwrap();
        v.set_real(1, -5.0).unwrap();
        let view = v.as_view();
        assert_eq!(view.raw_at(0).unwrap(), 12);
        assert_eq!(view.raw_at(1).unwrap(), -128);
    }

    #[test]
    fn test_u8_dequantize() {
        let spec = TensorSpec::quantized(DType::U8, Shape::vector(2), QuantParams::new(0.5, 10));
        let data = [12u8, 10u8];
        let v = TensorView::new(&spec, &data).unwrap();
        assert_eq!(v.raw_at(0).unwrap(), 12);
        assert_eq!(v.real_at(0).unwrap(), 1.0);
        assert_eq!(v.real_at(1).unwrap(), 0.0);
    }

    #[test]
    fn test_dtype_guard() {
        let spec = TensorSpec::quantized(DType::I8, Shape::vector(1), QuantParams::identity());
        let mut data = vec![0u8; 1];
        let mut v = TensorViewMut::new(&spec, &mut data).unwrap();
        assert!(matches!(
            v.set_f32(0, 1.0),
            Err(TensorError::UnsupportedDType { op: "set_f32", .. })
        ));
        assert!(v.as_view().f32_at(0).is_err());
    }

    #[test]
    fn test_index_out_of_bounds() {
        let spec = TensorSpec::float(Shape::vector(1));
        let data = [0u8; 4];
        let v = TensorView::new(&spec, &data).unwrap();
        assert!(matches!(
            v.real_at(1),
            Err(TensorError::IndexOutOfBounds { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_spec_serde() {
        let json = r#"{"dtype":"int8","shape":[1,4],"quant":{"scale":0.0039,"zero_point":-128}}"#;
        let spec: TensorSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.dtype, DType::I8);
        assert_eq!(spec.shape, Shape::matrix(1, 4));
        assert_eq!(spec.quant, Some(QuantParams::new(0.0039, -128)));

        let float: TensorSpec = serde_json::from_str(r#"{"dtype":"float32","shape":[4]}"#).unwrap();
        assert!(float.quant.is_none());
    }
}
