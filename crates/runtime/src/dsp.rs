// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Feature-extraction collaborators for the quantized image path.
//!
//! On that path the extractor writes quantized features straight into the
//! model's input tensor, so no intermediate float feature buffer exists.

use crate::DspError;
use tensor_core::TensorViewMut;

/// Number of samples pulled from a signal per read.
const READ_CHUNK: usize = 256;

/// A source of raw samples that is read in pieces.
pub trait Signal {
    /// Total number of samples.
    fn total_len(&self) -> usize;

    /// Fills `out` with the samples starting at `offset`.
    fn get_data(&self, offset: usize, out: &mut [f32]) -> Result<(), DspError>;
}

/// A signal over an in-memory slice.
#[derive(Debug, Clone, Copy)]
pub struct SliceSignal<'a> {
    data: &'a [f32],
}

impl<'a> SliceSignal<'a> {
    pub fn new(data: &'a [f32]) -> Self {
        Self { data }
    }
}

impl Signal for SliceSignal<'_> {
    fn total_len(&self) -> usize {
        self.data.len()
    }

    fn get_data(&self, offset: usize, out: &mut [f32]) -> Result<(), DspError> {
        let src = offset
            .checked_add(out.len())
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| DspError::SignalRead {
                offset,
                detail: format!("{} samples past end of {}-sample signal", out.len(), self.data.len()),
            })?;
        out.copy_from_slice(src);
        Ok(())
    }
}

/// Turns a signal into quantized features inside the input tensor.
pub trait QuantizedFeatureExtractor {
    /// Fills every element of `output`, quantizing with its own parameters.
    fn extract_quantized(
        &mut self,
        signal: &dyn Signal,
        output: &mut TensorViewMut<'_>,
    ) -> Result<(), DspError>;
}

/// Treats the signal's samples as features and quantizes them as they are.
#[derive(Debug, Default)]
pub struct RawQuantizedExtractor {
    buffer: Vec<f32>,
}

impl RawQuantizedExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuantizedFeatureExtractor for RawQuantizedExtractor {
    fn extract_quantized(
        &mut self,
        signal: &dyn Signal,
        output: &mut TensorViewMut<'_>,
    ) -> Result<(), DspError> {
        let needed = output.len();
        if signal.total_len() < needed {
            return Err(DspError::SignalLength {
                expected: needed,
                actual: signal.total_len(),
            });
        }

        self.buffer.resize(READ_CHUNK.min(needed), 0.0);
        let mut offset = 0;
        while offset < needed {
            let n = READ_CHUNK.min(needed - offset);
            let chunk = &mut self.buffer[..n];
            signal.get_data(offset, chunk)?;
            for (i, &v) in chunk.iter().enumerate() {
                output.set_real(offset + i, v)?;
            }
            offset += n;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{DType, QuantParams, Shape, TensorSpec};

    #[test]
    fn test_slice_signal_bounds() {
        let data = [1.0, 2.0, 3.0];
        let signal = SliceSignal::new(&data);
        let mut out = [0.0; 2];
        signal.get_data(1, &mut out).unwrap();
        assert_eq!(out, [2.0, 3.0]);
        assert!(matches!(
            signal.get_data(2, &mut out),
            Err(DspError::SignalRead { offset: 2, .. })
        ));
    }

    #[test]
    fn test_raw_extractor_quantizes_in_place() {
        let samples: Vec<f32> = (0..600).map(|i| (i % 3) as f32 * 0.25).collect();
        let signal = SliceSignal::new(&samples);
        let spec = TensorSpec::quantized(DType::I8, Shape::matrix(1, 600), QuantParams::new(1.0 / 256.0, -128));
        let mut data = vec![0u8; 600];
        let mut view = TensorViewMut::new(&spec, &mut data).unwrap();

        RawQuantizedExtractor::new()
            .extract_quantized(&signal, &mut view)
            .unwrap();

        let v = view.as_view();
        assert_eq!(v.raw_at(0).unwrap(), -128);
        assert_eq!(v.raw_at(1).unwrap(), -64);
        assert_eq!(v.raw_at(599).unwrap(), -128 + 128);
    }

    #[test]
    fn test_raw_extractor_short_signal() {
        let samples = [0.0; 3];
        let spec = TensorSpec::quantized(DType::I8, Shape::vector(4), QuantParams::identity());
        let mut data = vec![0u8; 4];
        let mut view = TensorViewMut::new(&spec, &mut data).unwrap();
        assert!(matches!(
            RawQuantizedExtractor::new().extract_quantized(&SliceSignal::new(&samples), &mut view),
            Err(DspError::SignalLength { expected: 4, actual: 3 })
        ));
    }
}
