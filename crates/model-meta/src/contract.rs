// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Quantization contract between the build-time configuration and the
//! compiled model.
//!
//! The model build step records the dtype and quantization parameters it
//! compiled each tensor with. At runtime the engine reports what the model
//! actually contains; the two must agree exactly or every encoded input and
//! decoded output would be silently wrong.

use std::fmt;
use tensor_core::{DType, QuantParams, TensorSpec};

/// Which bound tensor a check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorRole {
    Input,
    Output,
    Labels,
    Scores,
}

impl fmt::Display for TensorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TensorRole::Input => "input",
            TensorRole::Output => "output",
            TensorRole::Labels => "labels",
            TensorRole::Scores => "scores",
        };
        f.write_str(s)
    }
}

/// What one tensor must look like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorExpectation {
    pub dtype: DType,
    /// Compared only for quantized dtypes.
    pub quant: Option<QuantParams>,
}

impl TensorExpectation {
    /// Captures the dtype and quantization of a configured tensor.
    pub fn from_spec(spec: &TensorSpec) -> Self {
        Self {
            dtype: spec.dtype,
            quant: spec.quant,
        }
    }

    /// Compares an engine-reported tensor against this expectation.
    pub fn check(&self, role: TensorRole, actual: &TensorSpec) -> Result<(), ContractViolation> {
        self.check_dtype(role, actual)?;
        if !self.dtype.is_quantized() {
            return Ok(());
        }

        let expected = self.quant.unwrap_or_default();
        let reported = actual.quant_or_identity();
        if reported.scale != expected.scale {
            return Err(ContractViolation {
                role,
                field: "scale",
                expected: expected.scale.to_string(),
                actual: reported.scale.to_string(),
            });
        }
        if reported.zero_point != expected.zero_point {
            return Err(ContractViolation {
                role,
                field: "zero_point",
                expected: expected.zero_point.to_string(),
                actual: reported.zero_point.to_string(),
            });
        }
        Ok(())
    }

    /// Compares only the element type.
    pub fn check_dtype(&self, role: TensorRole, actual: &TensorSpec) -> Result<(), ContractViolation> {
        if actual.dtype != self.dtype {
            return Err(ContractViolation {
                role,
                field: "dtype",
                expected: self.dtype.to_string(),
                actual: actual.dtype.to_string(),
            });
        }
        Ok(())
    }
}

/// The configured dtypes and quantization parameters of the model's
/// input and output.
///
/// Label and score tensors of detection models must share the output's
/// dtype; their quantization parameters are not compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationContract {
    pub input: TensorExpectation,
    pub output: TensorExpectation,
}

impl QuantizationContract {
    /// Checks a tensor reported by the engine in the given role.
    pub fn check(&self, role: TensorRole, actual: &TensorSpec) -> Result<(), ContractViolation> {
        match role {
            TensorRole::Input => self.input.check(role, actual),
            TensorRole::Output => self.output.check(role, actual),
            TensorRole::Labels | TensorRole::Scores => self.output.check_dtype(role, actual),
        }
    }
}

/// A compiled tensor that disagrees with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    pub role: TensorRole,
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tensor {} mismatch: configured {}, compiled model has {}",
            self.role, self.field, self.expected, self.actual
        )
    }
}

impl std::error::Error for ContractViolation {}
