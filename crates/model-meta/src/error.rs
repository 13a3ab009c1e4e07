// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model metadata and weight loading.

/// Errors that can occur when reading a model description.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The manifest file could not be read.
    #[error("failed to read manifest: {0}")]
    ManifestReadError(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// The manifest parsed but is internally inconsistent.
    #[error("invalid manifest field '{field}': {detail}")]
    InvalidManifest { field: &'static str, detail: String },

    /// A weight tensor was not found in the SafeTensors file.
    #[error("weight tensor not found: {name}")]
    WeightNotFound { name: String },

    /// The SafeTensors file could not be opened or parsed.
    #[error("failed to load SafeTensors: {0}")]
    SafeTensorsError(String),
}
