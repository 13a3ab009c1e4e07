// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pipeline configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! model_path = "./models/keywords"
//! arena_budget = "256K"
//! debug = false
//! detection_threshold = 0.6
//! ```

use memory_manager::MemoryBudget;
use std::path::{Path, PathBuf};

/// Configuration for an inference pipeline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    /// Path to the model directory.
    pub model_path: PathBuf,
    /// Ceiling on live arena memory (human-readable, e.g., `"256K"`).
    pub arena_budget: String,
    /// Whether to log predictions and features at `info` level.
    #[serde(default)]
    pub debug: bool,
    /// Overrides the manifest's detection threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_threshold: Option<f32>,
}

impl PipelineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML parse error: {e}"))
        })
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML serialise error: {e}"))
        })
    }

    /// Parses the arena budget string into a [`MemoryBudget`].
    pub fn parse_budget(&self) -> Result<MemoryBudget, super::RuntimeError> {
        MemoryBudget::parse(&self.arena_budget)
            .map_err(|e| super::RuntimeError::ConfigError(format!("invalid budget: {e}")))
    }

    /// Returns the threshold override, checked to lie within `[0, 1]`.
    pub fn threshold_override(&self) -> Result<Option<f32>, super::RuntimeError> {
        match self.detection_threshold {
            Some(t) if !(0.0..=1.0).contains(&t) => Err(super::RuntimeError::ConfigError(
                format!("detection_threshold {t} is outside [0, 1]"),
            )),
            other => Ok(other),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/keywords"),
            arena_budget: "256K".to_string(),
            debug: false,
            detection_threshold: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = PipelineConfig::default();
        assert_eq!(c.arena_budget, "256K");
        assert!(!c.debug);
        assert!(c.detection_threshold.is_none());
    }

    #[test]
    fn test_parse_budget() {
        let c = PipelineConfig {
            arena_budget: "64K".into(),
            ..Default::default()
        };
        assert_eq!(c.parse_budget().unwrap().as_bytes(), 64 * 1024);

        let bad = PipelineConfig {
            arena_budget: "lots".into(),
            ..Default::default()
        };
        assert!(matches!(
            bad.parse_budget(),
            Err(crate::RuntimeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
model_path = "/tmp/model"
arena_budget = "1M"
debug = true
detection_threshold = 0.6
"#;
        let c = PipelineConfig::from_toml(toml).unwrap();
        assert_eq!(c.model_path, PathBuf::from("/tmp/model"));
        assert_eq!(c.arena_budget, "1M");
        assert!(c.debug);
        assert_eq!(c.detection_threshold, Some(0.6));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = PipelineConfig {
            detection_threshold: Some(0.25),
            ..Default::default()
        };
        let back = PipelineConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_threshold_override_range() {
        let c = PipelineConfig {
            detection_threshold: Some(1.5),
            ..Default::default()
        };
        assert!(c.threshold_override().is_err());
        assert_eq!(PipelineConfig::default().threshold_override().unwrap(), None);
    }

    #[test]
    fn test_missing_field() {
        assert!(PipelineConfig::from_toml("debug = true").is_err());
    }
}
