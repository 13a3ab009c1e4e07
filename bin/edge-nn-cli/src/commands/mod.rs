// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

pub mod bench;
pub mod inspect;
pub mod run;

use runtime::PipelineConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, debug)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Filter directive for `-v` repetition. Debug mode prints its prediction
/// lines at `info`, so it never runs below that.
fn default_filter(verbose: u8, debug: bool) -> &'static str {
    match verbose {
        0 if debug => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Builds the pipeline configuration from a TOML file or the CLI flags.
pub fn resolve_config(
    file: Option<&Path>,
    model: PathBuf,
    budget: String,
    debug: bool,
) -> anyhow::Result<PipelineConfig> {
    if let Some(path) = file {
        let mut config = PipelineConfig::from_file(path)?;
        config.debug |= debug;
        return Ok(config);
    }
    Ok(PipelineConfig {
        model_path: model,
        arena_budget: budget,
        debug,
        detection_threshold: None,
    })
}

/// Parses floats separated by commas and/or whitespace.
pub fn parse_features(text: &str) -> anyhow::Result<Vec<f32>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f32>()
                .map_err(|e| anyhow::anyhow!("invalid feature value '{s}': {e}"))
        })
        .collect()
}
