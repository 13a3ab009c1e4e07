// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `edge-nn run` command: classify one feature frame.
//!
//! ```text
//! features → Pipeline::run (or run_image_quantized) → InferenceResult + StatusCode
//! ```

use runtime::{
    InferenceResult, Pipeline, PipelineConfig, RawQuantizedExtractor, SliceSignal, StatusCode,
};
use std::io::Read;
use std::path::PathBuf;

pub struct RunOptions {
    pub features: Option<PathBuf>,
    pub image_quantized: bool,
    pub json: bool,
}

/// Runs one inference and returns the status the process should exit with.
pub fn execute(config: &PipelineConfig, options: &RunOptions) -> anyhow::Result<StatusCode> {
    let mut pipeline = Pipeline::from_config(config).map_err(|e| {
        anyhow::anyhow!(
            "failed to load model from '{}': {e}",
            config.model_path.display()
        )
    })?;

    let text = match &options.features {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read '{}': {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let features = super::parse_features(&text)?;
    tracing::info!(
        "{} features for '{}' (frame size {})",
        features.len(),
        pipeline.manifest().name,
        pipeline.manifest().frame_size()
    );

    let mut result = InferenceResult::new();
    let outcome = if options.image_quantized {
        let signal = SliceSignal::new(&features);
        pipeline.run_image_quantized(&signal, &mut RawQuantizedExtractor::new(), &mut result)
    } else {
        pipeline.run(&features, &mut result)
    };
    let status = StatusCode::of(&outcome);

    if let Err(e) = &outcome {
        eprintln!("error: {e}");
    }
    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Status: {status} ({})", status.as_i32());
        if outcome.is_ok() {
            println!("{}", result.summary());
        }
    }
    tracing::debug!("arena: {}", pipeline.arena_manager().stats().summary());

    Ok(status)
}
