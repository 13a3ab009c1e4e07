// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `edge-nn bench` command: repeat inference over a synthetic frame and
//! report classification timing plus arena statistics.

use runtime::{InferenceMetrics, InferenceResult, Pipeline, PipelineConfig};
use std::time::Instant;

pub fn execute(config: &PipelineConfig, iterations: usize) -> anyhow::Result<()> {
    let mut pipeline = Pipeline::from_config(config).map_err(|e| {
        anyhow::anyhow!(
            "failed to load model from '{}': {e}",
            config.model_path.display()
        )
    })?;

    let frame_size = pipeline.manifest().frame_size();
    let features: Vec<f32> = (0..frame_size)
        .map(|i| ((i * 37 % 101) as f32 / 50.0) - 1.0)
        .collect();

    println!(
        "Benchmark: '{}' x{iterations}, budget {}",
        pipeline.manifest().name,
        pipeline.arena_manager().budget()
    );

    let mut metrics = InferenceMetrics::new();
    let mut result = InferenceResult::new();
    for _ in 0..iterations {
        let start = Instant::now();
        let outcome = pipeline.run(&features, &mut result);
        metrics.record(&outcome, &result, start.elapsed());
    }

    println!("{}", metrics.summary());
    println!("Arena: {}", pipeline.arena_manager().stats().summary());
    if let Some((_, top)) = result.top() {
        println!("Last top class: {} {:.5}", top.label, top.value);
    }
    Ok(())
}
