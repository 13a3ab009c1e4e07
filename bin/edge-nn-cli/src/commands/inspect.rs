// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `edge-nn inspect` command: print the manifest, weights, and the
//! quantization contract the compiled model must satisfy.

use model_meta::{ModelLoader, TensorExpectation};
use std::path::Path;

pub fn execute(model: &Path) -> anyhow::Result<()> {
    let loaded = ModelLoader::load(model).map_err(|e| {
        anyhow::anyhow!("failed to load model from '{}': {e}", model.display())
    })?;
    let manifest = &loaded.manifest;
    let weights = &loaded.weights;

    // ── Summary ────────────────────────────────────────────────
    println!("{}", manifest.summary());
    println!();

    // ── Tensor Indices ─────────────────────────────────────────
    println!("Tensors:");
    println!("  input:  #{}", manifest.tensors.input);
    println!("  output: #{}", manifest.tensors.output);
    if let Some(scores) = &manifest.tensors.score_tensors {
        println!("  labels: #{}", scores.labels);
        println!("  scores: #{}", scores.scores);
    }
    println!();

    // ── Weights ────────────────────────────────────────────────
    println!(
        "Weights: dense {} ({} -> {}), activation {}",
        weights.weight_shape,
        weights.inputs(),
        weights.outputs(),
        weights.activation.as_str(),
    );
    println!(
        "  parameters: {}",
        weights.weight.len() + weights.bias.len()
    );
    println!();

    // ── Contract ───────────────────────────────────────────────
    let contract = manifest.contract();
    println!("Quantization contract:");
    println!("  input:  {}", describe(&contract.input));
    println!("  output: {}", describe(&contract.output));

    Ok(())
}

fn describe(expectation: &TensorExpectation) -> String {
    match expectation.quant {
        Some(q) if expectation.dtype.is_quantized() => format!(
            "{} scale={} zero_point={}",
            expectation.dtype, q.scale, q.zero_point
        ),
        _ => format!("{}", expectation.dtype),
    }
}
