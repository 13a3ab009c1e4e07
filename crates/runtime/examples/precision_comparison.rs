// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: Compare float32 and int8 builds of the same model.
//!
//! Runs one feature vector through a float model and its int8 counterpart,
//! then shows the budget check refusing an arena and the quantized image
//! path accepting only the int8 build.
//!
//! ```bash
//! cargo run -p runtime --example precision_comparison
//! ```

use memory_manager::{ArenaManager, MemoryBudget};
use model_meta::{Activation, DenseWeights, ModelManifest, TaskKind, TensorIndices};
use runtime::{
    DenseEngine, InferenceResult, Pipeline, RawQuantizedExtractor, SliceSignal, StatusCode,
};
use tensor_core::{DType, QuantParams, Shape, TensorSpec};

const LABELS: [&str; 3] = ["idle", "wave", "tap"];
const FEATURES: usize = 12;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let features: Vec<f32> = (0..FEATURES).map(|i| ((i % 4) as f32 - 1.5) * 0.3).collect();

    let float_input = TensorSpec::float(Shape::matrix(1, FEATURES));
    let float_output = TensorSpec::float(Shape::matrix(1, LABELS.len()));
    let int8_input =
        TensorSpec::quantized(DType::I8, Shape::matrix(1, FEATURES), QuantParams::new(0.0078, -1));
    let int8_output = TensorSpec::quantized(
        DType::I8,
        Shape::matrix(1, LABELS.len()),
        QuantParams::new(1.0 / 256.0, -128),
    );

    println!("{:<8} {:>10} {:>10} {:>10} {:>8}", "Build", "idle", "wave", "tap", "Status");
    println!("{}", "-".repeat(50));

    for (name, input, output) in [
        ("float32", float_input.clone(), float_output.clone()),
        ("int8", int8_input.clone(), int8_output.clone()),
    ] {
        let mut pipeline = build(name, input, output, MemoryBudget::from_kb(4))?;
        let mut result = InferenceResult::new();
        let status = StatusCode::of(&pipeline.run(&features, &mut result));
        let scores: Vec<String> = result
            .classification
            .iter()
            .map(|c| format!("{:>10.5}", c.value))
            .collect();
        println!("{:<8} {} {:>8}", name, scores.join(" "), status);
    }

    println!("\n--- Arena budget smaller than the model needs ---\n");
    let mut tight = build("int8", int8_input.clone(), int8_output.clone(), MemoryBudget::from_bytes(32))?;
    let outcome = tight.run(&features, &mut InferenceResult::new());
    println!("Status: {}", StatusCode::of(&outcome));
    println!("Arena: {}", tight.arena_manager().stats().summary());

    println!("\n--- Quantized image path ---\n");
    let signal = SliceSignal::new(&features);
    for (name, input, output) in [
        ("float32", float_input, float_output),
        ("int8", int8_input, int8_output),
    ] {
        let mut pipeline = build(name, input, output, MemoryBudget::from_kb(4))?;
        let mut result = InferenceResult::new();
        let outcome =
            pipeline.run_image_quantized(&signal, &mut RawQuantizedExtractor::new(), &mut result);
        println!("{name}: {}", StatusCode::of(&outcome));
        if outcome.is_ok() {
            println!("{}", result.summary());
        }
    }

    Ok(())
}

fn build(
    name: &str,
    input: TensorSpec,
    output: TensorSpec,
    budget: MemoryBudget,
) -> Result<Pipeline<DenseEngine>, Box<dyn std::error::Error>> {
    let manifest = ModelManifest {
        name: format!("gestures-{name}"),
        task: TaskKind::Classification,
        labels: LABELS.iter().map(|s| s.to_string()).collect(),
        tensors: TensorIndices::default(),
        input,
        output,
        arena_bytes: 256,
        detection_threshold: 0.5,
    };
    manifest.validate()?;

    let weights = DenseWeights {
        weight: (0..LABELS.len() * FEATURES)
            .map(|i| if i % (FEATURES + 1) == 0 { 1.0 } else { -0.1 })
            .collect(),
        weight_shape: Shape::matrix(LABELS.len(), FEATURES),
        bias: vec![0.1, 0.0, -0.1],
        activation: Activation::Softmax,
    };
    let engine = DenseEngine::from_parts(&manifest, weights)?;
    Ok(Pipeline::new(engine, manifest, ArenaManager::new(budget)))
}
