// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for whole pipeline calls over the reference engine.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use memory_manager::{ArenaManager, MemoryBudget};
use model_meta::{Activation, DenseWeights, ModelManifest, TaskKind, TensorIndices};
use runtime::{DenseEngine, InferenceResult, Pipeline, RawQuantizedExtractor, SliceSignal};
use tensor_core::{DType, QuantParams, Shape, TensorSpec};

const FEATURES: usize = 640;
const CLASSES: usize = 8;

fn pipeline(input: TensorSpec, output: TensorSpec) -> Pipeline<DenseEngine> {
    let manifest = ModelManifest {
        name: "bench".into(),
        task: TaskKind::Classification,
        labels: (0..CLASSES).map(|i| format!("class-{i}")).collect(),
        tensors: TensorIndices::default(),
        input,
        output,
        arena_bytes: 8 * 1024,
        detection_threshold: 0.5,
    };
    let weights = DenseWeights {
        weight: (0..CLASSES * FEATURES).map(|i| ((i % 7) as f32 - 3.0) * 0.01).collect(),
        weight_shape: Shape::matrix(CLASSES, FEATURES),
        bias: vec![0.0; CLASSES],
        activation: Activation::Softmax,
    };
    let engine = DenseEngine::from_parts(&manifest, weights).unwrap();
    Pipeline::new(engine, manifest, ArenaManager::new(MemoryBudget::from_kb(64)))
}

fn features() -> Vec<f32> {
    (0..FEATURES).map(|i| (i as f32 / FEATURES as f32) - 0.5).collect()
}

fn bench_float_run(c: &mut Criterion) {
    let mut p = pipeline(
        TensorSpec::float(Shape::matrix(1, FEATURES)),
        TensorSpec::float(Shape::matrix(1, CLASSES)),
    );
    let features = features();
    let mut result = InferenceResult::new();

    c.bench_function("run_f32_640x8", |b| {
        b.iter(|| p.run(black_box(&features), &mut result).unwrap())
    });
}

fn bench_int8_run(c: &mut Criterion) {
    let mut p = pipeline(
        TensorSpec::quantized(DType::I8, Shape::matrix(1, FEATURES), QuantParams::new(0.0078, -1)),
        TensorSpec::quantized(DType::I8, Shape::matrix(1, CLASSES), QuantParams::new(1.0 / 256.0, -128)),
    );
    let features = features();
    let mut result = InferenceResult::new();

    c.bench_function("run_i8_640x8", |b| {
        b.iter(|| p.run(black_box(&features), &mut result).unwrap())
    });
}

fn bench_image_quantized(c: &mut Criterion) {
    let mut p = pipeline(
        TensorSpec::quantized(DType::I8, Shape::matrix(1, FEATURES), QuantParams::new(1.0 / 256.0, -128)),
        TensorSpec::quantized(DType::I8, Shape::matrix(1, CLASSES), QuantParams::new(1.0 / 256.0, -128)),
    );
    let samples = features();
    let mut extractor = RawQuantizedExtractor::new();
    let mut result = InferenceResult::new();

    c.bench_function("run_image_quantized_640x8", |b| {
        b.iter(|| {
            p.run_image_quantized(&SliceSignal::new(black_box(&samples)), &mut extractor, &mut result)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_float_run, bench_int8_run, bench_image_quantized);
criterion_main!(benches);
