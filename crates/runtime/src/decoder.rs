// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Output decoding into an [`InferenceResult`].
//!
//! The task kind picks how the output is interpreted; the output tensor's
//! declared dtype alone picks how each score is read (`(raw - zero_point) *
//! scale` for int8/uint8, direct for float32).

use crate::engine::PostProcessBuffers;
use crate::{BoundingBox, ClassScore, EngineError, InferenceResult, RuntimeError};
use model_meta::TaskKind;
use std::collections::VecDeque;
use tensor_core::TensorView;

/// Everything about the model the decoder needs besides the tensors.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub task: TaskKind,
    pub labels: &'a [String],
    /// Minimum score for a detection to be reported.
    pub threshold: f32,
}

/// Replaces the scores and boxes of `result` with the decoded output.
///
/// `post` is the engine's post-processing side channel; only
/// [`TaskKind::Detection`] reads it.
pub fn decode(
    ctx: &DecodeContext<'_>,
    output: &TensorView<'_>,
    post: Option<&PostProcessBuffers>,
    result: &mut InferenceResult,
) -> Result<(), RuntimeError> {
    result.classification.clear();
    result.bounding_boxes.clear();

    match ctx.task {
        TaskKind::Classification => decode_classification(ctx, output, result),
        TaskKind::ConstrainedDetection => decode_grid(ctx, output, result),
        TaskKind::Detection => {
            let post = post.ok_or(EngineError::MissingPostProcess)?;
            decode_post_process(ctx, post, result);
            Ok(())
        }
    }
}

fn decode_classification(
    ctx: &DecodeContext<'_>,
    output: &TensorView<'_>,
    result: &mut InferenceResult,
) -> Result<(), RuntimeError> {
    result.classification.reserve(ctx.labels.len());
    for (i, label) in ctx.labels.iter().enumerate() {
        result.classification.push(ClassScore {
            label: label.clone(),
            value: output.real_at(i)?,
        });
    }
    Ok(())
}

// ── Constrained detection ──────────────────────────────────────

/// Extent of one connected group of cells above threshold.
struct Component {
    min_row: usize,
    max_row: usize,
    min_col: usize,
    max_col: usize,
    score: f32,
}

/// Decodes a `[1, H, W, C]` grid where channel 0 is background.
///
/// Cells of the same class that touch horizontally or vertically are merged
/// into a single box carrying the highest cell score.
fn decode_grid(
    ctx: &DecodeContext<'_>,
    output: &TensorView<'_>,
    result: &mut InferenceResult,
) -> Result<(), RuntimeError> {
    let (height, width, channels) = match output.shape().dims() {
        &[1, h, w, c] if c == ctx.labels.len() + 1 => (h, w, c),
        _ => {
            return Err(EngineError::Unsupported(format!(
                "constrained detection expects a [1, H, W, {}] output, got {}",
                ctx.labels.len() + 1,
                output.shape()
            ))
            .into())
        }
    };

    let scores = output.to_real_vec();
    let at = |row: usize, col: usize, class: usize| scores[(row * width + col) * channels + class];

    let mut visited = vec![false; height * width];
    let mut queue = VecDeque::new();

    for class in 1..channels {
        visited.iter_mut().for_each(|v| *v = false);

        for row in 0..height {
            for col in 0..width {
                if visited[row * width + col] || at(row, col, class) < ctx.threshold {
                    continue;
                }

                let mut comp = Component {
                    min_row: row,
                    max_row: row,
                    min_col: col,
                    max_col: col,
                    score: 0.0,
                };
                visited[row * width + col] = true;
                queue.push_back((row, col));

                while let Some((r, c)) = queue.pop_front() {
                    comp.min_row = comp.min_row.min(r);
                    comp.max_row = comp.max_row.max(r);
                    comp.min_col = comp.min_col.min(c);
                    comp.max_col = comp.max_col.max(c);
                    comp.score = comp.score.max(at(r, c, class));

                    let neighbours = [
                        (r.wrapping_sub(1), c),
                        (r + 1, c),
                        (r, c.wrapping_sub(1)),
                        (r, c + 1),
                    ];
                    for (nr, nc) in neighbours {
                        if nr >= height || nc >= width {
                            continue;
                        }
                        let idx = nr * width + nc;
                        if !visited[idx] && at(nr, nc, class) >= ctx.threshold {
                            visited[idx] = true;
                            queue.push_back((nr, nc));
                        }
                    }
                }

                result.bounding_boxes.push(BoundingBox {
                    label: ctx.labels[class - 1].clone(),
                    class_id: class - 1,
                    value: comp.score,
                    x: comp.min_col as f32 / width as f32,
                    y: comp.min_row as f32 / height as f32,
                    width: (comp.max_col - comp.min_col + 1) as f32 / width as f32,
                    height: (comp.max_row - comp.min_row + 1) as f32 / height as f32,
                });
            }
        }
    }
    Ok(())
}

// ── Unconstrained detection ────────────────────────────────────

fn decode_post_process(ctx: &DecodeContext<'_>, post: &PostProcessBuffers, result: &mut InferenceResult) {
    for i in 0..post.len() {
        let score = post.scores[i];
        if score < ctx.threshold {
            continue;
        }

        let class = post.classes[i];
        let class_id = class as usize;
        if class.is_nan() || class < 0.0 || class_id >= ctx.labels.len() {
            tracing::debug!("dropping detection {i} with unknown class {class}");
            continue;
        }

        let [ymin, xmin, ymax, xmax] = post.boxes[i].map(|v| v.clamp(0.0, 1.0));
        result.bounding_boxes.push(BoundingBox {
            label: ctx.labels[class_id].clone(),
            class_id,
            value: score,
            x: xmin,
            y: ymin,
            width: (xmax - xmin).max(0.0),
            height: (ymax - ymin).max(0.0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{DType, QuantParams, Shape, TensorSpec};

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn test_classification_float() {
        let names = labels(&["yes", "no"]);
        let ctx = DecodeContext {
            task: TaskKind::Classification,
            labels: &names,
            threshold: 0.5,
        };
        let spec = TensorSpec::float(Shape::matrix(1, 2));
        let data = f32_bytes(&[0.7, 0.3]);
        let view = TensorView::new(&spec, &data).unwrap();

        let mut result = InferenceResult::new();
        decode(&ctx, &view, None, &mut result).unwrap();

        assert_eq!(result.classification.len(), 2);
        assert_eq!(result.classification[0].label, "yes");
        assert_eq!(result.classification[0].value, 0.7);
        assert_eq!(result.top().unwrap().0, 0);
    }

    #[test]
    fn test_classification_int8_dequantizes() {
        let names = labels(&["a", "b"]);
        let ctx = DecodeContext {
            task: TaskKind::Classification,
            labels: &names,
            threshold: 0.5,
        };
        let spec = TensorSpec::quantized(DType::I8, Shape::matrix(1, 2), QuantParams::new(0.0039, 0));
        let data = [127u8, (-128i8) as u8];
        let view = TensorView::new(&spec, &data).unwrap();

        let mut result = InferenceResult::new();
        decode(&ctx, &view, None, &mut result).unwrap();

        assert!((result.classification[0].value - 0.4953).abs() < 1e-4);
        assert!((result.classification[1].value + 0.4992).abs() < 1e-4);
    }

    #[test]
    fn test_decode_replaces_previous_scores() {
        let names = labels(&["a"]);
        let ctx = DecodeContext {
            task: TaskKind::Classification,
            labels: &names,
            threshold: 0.5,
        };
        let spec = TensorSpec::float(Shape::matrix(1, 1));
        let data = f32_bytes(&[1.0]);
        let view = TensorView::new(&spec, &data).unwrap();

        let mut result = InferenceResult::new();
        decode(&ctx, &view, None, &mut result).unwrap();
        decode(&ctx, &view, None, &mut result).unwrap();
        assert_eq!(result.classification.len(), 1);
    }

    #[test]
    fn test_grid_merges_adjacent_cells() {
        // 3x3 grid, 2 classes + background.
        let names = labels(&["cup", "lamp"]);
        let ctx = DecodeContext {
            task: TaskKind::ConstrainedDetection,
            labels: &names,
            threshold: 0.5,
        };
        let mut cells = vec![[1.0f32, 0.0, 0.0]; 9];
        cells[0] = [0.1, 0.9, 0.0]; // cup (0,0)
        cells[1] = [0.2, 0.6, 0.0]; // cup (0,1) touches (0,0)
        cells[4] = [0.3, 0.7, 0.0]; // cup (1,1) touches (0,1)
        cells[8] = [0.1, 0.0, 0.8]; // lamp (2,2)
        cells[6] = [0.4, 0.55, 0.0]; // cup (2,0) isolated
        let flat: Vec<f32> = cells.iter().flatten().copied().collect();

        let spec = TensorSpec::float(Shape::new(vec![1, 3, 3, 3]));
        let data = f32_bytes(&flat);
        let view = TensorView::new(&spec, &data).unwrap();

        let mut result = InferenceResult::new();
        decode(&ctx, &view, None, &mut result).unwrap();

        assert_eq!(result.bounding_boxes.len(), 3);
        let merged = &result.bounding_boxes[0];
        assert_eq!(merged.label, "cup");
        assert_eq!(merged.value, 0.9);
        assert_eq!((merged.x, merged.y), (0.0, 0.0));
        assert!((merged.width - 2.0 / 3.0).abs() < 1e-6);
        assert!((merged.height - 2.0 / 3.0).abs() < 1e-6);

        let single = &result.bounding_boxes[1];
        assert_eq!(single.class_id, 0);
        assert!((single.y - 2.0 / 3.0).abs() < 1e-6);

        let lamp = &result.bounding_boxes[2];
        assert_eq!(lamp.label, "lamp");
        assert_eq!(lamp.class_id, 1);
        assert!(result.classification.is_empty());
    }

    #[test]
    fn test_grid_int8() {
        let names = labels(&["person"]);
        let ctx = DecodeContext {
            task: TaskKind::ConstrainedDetection,
            labels: &names,
            threshold: 0.5,
        };
        let spec = TensorSpec::quantized(
            DType::I8,
            Shape::new(vec![1, 1, 2, 2]),
            QuantParams::new(1.0 / 256.0, -128),
        );
        // Cell 0: background; cell 1: person at ~0.75.
        let data = [127u8, 0x80, 0x80, 64u8];
        let view = TensorView::new(&spec, &data).unwrap();

        let mut result = InferenceResult::new();
        decode(&ctx, &view, None, &mut result).unwrap();
        assert_eq!(result.bounding_boxes.len(), 1);
        assert_eq!(result.bounding_boxes[0].x, 0.5);
        assert!((result.bounding_boxes[0].value - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_grid_wrong_shape() {
        let names = labels(&["a", "b"]);
        let ctx = DecodeContext {
            task: TaskKind::ConstrainedDetection,
            labels: &names,
            threshold: 0.5,
        };
        let spec = TensorSpec::float(Shape::new(vec![1, 2, 2, 2]));
        let data = vec![0u8; 32];
        let view = TensorView::new(&spec, &data).unwrap();
        let err = decode(&ctx, &view, None, &mut InferenceResult::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::EngineError(EngineError::Unsupported(_))));
    }

    #[test]
    fn test_post_process_filters_and_clamps() {
        let names = labels(&["car", "bike"]);
        let ctx = DecodeContext {
            task: TaskKind::Detection,
            labels: &names,
            threshold: 0.5,
        };
        let post = PostProcessBuffers {
            boxes: vec![[0.1, 0.2, 0.5, 1.3], [0.0, 0.0, 0.2, 0.2], [-0.2, 0.0, 0.4, 0.4], [0.0; 4]],
            scores: vec![0.9, 0.3, 0.6, 0.95],
            classes: vec![1.0, 0.0, 0.0, 7.0],
            count: 4,
        };
        let spec = TensorSpec::float(Shape::vector(1));
        let data = f32_bytes(&[0.0]);
        let view = TensorView::new(&spec, &data).unwrap();

        let mut result = InferenceResult::new();
        decode(&ctx, &view, Some(&post), &mut result).unwrap();

        assert_eq!(result.bounding_boxes.len(), 2);
        let bike = &result.bounding_boxes[0];
        assert_eq!(bike.label, "bike");
        assert_eq!((bike.x, bike.y), (0.2, 0.1));
        assert!((bike.width - 0.8).abs() < 1e-6);
        assert!((bike.height - 0.4).abs() < 1e-6);

        let car = &result.bounding_boxes[1];
        assert_eq!(car.y, 0.0);
        assert!((car.height - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_detection_requires_post_process() {
        let names = labels(&["car"]);
        let ctx = DecodeContext {
            task: TaskKind::Detection,
            labels: &names,
            threshold: 0.5,
        };
        let spec = TensorSpec::float(Shape::vector(1));
        let data = f32_bytes(&[0.0]);
        let view = TensorView::new(&spec, &data).unwrap();
        assert!(matches!(
            decode(&ctx, &view, None, &mut InferenceResult::new()),
            Err(RuntimeError::EngineError(EngineError::MissingPostProcess))
        ));
    }
}
