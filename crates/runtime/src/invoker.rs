// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Forward-pass invocation with wall-clock timing.

use crate::engine::InferenceEngine;
use crate::RuntimeError;
use memory_manager::ScopedArena;
use std::time::{Duration, Instant};

/// Runs exactly one forward pass and returns its duration.
///
/// The arena is only borrowed; releasing it is the caller's job on every
/// outcome.
pub fn invoke<E: InferenceEngine + ?Sized>(
    engine: &mut E,
    arena: &mut ScopedArena,
) -> Result<Duration, RuntimeError> {
    let start = Instant::now();
    engine.invoke(arena)?;
    let elapsed = start.elapsed();
    tracing::trace!("{} invoked in {}us", engine.name(), elapsed.as_micros());
    Ok(elapsed)
}
