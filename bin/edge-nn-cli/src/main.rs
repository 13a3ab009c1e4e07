// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # edge-nn
//!
//! Command-line interface for the edge-nn-rt inference pipeline.
//!
//! ## Usage
//! ```bash
//! # Classify one feature frame
//! edge-nn run --model ./models/keywords --features frame.txt --budget 256K
//!
//! # Same frame through the int8-only image path
//! edge-nn run --model ./models/keywords --features frame.txt --image-quantized
//!
//! # Repeat a frame and report timing statistics
//! edge-nn bench --model ./models/keywords --iterations 1000
//!
//! # Print the manifest and quantization contract
//! edge-nn inspect --model ./models/keywords
//! ```
//!
//! `run` exits with the numeric pipeline status (0 on success).

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "edge-nn",
    about = "Quantization-aware neural network inference for edge devices",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (overrides --model and --budget).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one inference over a feature frame.
    Run {
        /// Path to the model directory.
        #[arg(short, long, default_value = "./models/keywords")]
        model: PathBuf,

        /// File of comma or whitespace separated floats (stdin when omitted).
        #[arg(short, long)]
        features: Option<PathBuf>,

        /// Arena memory budget (e.g., "256K", "1M").
        #[arg(short = 'b', long, default_value = "256K")]
        budget: String,

        /// Log predictions and features.
        #[arg(short, long)]
        debug: bool,

        /// Use the int8-only image path (the model input must be int8).
        #[arg(long)]
        image_quantized: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Repeat inference and report timing and arena statistics.
    Bench {
        /// Path to the model directory.
        #[arg(short, long, default_value = "./models/keywords")]
        model: PathBuf,

        /// Arena memory budget.
        #[arg(short = 'b', long, default_value = "256K")]
        budget: String,

        /// Number of pipeline calls.
        #[arg(short, long, default_value_t = 100)]
        iterations: usize,
    },

    /// Inspect a model: print manifest, tensors, and quantization contract.
    Inspect {
        /// Path to the model directory.
        #[arg(short, long, default_value = "./models/keywords")]
        model: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model,
            features,
            budget,
            debug,
            image_quantized,
            json,
        } => {
            let config = commands::resolve_config(cli.config.as_deref(), model, budget, debug)?;
            commands::init_tracing(cli.verbose, config.debug);
            let options = commands::run::RunOptions {
                features,
                image_quantized,
                json,
            };
            let status = commands::run::execute(&config, &options)?;
            std::process::exit(status.as_i32());
        }
        Commands::Bench {
            model,
            budget,
            iterations,
        } => {
            let config = commands::resolve_config(cli.config.as_deref(), model, budget, false)?;
            commands::init_tracing(cli.verbose, config.debug);
            commands::bench::execute(&config, iterations)
        }
        Commands::Inspect { model } => {
            commands::init_tracing(cli.verbose, false);
            let model = match cli.config.as_deref() {
                Some(path) => runtime::PipelineConfig::from_file(path)?.model_path,
                None => model,
            };
            commands::inspect::execute(&model)
        }
    }
}
