// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! nnbench CLI
//!
//! Command-line driver for the nnbench inference benchmark harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// nnbench - cross-framework inference micro-benchmark harness
#[derive(Parser)]
#[command(name = "nnbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Benchmark suite file path
    #[arg(short, long, default_value = "nnbench.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run benchmarks from the suite
    Run {
        /// Only run benchmarks for this model
        #[arg(short, long)]
        model: Option<String>,

        /// Only run benchmarks for this framework
        #[arg(short, long)]
        framework: Option<String>,

        /// Only run benchmarks for this runtime (CPU, GPU, DSP, ...)
        #[arg(short, long)]
        runtime: Option<String>,

        /// Override the suite's measured iteration count
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Write a JSON report into this directory
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List benchmarks defined in the suite
    List,

    /// Validate a suite file
    Validate {
        /// Path to the suite file
        file: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run {
            model,
            framework,
            runtime,
            iterations,
            report,
        } => {
            let filter = commands::run::RunFilter {
                model,
                framework,
                runtime,
            };
            commands::run::execute(&cli.config, &filter, iterations, report.as_deref())
        }
        Commands::List => commands::list::execute(&cli.config),
        Commands::Validate { file } => commands::validate::execute(&file),
    }
}
