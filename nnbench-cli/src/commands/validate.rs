// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `nnbench validate` command - Validate a suite file.

use nnbench_core::ConfigLoader;
use nnbench_executors::SUPPORTED_FRAMEWORKS;

pub fn execute(file: &str) -> anyhow::Result<()> {
    tracing::info!(file = %file, "Validating suite");

    match ConfigLoader::load_file(file) {
        Ok(suite) => {
            let harness = &suite.harness;
            println!("✓ Suite is valid");
            println!();
            println!("Harness Settings:");
            println!("  Model Directory:    {}", harness.model_dir.display());
            println!("  Input Directory:    {}", harness.input_dir.display());
            println!("  Kernel Cache:       {}", harness.kernel_cache.dir.display());
            println!("  Warmup Iterations:  {}", harness.warmup_iterations);
            println!("  Iterations:         {}", harness.iterations);
            println!("  Threads:            {}", harness.num_threads);
            println!("  CPU Affinity:       {:?}", harness.cpu_affinity);
            println!();
            println!("Benchmarks ({}):", suite.benchmarks.len());
            for entry in &suite.benchmarks {
                let supported = SUPPORTED_FRAMEWORKS.contains(&entry.key.framework.as_str());
                println!(
                    "  - {} (model file: {}, inputs: {}, outputs: {}){}",
                    entry.key,
                    entry.model_file,
                    entry.input_names.len(),
                    entry.output_names.len(),
                    if supported { "" } else { " [no adapter in this build]" }
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Suite validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
