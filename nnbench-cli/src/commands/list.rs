// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `nnbench list` command - List benchmarks from the suite.

use nnbench_core::ConfigLoader;

pub fn execute(config_path: &str) -> anyhow::Result<()> {
    let suite = ConfigLoader::load_file(config_path)?;

    let mut entries: Vec<_> = suite.benchmarks.iter().collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    println!("╔═══════════════════════════╦═════════════════╦═════════╦═══════════════════════════╗");
    println!("║ Model                     ║ Framework       ║ Runtime ║ Model File                ║");
    println!("╠═══════════════════════════╬═════════════════╬═════════╬═══════════════════════════╣");

    for entry in &entries {
        println!(
            "║ {:<25} ║ {:<15} ║ {:<7} ║ {:<25} ║",
            entry.key.model_name.as_str(),
            entry.key.framework.as_str(),
            entry.key.runtime.name(),
            entry.model_file
        );
    }

    println!("╚═══════════════════════════╩═════════════════╩═════════╩═══════════════════════════╝");
    println!();
    println!("Total: {} benchmark(s)", entries.len());

    Ok(())
}
