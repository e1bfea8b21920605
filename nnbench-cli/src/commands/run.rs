// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `nnbench run` command - Register the suite and run benchmarks.
//!
//! Every suite entry is bound to its adapter and registered into the
//! process-wide registry before anything runs, so a bad entry aborts the
//! invocation up front. Selected benchmarks then run one after another;
//! a failing benchmark is reported and the rest still run.

use std::path::Path;

use anyhow::Context;
use nnbench_core::{registry, BenchmarkKey, ConfigLoader, Runtime, SuiteConfig};
use nnbench_executors::{create_executor, ExecutorSettings};
use nnbench_report::{BenchmarkReport, BenchmarkResult, JsonReporter, LatencyMetrics};

/// Optional restriction on which registered benchmarks run.
#[derive(Debug, Default)]
pub struct RunFilter {
    pub model: Option<String>,
    pub framework: Option<String>,
    pub runtime: Option<String>,
}

impl RunFilter {
    fn matches(&self, key: &BenchmarkKey, runtime: Option<Runtime>) -> bool {
        self.model
            .as_deref()
            .map_or(true, |m| key.model_name.as_str() == m)
            && self
                .framework
                .as_deref()
                .map_or(true, |f| key.framework.as_str() == f)
            && runtime.map_or(true, |r| key.runtime == r)
    }
}

pub fn execute(
    config_path: &str,
    filter: &RunFilter,
    iterations: Option<u32>,
    report_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let suite = ConfigLoader::load_file(config_path)
        .with_context(|| format!("loading suite {}", config_path))?;
    register_suite(&suite)?;

    let runtime = filter
        .runtime
        .as_deref()
        .map(str::parse::<Runtime>)
        .transpose()?;

    let mut options = suite.harness.run_options();
    if let Some(iterations) = iterations {
        anyhow::ensure!(iterations > 0, "iterations must be greater than zero");
        options.iterations = iterations;
    }

    let keys: Vec<BenchmarkKey> = registry::global()
        .keys()
        .into_iter()
        .filter(|key| filter.matches(key, runtime))
        .collect();
    anyhow::ensure!(!keys.is_empty(), "no registered benchmark matches the filter");

    let mut report = BenchmarkReport::default();
    for key in &keys {
        let outcome = registry::global().run(key, &options);
        let result = BenchmarkResult::from_outcome(key, &outcome, false)
            .with_metadata("num_threads", options.num_threads)
            .with_metadata("cpu_affinity", format!("{:?}", suite.harness.cpu_affinity));
        report.add_result(result);
    }

    print_results(&report);

    if let Some(dir) = report_dir {
        let reporter = JsonReporter::new(dir)?;
        let path = reporter.save(&report)?;
        println!();
        println!("Report saved to {}", path.display());
    }

    let failures = report.failures();
    anyhow::ensure!(failures == 0, "{} benchmark(s) failed", failures);
    Ok(())
}

fn register_suite(suite: &SuiteConfig) -> anyhow::Result<()> {
    let settings = ExecutorSettings::from(&suite.harness);
    let registry = registry::global();

    for entry in &suite.benchmarks {
        let executor = create_executor(
            &entry.key.framework,
            entry.key.runtime,
            entry.input_names.clone(),
            entry.output_names.clone(),
            &settings,
        )
        .with_context(|| format!("creating executor for {}", entry.key))?;
        let benchmark = entry
            .build(executor)
            .with_context(|| format!("binding benchmark {}", entry.key))?;
        registry.register(benchmark)?;
    }

    tracing::info!(count = registry.len(), "Benchmarks registered");
    Ok(())
}

fn print_results(report: &BenchmarkReport) {
    println!("╔═══════════════════════════╦═════════════════╦═════════╦═══════════════╦══════════════╦════════════╦════════════╦═══════════════╗");
    println!("║ Model                     ║ Framework       ║ Runtime ║ Status        ║ Init (s)     ║ Run (s)    ║ p50        ║ p99           ║");
    println!("╠═══════════════════════════╬═════════════════╬═════════╬═══════════════╬══════════════╬════════════╬════════════╬═══════════════╣");

    for result in &report.results {
        let (p50, p99) = result
            .latency
            .as_ref()
            .map(|l| {
                (
                    LatencyMetrics::format_latency(l.median_us),
                    LatencyMetrics::format_latency(l.p99_us),
                )
            })
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));

        println!(
            "║ {:<25} ║ {:<15} ║ {:<7} ║ {:<13} ║ {:<12.6} ║ {:<10.6} ║ {:<10} ║ {:<13} ║",
            result.model_name,
            result.framework,
            result.runtime,
            result.status,
            result.init_seconds,
            result.run_seconds,
            p50,
            p99
        );
    }

    println!("╚═══════════════════════════╩═════════════════╩═════════╩═══════════════╩══════════════╩════════════╩════════════╩═══════════════╝");

    for result in report.results.iter().filter(|r| !r.is_success()) {
        if let Some(error) = &result.error {
            eprintln!(
                "✗ {}/{}/{}: {}",
                result.model_name, result.framework, result.runtime, error
            );
        }
    }
}
