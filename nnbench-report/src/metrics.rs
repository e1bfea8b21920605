// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result records for benchmark runs.
//!
//! A [`BenchmarkResult`] captures one (model, framework, runtime) execution:
//! the aggregated init/run seconds the harness reports, plus a latency
//! distribution built from the per-call samples of the measured runs.

use chrono::{DateTime, Utc};
use nnbench_core::{BenchError, BenchResult, BenchmarkKey, RunTimings, Status};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use sysinfo::System;

/// Latency distribution of the measured run calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Minimum observed latency in microseconds
    pub min_us: u64,
    /// Maximum observed latency in microseconds
    pub max_us: u64,
    /// Arithmetic mean latency in microseconds
    pub mean_us: f64,
    /// Median (p50) latency in microseconds
    pub median_us: u64,
    /// 90th percentile latency in microseconds
    pub p90_us: u64,
    /// 99th percentile latency in microseconds
    pub p99_us: u64,
    /// Standard deviation in microseconds
    pub std_dev_us: f64,
    /// Raw samples, kept only on request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<u64>>,
}

impl LatencyMetrics {
    /// Calculate metrics from latency samples in microseconds.
    pub fn from_samples(samples: &[u64], keep_raw: bool) -> Self {
        if samples.is_empty() {
            return Self {
                min_us: 0,
                max_us: 0,
                mean_us: 0.0,
                median_us: 0,
                p90_us: 0,
                p99_us: 0,
                std_dev_us: 0.0,
                samples: None,
            };
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let len = sorted.len();

        let sum: u64 = sorted.iter().sum();
        let mean_us = sum as f64 / len as f64;
        let variance: f64 = sorted
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean_us;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;

        Self {
            min_us: sorted[0],
            max_us: sorted[len - 1],
            mean_us,
            median_us: sorted[len / 2],
            p90_us: sorted[(len as f64 * 0.90) as usize],
            p99_us: sorted[(len as f64 * 0.99) as usize],
            std_dev_us: variance.sqrt(),
            // Samples keep call order, not sorted order.
            samples: keep_raw.then(|| samples.to_vec()),
        }
    }

    /// Format latency in human-readable form (auto-selects μs/ms/s).
    pub fn format_latency(us: u64) -> String {
        if us < 1_000 {
            format!("{}μs", us)
        } else if us < 1_000_000 {
            format!("{:.2}ms", us as f64 / 1_000.0)
        } else {
            format!("{:.2}s", us as f64 / 1_000_000.0)
        }
    }
}

/// Host description captured alongside a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub kernel_version: Option<String>,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub memory_bytes: u64,
    pub hostname: String,
}

impl SystemInfo {
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Outcome of one benchmark execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub model_name: String,
    pub framework: String,
    pub runtime: String,
    /// `SUCCESS` or `RUNTIME_ERROR`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub init_seconds: f64,
    pub run_seconds: f64,
    pub warmup_seconds: f64,
    pub warmup_iterations: u32,
    pub iterations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyMetrics>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl BenchmarkResult {
    /// Record a successful execution.
    pub fn from_timings(key: &BenchmarkKey, timings: &RunTimings, keep_raw_samples: bool) -> Self {
        Self {
            model_name: key.model_name.to_string(),
            framework: key.framework.to_string(),
            runtime: key.runtime.name().to_string(),
            status: Status::Success.name().to_string(),
            error: None,
            init_seconds: timings.init_seconds,
            run_seconds: timings.run_seconds,
            warmup_seconds: timings.warmup_seconds,
            warmup_iterations: timings.warmup_iterations,
            iterations: timings.iterations,
            latency: Some(LatencyMetrics::from_samples(
                &timings.run_samples_us,
                keep_raw_samples,
            )),
            metadata: HashMap::new(),
        }
    }

    /// Record a failed execution. Timing fields are zero.
    pub fn failed(key: &BenchmarkKey, error: &BenchError) -> Self {
        Self {
            model_name: key.model_name.to_string(),
            framework: key.framework.to_string(),
            runtime: key.runtime.name().to_string(),
            status: error.status().name().to_string(),
            error: Some(error.to_string()),
            init_seconds: 0.0,
            run_seconds: 0.0,
            warmup_seconds: 0.0,
            warmup_iterations: 0,
            iterations: 0,
            latency: None,
            metadata: HashMap::new(),
        }
    }

    pub fn from_outcome(
        key: &BenchmarkKey,
        outcome: &BenchResult<RunTimings>,
        keep_raw_samples: bool,
    ) -> Self {
        match outcome {
            Ok(timings) => Self::from_timings(key, timings, keep_raw_samples),
            Err(e) => Self::failed(key, e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success.name()
    }

    /// Add metadata to the result. Values that fail to serialize are skipped.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), value);
        }
        self
    }
}

/// Complete report for one harness invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub benchmark_suite: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            benchmark_suite: suite.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }

    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new("nnbench")
    }
}
