// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! nnbench Reporting
//!
//! Turns harness timings into per-benchmark results with latency
//! percentiles, attaches host information, and persists reports as JSON.

pub mod metrics;
pub mod reporter;

pub use metrics::{BenchmarkReport, BenchmarkResult, LatencyMetrics, SystemInfo};
pub use reporter::{JsonReporter, ReporterError};
