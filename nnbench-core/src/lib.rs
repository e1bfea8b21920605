// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! nnbench Core Library
//!
//! Executor abstraction and benchmark execution protocol for the nnbench
//! inference micro-benchmark harness. Provides the executor trait that
//! normalizes native inference engines, the process-wide benchmark registry
//! keyed by (model, framework, runtime), the timed Init → Prepare → Run →
//! Finish state machine, and the YAML suite configuration.

pub mod benchmark;
pub mod config;
pub mod error;
pub mod executor;
mod macros;
pub mod registry;
pub mod tensor;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use benchmark::{Benchmark, BenchmarkInfo, InputSpec, OutputSpec, RunOptions, RunTimings};
pub use config::{BenchmarkConfig, ConfigLoader, HarnessConfig, KernelCacheConfig, SuiteConfig};
pub use error::{BenchError, BenchResult, HardValidationError, StateTransitionError, Status};
pub use executor::{Executor, ExecutorBase, ExecutorState};
pub use registry::{run, BenchmarkRegistry};
pub use tensor::{BaseTensor, BaseTensorMut, InputTensors, OutputTensors, TensorBuffer};
pub use timing::{now_micros, Timer};
pub use types::{BenchmarkKey, CpuAffinityPolicy, Framework, ModelName, ModelSource, Runtime};
