// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! nnbench Executors
//!
//! Backend adapters implementing the `Executor` trait, plus the shared
//! pieces they rely on: CPU topology and affinity, and the on-disk kernel
//! cache for GPU-class devices.

pub mod affinity;
pub mod kernel_cache;
pub mod passthrough;

pub use affinity::{current_affinity_count, pin_current_thread, CpuTopology, ThreadPin};
pub use kernel_cache::{CacheOutcome, KernelCache};
pub use passthrough::{device_type, DeviceType, PassthroughExecutor};

use nnbench_core::{
    BenchError, BenchResult, CpuAffinityPolicy, Executor, Framework, HarnessConfig,
    KernelCacheConfig, Runtime,
};

/// Frameworks this build can construct executors for.
pub const SUPPORTED_FRAMEWORKS: &[&str] = &[passthrough::FRAMEWORK];

/// Settings shared by every adapter, taken from the harness section.
#[derive(Debug, Clone, Default)]
pub struct ExecutorSettings {
    pub kernel_cache: KernelCacheConfig,
    pub cpu_affinity: CpuAffinityPolicy,
}

impl From<&HarnessConfig> for ExecutorSettings {
    fn from(harness: &HarnessConfig) -> Self {
        Self {
            kernel_cache: harness.kernel_cache.clone(),
            cpu_affinity: harness.cpu_affinity,
        }
    }
}

/// Construct the executor registered under `framework`.
pub fn create_executor(
    framework: &Framework,
    runtime: Runtime,
    input_names: Vec<String>,
    output_names: Vec<String>,
    settings: &ExecutorSettings,
) -> BenchResult<Box<dyn Executor>> {
    match framework.as_str() {
        passthrough::FRAMEWORK => Ok(Box::new(PassthroughExecutor::new(
            runtime,
            input_names,
            output_names,
            settings.clone(),
        ))),
        other => Err(BenchError::EngineCreation {
            framework: other.to_string(),
            reason: format!(
                "no adapter for this framework (supported: {})",
                SUPPORTED_FRAMEWORKS.join(", ")
            ),
        }),
    }
}
