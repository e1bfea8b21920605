// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reference adapter over an in-process identity engine.
//!
//! Follows the same contract as native adapters: model artifacts are read
//! from `<model>.pb` and `<model>.data`, GPU-class devices compile kernels
//! into the on-disk cache during `init`, and `run` translates harness tensors
//! into engine buffers at the call boundary only. The engine copies input
//! *i* into output *i*, so the harness can be exercised end to end without a
//! vendor runtime installed.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use nnbench_core::{
    BenchError, BenchResult, Executor, ExecutorBase, ExecutorState, InputTensors, ModelSource,
    OutputTensors, Runtime,
};

use crate::affinity::{pin_current_thread, CpuTopology, ThreadPin};
use crate::kernel_cache::KernelCache;
use crate::ExecutorSettings;

pub const FRAMEWORK: &str = "passthrough";

/// Device types the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Cpu,
    Gpu,
    Hexagon,
}

impl DeviceType {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Hexagon => "hexagon",
        }
    }

    fn compiles_kernels(&self) -> bool {
        matches!(self, Self::Gpu)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Map a harness runtime onto an engine device. Runtimes the engine does
/// not know run on the CPU.
pub fn device_type(runtime: Runtime) -> DeviceType {
    match runtime {
        Runtime::Cpu => DeviceType::Cpu,
        Runtime::Gpu => DeviceType::Gpu,
        Runtime::Dsp => DeviceType::Hexagon,
        _ => DeviceType::Cpu,
    }
}

/// Engine instance. Pairs inputs and outputs by declared position.
#[derive(Debug)]
struct IdentityEngine {
    device: DeviceType,
    pairs: Vec<(String, String)>,
    graph_bytes: usize,
    weight_bytes: usize,
}

impl IdentityEngine {
    fn create(
        graph: &[u8],
        weights: &[u8],
        input_names: &[String],
        output_names: &[String],
        device: DeviceType,
    ) -> Result<Self, String> {
        if graph.is_empty() {
            return Err("graph definition is empty".to_string());
        }
        if input_names.len() != output_names.len() {
            return Err(format!(
                "identity graph needs one output per input ({} inputs, {} outputs)",
                input_names.len(),
                output_names.len()
            ));
        }

        let pairs = input_names
            .iter()
            .cloned()
            .zip(output_names.iter().cloned())
            .collect();

        Ok(Self {
            device,
            pairs,
            graph_bytes: graph.len(),
            weight_bytes: weights.len(),
        })
    }

    fn run(
        &self,
        inputs: &HashMap<&str, &[f32]>,
        outputs: &mut HashMap<&str, &mut [f32]>,
    ) -> Result<(), String> {
        for (input_name, output_name) in &self.pairs {
            let src = inputs
                .get(input_name.as_str())
                .ok_or_else(|| format!("missing input '{}'", input_name))?;
            let dst = outputs
                .get_mut(output_name.as_str())
                .ok_or_else(|| format!("missing output '{}'", output_name))?;

            if src.len() != dst.len() {
                return Err(format!(
                    "input '{}' has {} elements but output '{}' has {}",
                    input_name,
                    src.len(),
                    output_name,
                    dst.len()
                ));
            }
            dst.copy_from_slice(src);
        }
        Ok(())
    }
}

/// Executor for the `passthrough` framework.
pub struct PassthroughExecutor {
    base: ExecutorBase,
    settings: ExecutorSettings,
    engine: Option<Arc<IdentityEngine>>,
    pin: Option<ThreadPin>,
}

impl PassthroughExecutor {
    pub fn new(
        runtime: Runtime,
        input_names: Vec<String>,
        output_names: Vec<String>,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            base: ExecutorBase::new(FRAMEWORK, runtime, input_names, output_names),
            settings,
            engine: None,
            pin: None,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        device_type(self.base.runtime())
    }

    fn create_engine(&self, model: &ModelSource) -> BenchResult<IdentityEngine> {
        let device = self.device_type();
        let graph = read_model_file(&model.graph_file())?;
        let weights = read_model_file(&model.data_file())?;

        if device.compiles_kernels() {
            let cache = KernelCache::new(&self.settings.kernel_cache);
            cache.load_or_compile(&model.stem(), device.name(), &graph)?;
        }

        let engine = IdentityEngine::create(
            &graph,
            &weights,
            self.base.input_names(),
            self.base.output_names(),
            device,
        )
        .map_err(|reason| BenchError::EngineCreation {
            framework: FRAMEWORK.to_string(),
            reason,
        })?;

        tracing::debug!(
            model = %model,
            device = %engine.device,
            graph_bytes = engine.graph_bytes,
            weight_bytes = engine.weight_bytes,
            "Engine created"
        );
        Ok(engine)
    }

    /// Pin the driving thread for the CPU engine. Held until `finish`.
    fn apply_affinity(&mut self) {
        // Release first so the saved mask is the unpinned one
        self.pin = None;
        let cpus = CpuTopology::detect().select(self.settings.cpu_affinity, self.base.num_threads());
        match pin_current_thread(&cpus) {
            Ok(pin) => self.pin = pin,
            Err(e) => tracing::warn!(error = %e, cpus = ?cpus, "CPU affinity not applied"),
        }
    }

    pub fn pinned_cpus(&self) -> &[usize] {
        self.pin.as_ref().map(ThreadPin::cpus).unwrap_or(&[])
    }
}

impl Executor for PassthroughExecutor {
    fn base(&self) -> &ExecutorBase {
        &self.base
    }

    fn init(&mut self, model: &ModelSource, num_threads: usize) -> BenchResult<()> {
        self.base.set_num_threads(num_threads);
        if self.device_type().compiles_kernels() {
            // Kernels are compiled once per target and cached on disk, so
            // later engine creations reuse them.
            self.create_engine(model)?;
        }
        if self.device_type() == DeviceType::Cpu {
            self.apply_affinity();
        }
        self.base.transition_to(ExecutorState::Initialized)?;
        Ok(())
    }

    fn prepare(&mut self, model: &ModelSource) -> BenchResult<()> {
        let engine = self.create_engine(model)?;
        self.engine = Some(Arc::new(engine));
        self.base.transition_to(ExecutorState::Prepared)?;
        Ok(())
    }

    fn run(&mut self, inputs: &InputTensors<'_>, outputs: &mut OutputTensors<'_>) -> BenchResult<()> {
        self.base.ensure_prepared()?;
        self.base.check_io_names(inputs, outputs)?;

        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| BenchError::EngineNotPrepared {
                framework: FRAMEWORK.to_string(),
            })?;

        let native_inputs: HashMap<&str, &[f32]> = inputs
            .iter()
            .map(|(name, tensor)| (name.as_str(), tensor.data()))
            .collect();
        let mut native_outputs: HashMap<&str, &mut [f32]> = outputs
            .iter_mut()
            .map(|(name, tensor)| (name.as_str(), tensor.data_mut()))
            .collect();

        engine
            .run(&native_inputs, &mut native_outputs)
            .map_err(|reason| BenchError::EngineExecution {
                framework: FRAMEWORK.to_string(),
                reason,
            })
    }

    fn finish(&mut self) {
        self.engine = None;
        self.pin = None;
        self.base.mark_finished();
    }
}

fn read_model_file(path: &Path) -> BenchResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| BenchError::FileRead {
        kind: "model",
        path: path.to_path_buf(),
        source: e,
    })
}
