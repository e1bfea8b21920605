// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark binding and the timed execution state machine.
//!
//! A [`Benchmark`] binds one executor to a model identity and a fixed input
//! set. [`Benchmark::run`] drives the executor through
//! Init → Prepare → warmup Run → measured Run → Finish.
//!
//! Aggregation policy, identical for every backend:
//! - `init` is timed and logged but excluded from the reported numbers.
//! - `prepare` is reported as `init_seconds`.
//! - `warmup_iterations` unmeasured runs, then `iterations` measured runs,
//!   each bracketed individually; `run_seconds` is their sum.
//! - input loading and output allocation happen outside every timed window.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{BenchResult, HardValidationError};
use crate::executor::Executor;
use crate::tensor::{InputTensors, OutputTensors, TensorBuffer};
use crate::timing::{micros_to_seconds, now_micros, Timer};
use crate::types::{BenchmarkKey, ModelSource};

/// One model input: name, raw `f32` file and shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSpec {
    pub name: String,
    pub file: PathBuf,
    pub shape: Vec<usize>,
}

/// One model output the harness pre-allocates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    pub name: String,
    pub shape: Vec<usize>,
}

/// Knobs for a single benchmark execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub num_threads: usize,
    pub warmup_iterations: u32,
    pub iterations: u32,
    /// Base directory the model file is resolved against.
    pub model_dir: PathBuf,
    /// Base directory relative input files are resolved against.
    pub input_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            num_threads: 4,
            warmup_iterations: 1,
            iterations: 1,
            model_dir: PathBuf::from("."),
            input_dir: PathBuf::from("."),
        }
    }
}

/// Measured durations of one successful execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunTimings {
    /// Time to stand up a runnable engine (the `prepare` step).
    pub init_seconds: f64,
    /// Sum of all measured `run` calls.
    pub run_seconds: f64,
    /// One-time warmup (`init` step), not part of the comparison numbers.
    pub warmup_seconds: f64,
    /// Per-call latency of each measured run, in microseconds.
    pub run_samples_us: Vec<u64>,
    pub warmup_iterations: u32,
    pub iterations: u32,
}

impl RunTimings {
    /// Mean latency of a measured run call.
    pub fn mean_run_seconds(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.run_seconds / self.iterations as f64
    }
}

/// Read-only snapshot of a registered benchmark's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchmarkInfo {
    pub key: BenchmarkKey,
    pub model_file: String,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
}

/// An executor bound to one model identity and input set.
pub struct Benchmark {
    key: BenchmarkKey,
    model_file: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    executor: Box<dyn Executor>,
}

impl std::fmt::Debug for Benchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Benchmark")
            .field("key", &self.key)
            .field("model_file", &self.model_file)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl Benchmark {
    /// Bind `executor` to `key`. The executor must target the key's runtime.
    pub fn new(
        executor: Box<dyn Executor>,
        key: BenchmarkKey,
        model_file: impl Into<String>,
    ) -> BenchResult<Self> {
        if executor.runtime() != key.runtime {
            return Err(HardValidationError::RuntimeMismatch {
                executor: executor.runtime().name(),
                benchmark: key.runtime.name(),
            }
            .into());
        }

        let model_file = model_file.into();
        if model_file.is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "model_file",
                context: format!("benchmark {}", key),
            }
            .into());
        }

        Ok(Self {
            key,
            model_file,
            inputs: Vec::new(),
            outputs: Vec::new(),
            executor,
        })
    }

    /// Attach the index-aligned input lists.
    pub fn with_inputs(
        mut self,
        names: Vec<String>,
        files: Vec<PathBuf>,
        shapes: Vec<Vec<usize>>,
    ) -> BenchResult<Self> {
        if names.len() != files.len() || names.len() != shapes.len() {
            return Err(HardValidationError::MisalignedInputs {
                names: names.len(),
                files: files.len(),
                shapes: shapes.len(),
            }
            .into());
        }
        ensure_unique_names("inputs", &names, &self.key)?;

        self.inputs = names
            .into_iter()
            .zip(files)
            .zip(shapes)
            .map(|((name, file), shape)| InputSpec { name, file, shape })
            .collect();
        Ok(self)
    }

    /// Attach the index-aligned output lists.
    pub fn with_outputs(mut self, names: Vec<String>, shapes: Vec<Vec<usize>>) -> BenchResult<Self> {
        if names.len() != shapes.len() {
            return Err(HardValidationError::MisalignedOutputs {
                names: names.len(),
                shapes: shapes.len(),
            }
            .into());
        }
        ensure_unique_names("outputs", &names, &self.key)?;

        self.outputs = names
            .into_iter()
            .zip(shapes)
            .map(|(name, shape)| OutputSpec { name, shape })
            .collect();
        Ok(self)
    }

    pub fn key(&self) -> &BenchmarkKey {
        &self.key
    }

    pub fn model_file(&self) -> &str {
        &self.model_file
    }

    pub fn inputs(&self) -> &[InputSpec] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputSpec] {
        &self.outputs
    }

    pub fn info(&self) -> BenchmarkInfo {
        BenchmarkInfo {
            key: self.key.clone(),
            model_file: self.model_file.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
        }
    }

    /// Execute the full lifecycle once. `finish` is invoked exactly once
    /// whether or not an earlier step failed.
    pub fn run(&mut self, options: &RunOptions) -> BenchResult<RunTimings> {
        let model = ModelSource::new(options.model_dir.join(&self.model_file));

        tracing::info!(
            benchmark = %self.key,
            model = %model,
            iterations = options.iterations,
            "Running benchmark"
        );

        let result = self.run_lifecycle(&model, options);
        self.executor.finish();

        match &result {
            Ok(timings) => tracing::info!(
                benchmark = %self.key,
                init_seconds = timings.init_seconds,
                run_seconds = timings.run_seconds,
                "Benchmark finished"
            ),
            Err(e) => tracing::warn!(benchmark = %self.key, error = %e, "Benchmark failed"),
        }

        result
    }

    fn run_lifecycle(&mut self, model: &ModelSource, options: &RunOptions) -> BenchResult<RunTimings> {
        let timer = Timer::start();
        self.executor.init(model, options.num_threads)?;
        let warmup_us = timer.elapsed_micros();
        tracing::debug!(benchmark = %self.key, warmup_us, "Executor init done");

        let timer = Timer::start();
        self.executor.prepare(model)?;
        let prepare_us = timer.elapsed_micros();
        tracing::debug!(benchmark = %self.key, prepare_us, "Executor prepare done");

        let inputs = self.load_inputs(&options.input_dir)?;
        let mut outputs = self.allocate_outputs();

        let input_views: InputTensors<'_> = inputs
            .iter()
            .map(|t| (t.name().to_string(), t.view()))
            .collect();
        let mut output_views: OutputTensors<'_> = outputs
            .iter_mut()
            .map(|t| (t.name().to_string(), t.view_mut()))
            .collect();

        for _ in 0..options.warmup_iterations {
            self.executor.run(&input_views, &mut output_views)?;
        }

        let mut samples = Vec::with_capacity(options.iterations as usize);
        for _ in 0..options.iterations {
            let start = now_micros();
            let result = self.executor.run(&input_views, &mut output_views);
            let end = now_micros();
            result?;
            samples.push(end - start);
        }

        let run_us: u64 = samples.iter().sum();
        Ok(RunTimings {
            init_seconds: micros_to_seconds(prepare_us),
            run_seconds: micros_to_seconds(run_us),
            warmup_seconds: micros_to_seconds(warmup_us),
            run_samples_us: samples,
            warmup_iterations: options.warmup_iterations,
            iterations: options.iterations,
        })
    }

    fn load_inputs(&self, input_dir: &Path) -> BenchResult<Vec<TensorBuffer>> {
        self.inputs
            .iter()
            .map(|spec| {
                TensorBuffer::from_file(&spec.name, spec.shape.clone(), input_dir.join(&spec.file))
            })
            .collect()
    }

    fn allocate_outputs(&self) -> Vec<TensorBuffer> {
        self.outputs
            .iter()
            .map(|spec| TensorBuffer::zeros(&spec.name, spec.shape.clone()))
            .collect()
    }
}

impl From<&Benchmark> for BenchmarkInfo {
    fn from(benchmark: &Benchmark) -> Self {
        benchmark.info()
    }
}

/// Tensor names must be unique within one input or output set.
pub(crate) fn ensure_unique_names(
    field: &'static str,
    names: &[String],
    context: impl std::fmt::Display,
) -> BenchResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(HardValidationError::InvalidFieldValue {
                field,
                value: name.clone(),
                reason: format!("Duplicate tensor name in {}", context),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::executor::ExecutorBase;
    use crate::types::Runtime;

    struct NoopExecutor {
        base: ExecutorBase,
    }

    impl NoopExecutor {
        fn boxed(runtime: Runtime) -> Box<dyn Executor> {
            Box::new(Self {
                base: ExecutorBase::new("noop", runtime, vec![], vec![]),
            })
        }
    }

    impl Executor for NoopExecutor {
        fn base(&self) -> &ExecutorBase {
            &self.base
        }

        fn init(&mut self, _model: &ModelSource, _num_threads: usize) -> BenchResult<()> {
            Ok(())
        }

        fn prepare(&mut self, _model: &ModelSource) -> BenchResult<()> {
            Ok(())
        }

        fn run(
            &mut self,
            _inputs: &InputTensors<'_>,
            _outputs: &mut OutputTensors<'_>,
        ) -> BenchResult<()> {
            Ok(())
        }

        fn finish(&mut self) {}
    }

    fn key(runtime: &str) -> BenchmarkKey {
        BenchmarkKey::parse("mobilenet", "noop", runtime).unwrap()
    }

    #[test]
    fn test_runtime_mismatch_rejected() {
        let result = Benchmark::new(NoopExecutor::boxed(Runtime::Gpu), key("CPU"), "mobilenet");
        assert!(matches!(
            result,
            Err(BenchError::HardValidation(HardValidationError::RuntimeMismatch { .. }))
        ));
    }

    #[test]
    fn test_misaligned_inputs_rejected() {
        let benchmark =
            Benchmark::new(NoopExecutor::boxed(Runtime::Cpu), key("CPU"), "mobilenet").unwrap();
        let result = benchmark.with_inputs(
            vec!["a".to_string(), "b".to_string()],
            vec![PathBuf::from("a.bin")],
            vec![vec![1], vec![1]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_input_names_rejected() {
        let benchmark =
            Benchmark::new(NoopExecutor::boxed(Runtime::Cpu), key("CPU"), "mobilenet").unwrap();
        let result = benchmark.with_inputs(
            vec!["input".to_string(), "input".to_string()],
            vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")],
            vec![vec![1], vec![1]],
        );
        assert!(matches!(
            result,
            Err(BenchError::HardValidation(HardValidationError::InvalidFieldValue {
                field: "inputs",
                ..
            }))
        ));
    }

    #[test]
    fn test_duplicate_output_names_rejected() {
        let benchmark =
            Benchmark::new(NoopExecutor::boxed(Runtime::Cpu), key("CPU"), "mobilenet").unwrap();
        let result = benchmark.with_outputs(
            vec!["output".to_string(), "output".to_string()],
            vec![vec![1], vec![1]],
        );
        assert!(matches!(
            result,
            Err(BenchError::HardValidation(HardValidationError::InvalidFieldValue {
                field: "outputs",
                ..
            }))
        ));
    }

    #[test]
    fn test_info_preserves_metadata() {
        let benchmark = Benchmark::new(NoopExecutor::boxed(Runtime::Cpu), key("CPU"), "mobilenet_v1")
            .unwrap()
            .with_inputs(
                vec!["input".to_string()],
                vec![PathBuf::from("input.bin")],
                vec![vec![1, 224, 224, 3]],
            )
            .unwrap()
            .with_outputs(vec!["output".to_string()], vec![vec![1, 1001]])
            .unwrap();

        let info = benchmark.info();
        assert_eq!(info.key, key("CPU"));
        assert_eq!(info.model_file, "mobilenet_v1");
        assert_eq!(info.inputs[0].shape, vec![1, 224, 224, 3]);
        assert_eq!(info.outputs[0].name, "output");
    }

    #[test]
    fn test_run_without_io_counts_iterations() {
        let mut benchmark =
            Benchmark::new(NoopExecutor::boxed(Runtime::Cpu), key("CPU"), "mobilenet").unwrap();
        let options = RunOptions {
            iterations: 5,
            warmup_iterations: 2,
            ..RunOptions::default()
        };

        let timings = benchmark.run(&options).unwrap();
        assert_eq!(timings.run_samples_us.len(), 5);
        assert!(timings.init_seconds >= 0.0);
        assert!(timings.run_seconds >= 0.0);
    }

    #[test]
    fn test_mean_run_seconds() {
        let timings = RunTimings {
            init_seconds: 0.0,
            run_seconds: 0.5,
            warmup_seconds: 0.0,
            run_samples_us: vec![],
            warmup_iterations: 0,
            iterations: 5,
        };
        assert!((timings.mean_run_seconds() - 0.1).abs() < 1e-9);
    }
}
