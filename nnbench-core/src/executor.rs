// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Executor capability interface and shared adapter state.
//!
//! Every inference backend is wrapped by one [`Executor`] implementation.
//! Adapters embed an [`ExecutorBase`] which tracks the lifecycle
//! Uninitialized → Initialized → Prepared → Finished and validates the tensor
//! name sets handed to `run`.

use std::collections::BTreeSet;

use crate::error::{BenchError, BenchResult, StateTransitionError};
use crate::tensor::{InputTensors, OutputTensors};
use crate::types::{ModelSource, Runtime};

/// Executor lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// Constructed, no engine artifacts exist yet.
    Uninitialized,

    /// One-time warmup done (e.g. kernels compiled and cached on device).
    Initialized,

    /// A runnable engine instance is held in memory.
    Prepared,

    /// Engine instance released.
    Finished,
}

impl ExecutorState {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initialized => "Initialized",
            Self::Prepared => "Prepared",
            Self::Finished => "Finished",
        }
    }

    /// Check if transition to the target state is valid.
    pub fn can_transition_to(&self, target: ExecutorState) -> bool {
        matches!(
            (self, target),
            // Init may be skipped by backends without warmup cost
            (Self::Uninitialized, Self::Initialized) |
            (Self::Uninitialized, Self::Prepared) |
            (Self::Initialized, Self::Prepared) |
            (Self::Initialized, Self::Finished) |
            (Self::Prepared, Self::Finished) |
            // A registered benchmark may be executed again
            (Self::Finished, Self::Initialized) |
            (Self::Finished, Self::Prepared)
        )
    }
}

impl std::fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Adapter over one native inference engine.
///
/// No backend-specific type crosses this interface: adapters translate
/// [`crate::BaseTensor`] views to native tensors inside `run` and report
/// engine failures as [`BenchError`].
pub trait Executor: Send {
    /// Shared adapter state.
    fn base(&self) -> &ExecutorBase;

    /// Target runtime this executor was constructed for.
    fn runtime(&self) -> Runtime {
        self.base().runtime()
    }

    /// One-time warmup whose cost is excluded from steady-state timings.
    fn init(&mut self, model: &ModelSource, num_threads: usize) -> BenchResult<()>;

    /// Load graph and weights and create a runnable engine instance.
    fn prepare(&mut self, model: &ModelSource) -> BenchResult<()>;

    /// Execute one forward pass, writing into the caller's output buffers.
    fn run(&mut self, inputs: &InputTensors<'_>, outputs: &mut OutputTensors<'_>)
        -> BenchResult<()>;

    /// Release the engine instance. No-op when `prepare` never ran.
    fn finish(&mut self);
}

/// State shared by every executor implementation.
#[derive(Debug, Clone)]
pub struct ExecutorBase {
    framework: String,
    runtime: Runtime,
    num_threads: usize,
    input_names: Vec<String>,
    output_names: Vec<String>,
    state: ExecutorState,
}

impl ExecutorBase {
    pub fn new(
        framework: impl Into<String>,
        runtime: Runtime,
        input_names: Vec<String>,
        output_names: Vec<String>,
    ) -> Self {
        Self {
            framework: framework.into(),
            runtime,
            num_threads: 1,
            input_names,
            output_names,
            state: ExecutorState::Uninitialized,
        }
    }

    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn set_num_threads(&mut self, num_threads: usize) {
        self.num_threads = num_threads.max(1);
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    /// Attempt to transition to a new state.
    pub fn transition_to(&mut self, target: ExecutorState) -> Result<(), StateTransitionError> {
        if !self.state.can_transition_to(target) {
            return Err(StateTransitionError::InvalidTransition {
                framework: self.framework.clone(),
                from: self.state.name(),
                to: target.name(),
            });
        }

        tracing::debug!(
            framework = %self.framework,
            runtime = %self.runtime,
            from = self.state.name(),
            to = target.name(),
            "Executor state transition"
        );

        self.state = target;
        Ok(())
    }

    /// Move to Finished if an init or prepare happened; otherwise nothing.
    pub fn mark_finished(&mut self) {
        if matches!(
            self.state,
            ExecutorState::Initialized | ExecutorState::Prepared
        ) {
            // Both source states permit Finished
            let _ = self.transition_to(ExecutorState::Finished);
        }
    }

    /// Fails unless an engine instance is ready to run.
    pub fn ensure_prepared(&self) -> BenchResult<()> {
        if self.state != ExecutorState::Prepared {
            return Err(BenchError::EngineNotPrepared {
                framework: self.framework.clone(),
            });
        }
        Ok(())
    }

    /// The input and output name sets must equal the names fixed at
    /// construction.
    pub fn check_io_names(
        &self,
        inputs: &InputTensors<'_>,
        outputs: &OutputTensors<'_>,
    ) -> BenchResult<()> {
        check_names("input", &self.input_names, inputs.keys())?;
        check_names("output", &self.output_names, outputs.keys())
    }
}

fn check_names<'a>(
    kind: &'static str,
    expected: &[String],
    actual: impl Iterator<Item = &'a String>,
) -> BenchResult<()> {
    let expected_set: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    let actual_set: BTreeSet<&str> = actual.map(String::as_str).collect();

    if expected_set.len() != expected.len() || expected_set != actual_set {
        return Err(BenchError::TensorNameMismatch {
            kind,
            expected: expected.to_vec(),
            actual: actual_set.into_iter().map(str::to_string).collect(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{BaseTensor, BaseTensorMut};

    fn make_base() -> ExecutorBase {
        ExecutorBase::new(
            "mace",
            Runtime::Cpu,
            vec!["input".to_string()],
            vec!["output".to_string()],
        )
    }

    #[test]
    fn test_initial_state() {
        let base = make_base();
        assert_eq!(base.state(), ExecutorState::Uninitialized);
        assert_eq!(base.num_threads(), 1);
    }

    #[test]
    fn test_valid_transitions() {
        let mut base = make_base();

        assert!(base.transition_to(ExecutorState::Initialized).is_ok());
        assert!(base.transition_to(ExecutorState::Prepared).is_ok());
        assert!(base.ensure_prepared().is_ok());
        assert!(base.transition_to(ExecutorState::Finished).is_ok());

        // Re-run after finish
        assert!(base.transition_to(ExecutorState::Initialized).is_ok());
    }

    #[test]
    fn test_prepare_without_init() {
        let mut base = make_base();
        assert!(base.transition_to(ExecutorState::Prepared).is_ok());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut base = make_base();

        assert!(base.transition_to(ExecutorState::Finished).is_err());
        assert_eq!(base.state(), ExecutorState::Uninitialized);

        base.transition_to(ExecutorState::Prepared).unwrap();
        assert!(base.transition_to(ExecutorState::Initialized).is_err());
        assert!(base.transition_to(ExecutorState::Prepared).is_err());
    }

    #[test]
    fn test_mark_finished_noop_before_prepare() {
        let mut base = make_base();
        base.mark_finished();
        assert_eq!(base.state(), ExecutorState::Uninitialized);

        base.transition_to(ExecutorState::Initialized).unwrap();
        base.mark_finished();
        assert_eq!(base.state(), ExecutorState::Finished);
    }

    #[test]
    fn test_ensure_prepared_fails_when_uninitialized() {
        let base = make_base();
        assert!(matches!(
            base.ensure_prepared(),
            Err(BenchError::EngineNotPrepared { .. })
        ));
    }

    #[test]
    fn test_check_io_names() {
        let base = make_base();
        let input_data = [1.0f32; 2];
        let mut output_data = [0.0f32; 2];

        let mut inputs = InputTensors::new();
        inputs.insert(
            "input".to_string(),
            BaseTensor::new("input", vec![2], &input_data).unwrap(),
        );
        let mut outputs = OutputTensors::new();
        outputs.insert(
            "output".to_string(),
            BaseTensorMut::new("output", vec![2], &mut output_data).unwrap(),
        );
        assert!(base.check_io_names(&inputs, &outputs).is_ok());

        let renamed = inputs.remove("input").unwrap();
        inputs.insert("image".to_string(), renamed);
        assert!(matches!(
            base.check_io_names(&inputs, &outputs),
            Err(BenchError::TensorNameMismatch { kind: "input", .. })
        ));
    }

    #[test]
    fn test_check_io_names_extra_output() {
        let base = make_base();
        let input_data = [1.0f32; 1];
        let mut out_a = [0.0f32; 1];
        let mut out_b = [0.0f32; 1];

        let mut inputs = InputTensors::new();
        inputs.insert(
            "input".to_string(),
            BaseTensor::new("input", vec![1], &input_data).unwrap(),
        );
        let mut outputs = OutputTensors::new();
        outputs.insert(
            "output".to_string(),
            BaseTensorMut::new("output", vec![1], &mut out_a).unwrap(),
        );
        outputs.insert(
            "extra".to_string(),
            BaseTensorMut::new("extra", vec![1], &mut out_b).unwrap(),
        );
        assert!(base.check_io_names(&inputs, &outputs).is_err());
    }
}
