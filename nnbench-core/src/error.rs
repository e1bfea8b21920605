// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Status codes and error types for nnbench.
//!
//! Every fallible operation returns [`BenchResult`]. The closed [`Status`]
//! set is what a benchmark driver branches on; [`BenchError`] carries the
//! detail for logs and reports.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::BenchmarkKey;

/// Closed outcome code shared by every layer of the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    RuntimeError,
}

impl Status {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::RuntimeError => "RUNTIME_ERROR",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl<T> From<&BenchResult<T>> for Status {
    fn from(result: &BenchResult<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

/// Top-level error type for the harness.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Registry Errors
    // =========================================================================
    #[error("Benchmark not registered: {0}")]
    NotRegistered(BenchmarkKey),

    #[error("Benchmark already registered: {0}")]
    AlreadyRegistered(BenchmarkKey),

    // =========================================================================
    // Executor Lifecycle Errors
    // =========================================================================
    #[error("Invalid executor state transition: {0}")]
    InvalidStateTransition(#[from] StateTransitionError),

    #[error("{framework} engine not prepared - call prepare before run")]
    EngineNotPrepared { framework: String },

    #[error("Failed to create {framework} engine: {reason}")]
    EngineCreation { framework: String, reason: String },

    #[error("{framework} engine execution failed: {reason}")]
    EngineExecution { framework: String, reason: String },

    // =========================================================================
    // Tensor Errors
    // =========================================================================
    #[error("Tensor '{name}' buffer holds {actual} elements, shape requires {expected}")]
    TensorSize {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} names {actual:?} do not match executor {kind} names {expected:?}")]
    TensorNameMismatch {
        kind: &'static str,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("Failed to read {kind} file {path}: {source}")]
    FileRead {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl BenchError {
    /// Collapse the error onto the closed status set.
    pub fn status(&self) -> Status {
        Status::RuntimeError
    }
}

/// Validation errors raised while building identifiers, benchmarks and
/// suite configurations. A suite that fails validation never runs.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown runtime: {value}")]
    UnknownRuntime { value: String },

    #[error("Input lists are not index-aligned: {names} names, {files} files, {shapes} shapes")]
    MisalignedInputs {
        names: usize,
        files: usize,
        shapes: usize,
    },

    #[error("Output lists are not index-aligned: {names} names, {shapes} shapes")]
    MisalignedOutputs { names: usize, shapes: usize },

    #[error("Executor runtime {executor} does not match benchmark runtime {benchmark}")]
    RuntimeMismatch {
        executor: &'static str,
        benchmark: &'static str,
    },

    #[error("Duplicate benchmark: {key}")]
    DuplicateBenchmark { key: String },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Executor lifecycle transition errors.
#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("Cannot transition from {from} to {to} for {framework} executor")]
    InvalidTransition {
        framework: String,
        from: &'static str,
        to: &'static str,
    },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_validation_error_display() {
        let err = HardValidationError::MisalignedInputs {
            names: 2,
            files: 1,
            shapes: 2,
        };
        assert!(err.to_string().contains("2 names"));
        assert!(err.to_string().contains("1 files"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::UnknownRuntime {
            value: "TPU".to_string(),
        };
        let bench_err: BenchError = validation_err.into();
        assert!(matches!(bench_err, BenchError::HardValidation(_)));
        assert_eq!(bench_err.status(), Status::RuntimeError);
    }

    #[test]
    fn test_status_from_result() {
        let ok: BenchResult<u32> = Ok(7);
        assert_eq!(Status::from(&ok), Status::Success);

        let err: BenchResult<u32> = Err(BenchError::EngineExecution {
            framework: "mace".to_string(),
            reason: "boom".to_string(),
        });
        assert_eq!(Status::from(&err), Status::RuntimeError);
        assert!(!Status::from(&err).is_success());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Success.to_string(), "SUCCESS");
        assert_eq!(Status::RuntimeError.to_string(), "RUNTIME_ERROR");
    }
}
