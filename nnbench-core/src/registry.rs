// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark registry keyed by (model name, framework, runtime).
//!
//! Registrations are collected before the run phase. The process-wide
//! instance is created on first use; standalone registries can be built for
//! tests or embedding.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lazy_static::lazy_static;

use crate::benchmark::{Benchmark, BenchmarkInfo, RunOptions, RunTimings};
use crate::error::{BenchError, BenchResult};
use crate::types::BenchmarkKey;

lazy_static! {
    static ref GLOBAL_REGISTRY: BenchmarkRegistry = BenchmarkRegistry::new();
}

/// The process-wide registry used by [`run`] and `nnbench_benchmark!`.
pub fn global() -> &'static BenchmarkRegistry {
    &GLOBAL_REGISTRY
}

/// Look up a benchmark in the process-wide registry and execute it with
/// default options.
pub fn run(model_name: &str, framework: &str, runtime: &str) -> BenchResult<RunTimings> {
    let key = BenchmarkKey::parse(model_name, framework, runtime)?;
    global().run(&key, &RunOptions::default())
}

/// Registry of benchmarks.
/// Each entry sits behind its own lock so a running benchmark never blocks
/// lookups of other keys.
#[derive(Debug, Default)]
pub struct BenchmarkRegistry {
    benchmarks: DashMap<BenchmarkKey, Arc<Mutex<Benchmark>>>,
}

impl BenchmarkRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            benchmarks: DashMap::new(),
        }
    }

    /// Register a benchmark. A second registration of the same triple is
    /// rejected and the first one stays in place.
    pub fn register(&self, benchmark: Benchmark) -> BenchResult<()> {
        let key = benchmark.key().clone();

        match self.benchmarks.entry(key) {
            Entry::Occupied(entry) => Err(BenchError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(benchmark = %entry.key(), "Benchmark registered");
                entry.insert(Arc::new(Mutex::new(benchmark)));
                Ok(())
            }
        }
    }

    /// Remove a benchmark, returning its metadata.
    pub fn unregister(&self, key: &BenchmarkKey) -> BenchResult<BenchmarkInfo> {
        self.benchmarks
            .remove(key)
            .map(|(_, entry)| {
                let info = lock(&entry).info();
                info
            })
            .ok_or_else(|| BenchError::NotRegistered(key.clone()))
    }

    /// Check if a benchmark exists.
    pub fn contains(&self, key: &BenchmarkKey) -> bool {
        self.benchmarks.contains_key(key)
    }

    /// Get the number of registered benchmarks.
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// All registered keys in sorted order.
    pub fn keys(&self) -> Vec<BenchmarkKey> {
        let mut keys: Vec<_> = self.benchmarks.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Metadata of a registered benchmark.
    pub fn info(&self, key: &BenchmarkKey) -> BenchResult<BenchmarkInfo> {
        let entry = self.entry(key)?;
        let info = lock(&entry).info();
        Ok(info)
    }

    /// Look up `key` and execute it. An unknown key fails before any
    /// executor method is invoked.
    pub fn run(&self, key: &BenchmarkKey, options: &RunOptions) -> BenchResult<RunTimings> {
        let entry = self.entry(key)?;
        let mut benchmark = lock(&entry);
        benchmark.run(options)
    }

    fn entry(&self, key: &BenchmarkKey) -> BenchResult<Arc<Mutex<Benchmark>>> {
        self.benchmarks
            .get(key)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| BenchError::NotRegistered(key.clone()))
    }
}

fn lock(entry: &Mutex<Benchmark>) -> std::sync::MutexGuard<'_, Benchmark> {
    // A panic inside an executor leaves the benchmark metadata intact
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Executor, ExecutorBase};
    use crate::tensor::{InputTensors, OutputTensors};
    use crate::types::{ModelSource, Runtime};

    struct NoopExecutor {
        base: ExecutorBase,
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

    fn make_benchmark(model: &str, runtime: Runtime) -> Benchmark {
        let executor = Box::new(NoopExecutor {
            base: ExecutorBase::new("noop", runtime, vec![], vec![]),
        });
        let key = BenchmarkKey::parse(model, "noop", runtime.name()).unwrap();
        Benchmark::new(executor, key, model).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = BenchmarkRegistry::new();
        registry
            .register(make_benchmark("mobilenet", Runtime::Cpu))
            .unwrap();

        let key = BenchmarkKey::parse("mobilenet", "noop", "CPU").unwrap();
        assert!(registry.contains(&key));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.info(&key).unwrap().model_file, "mobilenet");
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = BenchmarkRegistry::new();

        assert!(registry
            .register(make_benchmark("mobilenet", Runtime::Cpu))
            .is_ok());
        assert!(matches!(
            registry.register(make_benchmark("mobilenet", Runtime::Cpu)),
            Err(BenchError::AlreadyRegistered(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_model_different_runtime() {
        let registry = BenchmarkRegistry::new();
        registry
            .register(make_benchmark("mobilenet", Runtime::Cpu))
            .unwrap();
        registry
            .register(make_benchmark("mobilenet", Runtime::Gpu))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregistered_lookup() {
        let registry = BenchmarkRegistry::new();
        let key = BenchmarkKey::parse("mobilenet", "noop", "CPU").unwrap();

        assert!(matches!(
            registry.run(&key, &RunOptions::default()),
            Err(BenchError::NotRegistered(_))
        ));
        assert!(registry.info(&key).is_err());
    }

    #[test]
    fn test_unregister() {
        let registry = BenchmarkRegistry::new();
        registry
            .register(make_benchmark("mobilenet", Runtime::Cpu))
            .unwrap();
        let key = BenchmarkKey::parse("mobilenet", "noop", "CPU").unwrap();

        assert!(registry.unregister(&key).is_ok());
        assert!(registry.is_empty());
        assert!(registry.unregister(&key).is_err());
    }

    #[test]
    fn test_keys_sorted() {
        let registry = BenchmarkRegistry::new();
        registry.register(make_benchmark("resnet", Runtime::Cpu)).unwrap();
        registry
            .register(make_benchmark("inception", Runtime::Cpu))
            .unwrap();

        let keys = registry.keys();
        assert_eq!(keys[0].model_name.as_str(), "inception");
        assert_eq!(keys[1].model_name.as_str(), "resnet");
    }

    #[test]
    fn test_concurrent_registration() {
        use std::thread;

        let registry = Arc::new(BenchmarkRegistry::new());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    reg.register(make_benchmark(&format!("model-{}", i), Runtime::Cpu))
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 10);
    }
}
