// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML benchmark suite parser with strict schema validation.
//!
//! A suite file lists the benchmarks to register and the harness settings
//! they run with. Any invalid field results in a HardValidationError before
//! a single benchmark is registered.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::benchmark::{ensure_unique_names, Benchmark, RunOptions};
use crate::error::{BenchError, BenchResult, HardValidationError};
use crate::executor::Executor;
use crate::types::{BenchmarkKey, CpuAffinityPolicy, Framework, ModelName, Runtime};

/// Environment variable naming the GPU kernel cache directory.
pub const KERNEL_CACHE_ENV: &str = "NNBENCH_KERNEL_CACHE_PATH";

/// Kernel cache directory used when nothing else is configured.
pub const DEFAULT_KERNEL_CACHE_DIR: &str = "./interior";

/// Upper bound on worker threads an adapter may be asked to spawn.
const MAX_NUM_THREADS: usize = 256;

/// Raw input entry as parsed from YAML.
#[derive(Debug, Deserialize)]
struct RawInput {
    name: String,
    file: String,
    shape: Vec<usize>,
}

/// Raw output entry as parsed from YAML.
#[derive(Debug, Deserialize)]
struct RawOutput {
    name: String,
    shape: Vec<usize>,
}

/// Raw benchmark entry (before validation).
#[derive(Debug, Deserialize)]
struct RawBenchmarkConfig {
    model_name: String,
    framework: String,
    runtime: String,
    #[serde(default)]
    model_file: Option<String>,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    outputs: Vec<RawOutput>,
}

/// Raw harness configuration.
#[derive(Debug, Deserialize)]
struct RawHarnessConfig {
    #[serde(default = "default_dir")]
    model_dir: String,
    #[serde(default = "default_dir")]
    input_dir: String,
    #[serde(default)]
    kernel_cache_dir: Option<String>,
    #[serde(default = "default_warmup_iterations")]
    warmup_iterations: u32,
    #[serde(default = "default_iterations")]
    iterations: u32,
    #[serde(default = "default_num_threads")]
    num_threads: usize,
    #[serde(default)]
    cpu_affinity: CpuAffinityPolicy,
}

fn default_dir() -> String {
    ".".to_string()
}

fn default_warmup_iterations() -> u32 {
    1
}

fn default_iterations() -> u32 {
    10
}

fn default_num_threads() -> usize {
    4
}

impl Default for RawHarnessConfig {
    fn default() -> Self {
        Self {
            model_dir: default_dir(),
            input_dir: default_dir(),
            kernel_cache_dir: None,
            warmup_iterations: default_warmup_iterations(),
            iterations: default_iterations(),
            num_threads: default_num_threads(),
            cpu_affinity: CpuAffinityPolicy::default(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawSuiteConfig {
    #[serde(default)]
    harness: RawHarnessConfig,
    benchmarks: Vec<RawBenchmarkConfig>,
}

/// Where GPU-class backends persist compiled kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelCacheConfig {
    pub dir: PathBuf,
}

impl KernelCacheConfig {
    /// Resolve the cache directory once: an explicit override wins, then
    /// `NNBENCH_KERNEL_CACHE_PATH`, then `./interior`.
    pub fn resolve(override_dir: Option<&Path>) -> Self {
        Self::resolve_with(override_dir, std::env::var_os(KERNEL_CACHE_ENV).map(PathBuf::from))
    }

    fn resolve_with(override_dir: Option<&Path>, env_dir: Option<PathBuf>) -> Self {
        let dir = override_dir
            .map(Path::to_path_buf)
            .or(env_dir.filter(|d| !d.as_os_str().is_empty()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KERNEL_CACHE_DIR));
        Self { dir }
    }
}

impl Default for KernelCacheConfig {
    fn default() -> Self {
        Self::resolve(None)
    }
}

/// Validated harness settings.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub model_dir: PathBuf,
    pub input_dir: PathBuf,
    pub kernel_cache: KernelCacheConfig,
    pub warmup_iterations: u32,
    pub iterations: u32,
    pub num_threads: usize,
    pub cpu_affinity: CpuAffinityPolicy,
}

impl HarnessConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            num_threads: self.num_threads,
            warmup_iterations: self.warmup_iterations,
            iterations: self.iterations,
            model_dir: self.model_dir.clone(),
            input_dir: self.input_dir.clone(),
        }
    }
}

/// Validated benchmark entry.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub key: BenchmarkKey,
    pub model_file: String,
    pub input_names: Vec<String>,
    pub input_files: Vec<PathBuf>,
    pub input_shapes: Vec<Vec<usize>>,
    pub output_names: Vec<String>,
    pub output_shapes: Vec<Vec<usize>>,
}

impl BenchmarkConfig {
    /// Bind `executor` to this entry's identity and tensor lists.
    pub fn build(&self, executor: Box<dyn Executor>) -> BenchResult<Benchmark> {
        Benchmark::new(executor, self.key.clone(), &self.model_file)?
            .with_inputs(
                self.input_names.clone(),
                self.input_files.clone(),
                self.input_shapes.clone(),
            )?
            .with_outputs(self.output_names.clone(), self.output_shapes.clone())
    }
}

/// Complete validated suite.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub harness: HarnessConfig,
    pub benchmarks: Vec<BenchmarkConfig>,
}

/// Suite loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a suite from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<SuiteConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading suite file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate a suite from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<SuiteConfig> {
        let raw: RawSuiteConfig =
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawSuiteConfig) -> BenchResult<SuiteConfig> {
        let harness = Self::validate_harness(raw.harness)?;

        let mut benchmarks = Vec::with_capacity(raw.benchmarks.len());
        let mut seen_keys = HashSet::new();

        for (index, raw_bench) in raw.benchmarks.into_iter().enumerate() {
            let bench = Self::validate_benchmark(raw_bench, index)?;

            if !seen_keys.insert(bench.key.clone()) {
                return Err(HardValidationError::DuplicateBenchmark {
                    key: bench.key.to_string(),
                }
                .into());
            }

            benchmarks.push(bench);
        }

        if benchmarks.is_empty() {
            return Err(HardValidationError::SchemaValidation {
                message: "At least one benchmark must be defined".to_string(),
            }
            .into());
        }

        Ok(SuiteConfig {
            harness,
            benchmarks,
        })
    }

    fn validate_harness(raw: RawHarnessConfig) -> BenchResult<HarnessConfig> {
        if raw.iterations == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "iterations",
                value: "0".to_string(),
                reason: "At least one measured iteration is required".to_string(),
            }
            .into());
        }

        if raw.num_threads == 0 || raw.num_threads > MAX_NUM_THREADS {
            return Err(HardValidationError::InvalidFieldValue {
                field: "num_threads",
                value: raw.num_threads.to_string(),
                reason: format!("Must be between 1 and {}", MAX_NUM_THREADS),
            }
            .into());
        }

        let kernel_cache =
            KernelCacheConfig::resolve(raw.kernel_cache_dir.as_deref().map(Path::new));

        Ok(HarnessConfig {
            model_dir: PathBuf::from(raw.model_dir),
            input_dir: PathBuf::from(raw.input_dir),
            kernel_cache,
            warmup_iterations: raw.warmup_iterations,
            iterations: raw.iterations,
            num_threads: raw.num_threads,
            cpu_affinity: raw.cpu_affinity,
        })
    }

    fn validate_benchmark(raw: RawBenchmarkConfig, index: usize) -> BenchResult<BenchmarkConfig> {
        let context = format!("benchmark at index {}", index);

        let model_name = ModelName::new(raw.model_name)?;
        let framework = Framework::new(raw.framework)?;
        let runtime: Runtime = raw.runtime.parse()?;
        let key = BenchmarkKey::new(model_name, framework, runtime);

        let model_file = raw
            .model_file
            .unwrap_or_else(|| key.model_name.as_str().to_string());

        let mut input_names = Vec::with_capacity(raw.inputs.len());
        let mut input_files = Vec::with_capacity(raw.inputs.len());
        let mut input_shapes = Vec::with_capacity(raw.inputs.len());
        for input in raw.inputs {
            Self::validate_tensor("inputs", &input.name, &input.shape, &context)?;
            if input.file.is_empty() {
                return Err(HardValidationError::MissingRequiredField {
                    field: "file",
                    context: format!("input '{}' of {}", input.name, context),
                }
                .into());
            }
            input_names.push(input.name);
            input_files.push(PathBuf::from(input.file));
            input_shapes.push(input.shape);
        }

        let mut output_names = Vec::with_capacity(raw.outputs.len());
        let mut output_shapes = Vec::with_capacity(raw.outputs.len());
        for output in raw.outputs {
            Self::validate_tensor("outputs", &output.name, &output.shape, &context)?;
            output_names.push(output.name);
            output_shapes.push(output.shape);
        }

        ensure_unique_names("inputs", &input_names, &context)?;
        ensure_unique_names("outputs", &output_names, &context)?;

        Ok(BenchmarkConfig {
            key,
            model_file,
            input_names,
            input_files,
            input_shapes,
            output_names,
            output_shapes,
        })
    }

    fn validate_tensor(
        field: &'static str,
        name: &str,
        shape: &[usize],
        context: &str,
    ) -> BenchResult<()> {
        if name.is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "name",
                context: format!("{} of {}", field, context),
            }
            .into());
        }

        if shape.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field,
                value: name.to_string(),
                reason: format!("Tensor shape cannot be empty in {}", context),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
harness:
  model_dir: /data/models
  input_dir: /data/inputs
  kernel_cache_dir: /data/cache
  warmup_iterations: 2
  iterations: 20
  num_threads: 2
  cpu_affinity: little_only

benchmarks:
  - model_name: mobilenet_v1
    framework: passthrough
    runtime: CPU
    model_file: mobilenet_v1_quant
    inputs:
      - name: input
        file: mobilenet_in.bin
        shape: [1, 224, 224, 3]
    outputs:
      - name: output
        shape: [1, 224, 224, 3]
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.benchmarks.len(), 1);

        let bench = &config.benchmarks[0];
        assert_eq!(bench.key.to_string(), "mobilenet_v1/passthrough/CPU");
        assert_eq!(bench.model_file, "mobilenet_v1_quant");
        assert_eq!(bench.input_shapes[0], vec![1, 224, 224, 3]);
        assert_eq!(bench.output_names, vec!["output".to_string()]);

        assert_eq!(config.harness.iterations, 20);
        assert_eq!(config.harness.cpu_affinity, CpuAffinityPolicy::LittleOnly);
        assert_eq!(config.harness.kernel_cache.dir, PathBuf::from("/data/cache"));
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = r#"
benchmarks:
  - model_name: resnet50
    framework: passthrough
    runtime: GPU
"#;
        let config = ConfigLoader::load_string(yaml).unwrap();
        assert_eq!(config.harness.iterations, 10);
        assert_eq!(config.harness.warmup_iterations, 1);
        assert_eq!(config.harness.num_threads, 4);
        assert_eq!(config.harness.cpu_affinity, CpuAffinityPolicy::BigOnly);
        assert_eq!(config.benchmarks[0].model_file, "resnet50");

        let options = config.harness.run_options();
        assert_eq!(options.model_dir, PathBuf::from("."));
    }

    #[test]
    fn test_missing_benchmarks() {
        let yaml = r#"
harness:
  iterations: 5
benchmarks: []
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_unknown_runtime() {
        let yaml = r#"
benchmarks:
  - model_name: resnet50
    framework: passthrough
    runtime: TPU
"#;
        let result = ConfigLoader::load_string(yaml);
        assert!(matches!(
            result,
            Err(BenchError::HardValidation(HardValidationError::UnknownRuntime { .. }))
        ));
    }

    #[test]
    fn test_duplicate_triples() {
        let yaml = r#"
benchmarks:
  - model_name: resnet50
    framework: passthrough
    runtime: CPU
  - model_name: resnet50
    framework: passthrough
    runtime: cpu
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_zero_iterations() {
        let yaml = r#"
harness:
  iterations: 0
benchmarks:
  - model_name: resnet50
    framework: passthrough
    runtime: CPU
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_zero_threads() {
        let yaml = r#"
harness:
  num_threads: 0
benchmarks:
  - model_name: resnet50
    framework: passthrough
    runtime: CPU
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_empty_shape_rejected() {
        let yaml = r#"
benchmarks:
  - model_name: resnet50
    framework: passthrough
    runtime: CPU
    inputs:
      - name: input
        file: in.bin
        shape: []
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_duplicate_input_names_rejected() {
        let yaml = r#"
benchmarks:
  - model_name: resnet50
    framework: passthrough
    runtime: CPU
    inputs:
      - { name: input, file: a.bin, shape: [1] }
      - { name: input, file: b.bin, shape: [1] }
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load_file("/nonexistent/suite.yaml");
        assert!(matches!(result, Err(BenchError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_kernel_cache_resolution_order() {
        let from_override =
            KernelCacheConfig::resolve_with(Some(Path::new("/override")), Some("/env".into()));
        assert_eq!(from_override.dir, PathBuf::from("/override"));

        let from_env = KernelCacheConfig::resolve_with(None, Some("/env".into()));
        assert_eq!(from_env.dir, PathBuf::from("/env"));

        let fallback = KernelCacheConfig::resolve_with(None, None);
        assert_eq!(fallback.dir, PathBuf::from(DEFAULT_KERNEL_CACHE_DIR));

        let empty_env = KernelCacheConfig::resolve_with(None, Some(PathBuf::new()));
        assert_eq!(empty_env.dir, PathBuf::from(DEFAULT_KERNEL_CACHE_DIR));
    }
}
