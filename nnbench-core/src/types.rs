// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated benchmark identity.
//!
//! A benchmark is addressed by the (model name, framework, runtime) triple.
//! All identifier types validate their invariants at creation time.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Maximum identifier length for model and framework names.
const MAX_IDENTIFIER_LEN: usize = 64;

/// Shared rule for model and framework identifiers: non-empty, at most 64
/// chars, alphanumeric plus `-`, `_` and `.`.
fn validate_identifier(field: &'static str, value: &str) -> Result<(), HardValidationError> {
    if value.is_empty() {
        return Err(HardValidationError::InvalidFieldValue {
            field,
            value: value.to_string(),
            reason: "Identifier cannot be empty".to_string(),
        });
    }

    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(HardValidationError::InvalidFieldValue {
            field,
            value: value.to_string(),
            reason: format!(
                "Identifier too long: {} chars (max {})",
                value.len(),
                MAX_IDENTIFIER_LEN
            ),
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(HardValidationError::InvalidFieldValue {
            field,
            value: value.to_string(),
            reason: "Identifier must contain only alphanumeric characters, '-', '_' and '.'"
                .to_string(),
        });
    }

    Ok(())
}

/// Validated model name, the first component of a benchmark key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelName(String);

impl ModelName {
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        let name = name.into();
        validate_identifier("model_name", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ModelName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelName> for String {
    fn from(name: ModelName) -> Self {
        name.0
    }
}

/// Validated framework name (e.g. `mace`, `tflite`, `passthrough`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Framework(String);

impl Framework {
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        let name = name.into();
        validate_identifier("framework", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Framework {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Framework> for String {
    fn from(name: Framework) -> Self {
        name.0
    }
}

/// Target compute device class a benchmark executes on.
///
/// Adapters map this onto their own device types and fall back to their CPU
/// device for any runtime they do not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Runtime {
    Cpu,
    Gpu,
    Dsp,
    Hta,
    Apu,
    CpuGpu,
}

impl Runtime {
    pub const ALL: [Runtime; 6] = [
        Runtime::Cpu,
        Runtime::Gpu,
        Runtime::Dsp,
        Runtime::Hta,
        Runtime::Apu,
        Runtime::CpuGpu,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
            Self::Dsp => "DSP",
            Self::Hta => "HTA",
            Self::Apu => "APU",
            Self::CpuGpu => "CPU+GPU",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Runtime {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CPU" => Ok(Self::Cpu),
            "GPU" => Ok(Self::Gpu),
            "DSP" => Ok(Self::Dsp),
            "HTA" => Ok(Self::Hta),
            "APU" => Ok(Self::Apu),
            "CPU+GPU" | "CPU_GPU" => Ok(Self::CpuGpu),
            _ => Err(HardValidationError::UnknownRuntime {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Runtime {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Runtime> for String {
    fn from(runtime: Runtime) -> Self {
        runtime.name().to_string()
    }
}

/// Registry key: the (model name, framework, runtime) triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BenchmarkKey {
    pub model_name: ModelName,
    pub framework: Framework,
    pub runtime: Runtime,
}

impl BenchmarkKey {
    pub fn new(model_name: ModelName, framework: Framework, runtime: Runtime) -> Self {
        Self {
            model_name,
            framework,
            runtime,
        }
    }

    /// Build a key from the three strings a driver supplies.
    pub fn parse(
        model_name: &str,
        framework: &str,
        runtime: &str,
    ) -> Result<Self, HardValidationError> {
        Ok(Self {
            model_name: ModelName::new(model_name)?,
            framework: Framework::new(framework)?,
            runtime: runtime.parse()?,
        })
    }
}

impl fmt::Display for BenchmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.model_name, self.framework, self.runtime)
    }
}

/// On-disk identity of a model.
///
/// A model is referenced by a base path; the graph definition lives in
/// `<base>.pb` and the weights in `<base>.data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    base: PathBuf,
}

impl ModelSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// File stem used for derived artifacts such as kernel caches.
    pub fn stem(&self) -> String {
        self.base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string())
    }

    pub fn graph_file(&self) -> PathBuf {
        self.with_suffix(".pb")
    }

    pub fn data_file(&self) -> PathBuf {
        self.with_suffix(".data")
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path = self.base.clone().into_os_string();
        path.push(suffix);
        PathBuf::from(path)
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.display())
    }
}

/// Which CPU class an adapter's worker threads are pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuAffinityPolicy {
    None,
    #[default]
    BigOnly,
    LittleOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name_valid() {
        assert!(ModelName::new("mobilenet_v1").is_ok());
        assert!(ModelName::new("inception-v3").is_ok());
        assert!(ModelName::new("resnet50.quant").is_ok());
    }

    #[test]
    fn test_model_name_invalid() {
        assert!(ModelName::new("").is_err());
        assert!(ModelName::new("a".repeat(65)).is_err());
        assert!(ModelName::new("model name").is_err());
        assert!(ModelName::new("model/name").is_err());
    }

    #[test]
    fn test_framework_invalid() {
        assert!(Framework::new("").is_err());
        assert!(Framework::new("tf@lite").is_err());
    }

    #[test]
    fn test_runtime_parse() {
        assert_eq!("CPU".parse::<Runtime>().unwrap(), Runtime::Cpu);
        assert_eq!("gpu".parse::<Runtime>().unwrap(), Runtime::Gpu);
        assert_eq!(" dsp ".parse::<Runtime>().unwrap(), Runtime::Dsp);
        assert_eq!("CPU_GPU".parse::<Runtime>().unwrap(), Runtime::CpuGpu);
        assert!("TPU".parse::<Runtime>().is_err());
    }

    #[test]
    fn test_runtime_name_roundtrip() {
        for runtime in Runtime::ALL {
            assert_eq!(runtime.name().parse::<Runtime>().unwrap(), runtime);
        }
    }

    #[test]
    fn test_key_display() {
        let key = BenchmarkKey::parse("mobilenet", "mace", "CPU").unwrap();
        assert_eq!(key.to_string(), "mobilenet/mace/CPU");
    }

    #[test]
    fn test_model_source_suffixes() {
        let source = ModelSource::new("/models/mobilenet_v1");
        assert_eq!(source.graph_file(), PathBuf::from("/models/mobilenet_v1.pb"));
        assert_eq!(source.data_file(), PathBuf::from("/models/mobilenet_v1.data"));
        assert_eq!(source.stem(), "mobilenet_v1");
    }

    #[test]
    fn test_affinity_policy_deserialize() {
        let policy: CpuAffinityPolicy = serde_yaml::from_str("little_only").unwrap();
        assert_eq!(policy, CpuAffinityPolicy::LittleOnly);
    }
}
