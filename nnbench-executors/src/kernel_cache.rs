// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! On-disk cache of compiled GPU kernels.
//!
//! Each (model, device) pair owns one entry `<dir>/<model>.<device>.bin`
//! holding a magic tag and the CRC32 of the graph it was compiled from. A
//! matching entry is reused; a missing or stale one is rewritten.

use std::fs;
use std::path::{Path, PathBuf};

use nnbench_core::{BenchError, BenchResult, KernelCacheConfig};

/// Magic bytes identifying a kernel cache entry.
const CACHE_MAGIC: &[u8; 4] = b"NNBK";

/// Result of looking up a kernel cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Kernels for this graph were already cached.
    Hit,
    /// Entry missing or stale; kernels compiled and written.
    Compiled,
}

/// Kernel cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct KernelCache {
    dir: PathBuf,
}

impl KernelCache {
    pub fn new(config: &KernelCacheConfig) -> Self {
        Self {
            dir: config.dir.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, model: &str, device: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.bin", model, device))
    }

    /// Reuse the entry for `graph` or compile and persist a new one.
    pub fn load_or_compile(&self, model: &str, device: &str, graph: &[u8]) -> BenchResult<CacheOutcome> {
        let path = self.entry_path(model, device);
        let checksum = crc32fast::hash(graph);

        if let Ok(existing) = fs::read(&path) {
            if decode_entry(&existing) == Some(checksum) {
                tracing::debug!(path = %path.display(), "Kernel cache hit");
                return Ok(CacheOutcome::Hit);
            }
            tracing::debug!(path = %path.display(), "Kernel cache entry stale");
        }

        fs::create_dir_all(&self.dir).map_err(|e| BenchError::Io {
            context: "creating kernel cache directory",
            source: e,
        })?;
        fs::write(&path, encode_entry(checksum)).map_err(|e| BenchError::Io {
            context: "writing kernel cache entry",
            source: e,
        })?;

        tracing::info!(path = %path.display(), "Compiled kernels cached");
        Ok(CacheOutcome::Compiled)
    }
}

fn encode_entry(checksum: u32) -> Vec<u8> {
    let mut entry = Vec::with_capacity(8);
    entry.extend_from_slice(CACHE_MAGIC);
    entry.extend_from_slice(&checksum.to_le_bytes());
    entry
}

fn decode_entry(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 8 || &bytes[..4] != CACHE_MAGIC {
        return None;
    }
    Some(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(dir: &Path) -> KernelCache {
        KernelCache::new(&KernelCacheConfig {
            dir: dir.join("interior"),
        })
    }

    #[test]
    fn test_compile_then_hit() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(temp_dir.path());

        assert_eq!(
            cache.load_or_compile("mobilenet", "gpu", b"graph").unwrap(),
            CacheOutcome::Compiled
        );
        assert!(cache.entry_path("mobilenet", "gpu").exists());
        assert_eq!(
            cache.load_or_compile("mobilenet", "gpu", b"graph").unwrap(),
            CacheOutcome::Hit
        );
    }

    #[test]
    fn test_changed_graph_recompiles() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(temp_dir.path());

        cache.load_or_compile("mobilenet", "gpu", b"graph-v1").unwrap();
        assert_eq!(
            cache.load_or_compile("mobilenet", "gpu", b"graph-v2").unwrap(),
            CacheOutcome::Compiled
        );
    }

    #[test]
    fn test_entries_are_per_device() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(temp_dir.path());

        cache.load_or_compile("mobilenet", "gpu", b"graph").unwrap();
        assert_eq!(
            cache.load_or_compile("mobilenet", "hexagon", b"graph").unwrap(),
            CacheOutcome::Compiled
        );
    }

    #[test]
    fn test_corrupt_entry_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(temp_dir.path());
        std::fs::create_dir_all(cache.dir()).unwrap();
        std::fs::write(cache.entry_path("mobilenet", "gpu"), b"junk").unwrap();

        assert_eq!(
            cache.load_or_compile("mobilenet", "gpu", b"graph").unwrap(),
            CacheOutcome::Compiled
        );
        assert_eq!(
            decode_entry(&std::fs::read(cache.entry_path("mobilenet", "gpu")).unwrap()),
            Some(crc32fast::hash(b"graph"))
        );
    }
}
