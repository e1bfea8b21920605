// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CPU affinity classes for executor worker threads.
//!
//! Big/little cores are told apart by their maximum frequency as reported
//! under `/sys/devices/system/cpu`. Without frequency info every CPU belongs
//! to a single class.

use std::path::Path;

use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
use nix::unistd::{gettid, Pid};
use nnbench_core::CpuAffinityPolicy;

const SYSFS_CPU_ROOT: &str = "/sys/devices/system/cpu";

/// Logical CPUs with their maximum frequency in kHz, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTopology {
    cpus: Vec<(usize, Option<u64>)>,
}

impl CpuTopology {
    /// Detect the topology of the running machine.
    pub fn detect() -> Self {
        Self::detect_from(Path::new(SYSFS_CPU_ROOT))
    }

    /// Detect the topology from a sysfs-style tree rooted at `root`.
    /// Falls back to `num_cpus` logical CPUs without frequency info.
    pub fn detect_from(root: &Path) -> Self {
        let online = std::fs::read_to_string(root.join("online"))
            .map(|list| parse_cpu_list(list.trim()))
            .unwrap_or_default();

        let ids = if online.is_empty() {
            (0..num_cpus::get()).collect()
        } else {
            online
        };

        let cpus = ids
            .into_iter()
            .map(|cpu| {
                let freq_path = root
                    .join(format!("cpu{}", cpu))
                    .join("cpufreq")
                    .join("cpuinfo_max_freq");
                let freq = std::fs::read_to_string(freq_path)
                    .ok()
                    .and_then(|f| f.trim().parse::<u64>().ok());
                (cpu, freq)
            })
            .collect();

        Self { cpus }
    }

    pub fn from_frequencies(cpus: Vec<(usize, Option<u64>)>) -> Self {
        Self { cpus }
    }

    /// Get the number of logical CPUs.
    pub fn num_cpus(&self) -> usize {
        self.cpus.len()
    }

    /// CPUs belonging to the class `policy` selects, in ascending order.
    /// `None` yields no CPUs, meaning "leave affinity alone".
    pub fn cpus_for(&self, policy: CpuAffinityPolicy) -> Vec<usize> {
        let max_freq = self.cpus.iter().filter_map(|(_, f)| *f).max();

        let mut selected: Vec<usize> = match (policy, max_freq) {
            (CpuAffinityPolicy::None, _) => Vec::new(),
            (_, None) => self.cpus.iter().map(|(cpu, _)| *cpu).collect(),
            (CpuAffinityPolicy::BigOnly, Some(max)) => self
                .cpus
                .iter()
                .filter(|(_, f)| *f == Some(max))
                .map(|(cpu, _)| *cpu)
                .collect(),
            (CpuAffinityPolicy::LittleOnly, Some(max)) => {
                let little: Vec<usize> = self
                    .cpus
                    .iter()
                    .filter(|(_, f)| f.map(|f| f < max).unwrap_or(false))
                    .map(|(cpu, _)| *cpu)
                    .collect();
                // Homogeneous machines have no little cores
                if little.is_empty() {
                    self.cpus.iter().map(|(cpu, _)| *cpu).collect()
                } else {
                    little
                }
            }
        };

        selected.sort_unstable();
        selected
    }

    /// The first `num_threads` CPUs of the selected class.
    pub fn select(&self, policy: CpuAffinityPolicy, num_threads: usize) -> Vec<usize> {
        let mut cpus = self.cpus_for(policy);
        cpus.truncate(num_threads.max(1));
        cpus
    }
}

/// A thread pinned to a CPU set. Dropping it restores the mask the thread
/// had before pinning.
#[derive(Debug)]
pub struct ThreadPin {
    tid: Pid,
    previous: CpuSet,
    cpus: Vec<usize>,
}

impl ThreadPin {
    pub fn cpus(&self) -> &[usize] {
        &self.cpus
    }
}

impl Drop for ThreadPin {
    fn drop(&mut self) {
        match sched_setaffinity(self.tid, &self.previous) {
            Ok(()) => tracing::debug!(tid = %self.tid, "Thread affinity restored"),
            Err(e) => tracing::warn!(tid = %self.tid, error = %e, "Thread affinity not restored"),
        }
    }
}

/// Pin the calling thread to `cpus` until the returned pin is dropped.
/// An empty set leaves affinity unchanged and returns `None`.
pub fn pin_current_thread(cpus: &[usize]) -> Result<Option<ThreadPin>, nix::Error> {
    if cpus.is_empty() {
        return Ok(None);
    }

    let mut cpuset = CpuSet::new();
    for cpu in cpus {
        cpuset.set(*cpu)?;
    }

    // Explicit tid so the restore targets this thread wherever the pin drops
    let tid = gettid();
    let previous = sched_getaffinity(tid)?;
    sched_setaffinity(tid, &cpuset)?;

    tracing::debug!(cpus = ?cpus, "Thread pinned to CPUs");
    Ok(Some(ThreadPin {
        tid,
        previous,
        cpus: cpus.to_vec(),
    }))
}

/// Number of CPUs the calling thread may run on.
pub fn current_affinity_count() -> Result<usize, nix::Error> {
    let set = sched_getaffinity(gettid())?;
    Ok((0..CpuSet::count())
        .filter(|&cpu| set.is_set(cpu).unwrap_or(false))
        .count())
}

/// Parse a CPU list string like "0-3,8-11" into a Vec of CPU indices.
fn parse_cpu_list(s: &str) -> Vec<usize> {
    let mut cpus = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if let Some((start, end)) = part.split_once('-') {
            if let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) {
                cpus.extend(start..=end);
            }
        } else if let Ok(cpu) = part.parse::<usize>() {
            cpus.push(cpu);
        }
    }
    cpus
}
