// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Monotonic microsecond clock used to bracket benchmark phases.
//!
//! Built on [`Instant`], so readings never jump backward when the wall clock
//! is adjusted.

use std::time::{Duration, Instant};

use lazy_static::lazy_static;

lazy_static! {
    static ref CLOCK_ANCHOR: Instant = Instant::now();
}

/// Microseconds elapsed since the first clock read in this process.
/// Successive reads never decrease.
pub fn now_micros() -> u64 {
    CLOCK_ANCHOR.elapsed().as_micros() as u64
}

/// Convert a microsecond count to fractional seconds.
pub fn micros_to_seconds(micros: u64) -> f64 {
    micros as f64 / 1_000_000.0
}

/// Timer for measuring a single phase.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start_us: u64,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start_us: now_micros(),
        }
    }

    /// Elapsed microseconds since start.
    pub fn elapsed_micros(&self) -> u64 {
        now_micros().saturating_sub(self.start_us)
    }

    /// Elapsed time since start in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        micros_to_seconds(self.elapsed_micros())
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_micros())
    }
}

/// Measure the execution time of a closure in microseconds.
pub fn measure<F, T>(f: F) -> (T, u64)
where
    F: FnOnce() -> T,
{
    let timer = Timer::start();
    let result = f();
    (result, timer.elapsed_micros())
}
