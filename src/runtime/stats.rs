//! Process-owned timing diagnostics.
//!
//! The allocator's contract does not include instrumentation; throughput
//! and latency live out here with the driver. The embedder decides what to
//! do with a report (the monitor binary displays it).

use std::time::{Duration, Instant};

const WINDOW: usize = 100;

/// One-per-second summary of loop health.
#[derive(Debug, Clone, Copy)]
pub struct TickReport {
    /// Ticks completed since the previous report.
    pub ticks_per_second: u32,
    /// Mean tick duration over the recent window.
    pub avg_tick: Duration,
    /// Worst tick duration over the recent window.
    pub max_tick: Duration,
}

/// Rolling window of tick durations plus a per-second throughput counter.
#[derive(Debug)]
pub struct TickStats {
    window: [u32; WINDOW],
    cursor: usize,
    filled: usize,
    ticks: u32,
    second_started: Instant,
}

impl TickStats {
    pub fn new() -> Self {
        Self {
            window: [0; WINDOW],
            cursor: 0,
            filled: 0,
            ticks: 0,
            second_started: Instant::now(),
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.window[self.cursor] = elapsed.as_micros().min(u32::MAX as u128) as u32;
        self.cursor = (self.cursor + 1) % WINDOW;
        self.filled = (self.filled + 1).min(WINDOW);
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Mean and worst tick duration over the recorded window.
    pub fn summary(&self) -> (Duration, Duration) {
        if self.filled == 0 {
            return (Duration::ZERO, Duration::ZERO);
        }
        let recent = &self.window[..self.filled];
        let sum: u64 = recent.iter().map(|&us| us as u64).sum();
        let max = recent.iter().copied().max().unwrap_or(0);
        (
            Duration::from_micros(sum / self.filled as u64),
            Duration::from_micros(max as u64),
        )
    }

    /// Once per wall-clock second, hand out a report and restart the
    /// throughput counter. Returns `None` between report boundaries.
    pub fn take_report(&mut self) -> Option<TickReport> {
        if self.second_started.elapsed() < Duration::from_secs(1) {
            return None;
        }
        let (avg_tick, max_tick) = self.summary();
        let report = TickReport {
            ticks_per_second: self.ticks,
            avg_tick,
            max_tick,
        };
        self.ticks = 0;
        self.second_started = Instant::now();
        Some(report)
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}
