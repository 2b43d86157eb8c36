//! # Throughput Tracking Module
//!
//! Keeps a bounded rolling window of per-file conversion durations and derives
//! a smoothed conversions-per-minute rate plus a rough ETA from it. The window
//! holds the most recent 100 durations, oldest evicted first, so the rate
//! follows the current mix of file sizes instead of the whole run history.
//!
//! Both derived values are `Option`: `None` means "no data yet", which is a
//! normal state at the start of a run, not an error.

use std::collections::VecDeque;
use std::time::Duration;

/// Maximum number of durations kept in the rolling window.
pub const DURATION_WINDOW_CAPACITY: usize = 100;

/// Rolling-average throughput estimator.
#[derive(Debug, Default)]
pub struct ThroughputTracker {
    durations: VecDeque<Duration>,
}

impl ThroughputTracker {
    pub fn new() -> Self {
        Self {
            durations: VecDeque::with_capacity(DURATION_WINDOW_CAPACITY),
        }
    }

    /// Append a conversion duration, evicting the oldest entry once the
    /// window exceeds its capacity (strict FIFO).
    pub fn record(&mut self, duration: Duration) {
        self.durations.push_back(duration);
        if self.durations.len() > DURATION_WINDOW_CAPACITY {
            self.durations.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    fn average_seconds(&self) -> Option<f64> {
        if self.durations.is_empty() {
            return None;
        }
        let total: f64 = self.durations.iter().map(Duration::as_secs_f64).sum();
        Some(total / self.durations.len() as f64)
    }

    /// Smoothed conversion rate; `None` while the window is empty or the
    /// recorded durations are too small to measure.
    pub fn conversions_per_minute(&self) -> Option<f64> {
        let average = self.average_seconds()?;
        if average == 0.0 {
            return None;
        }
        Some(60.0 / average)
    }

    /// Estimated time to drain `files_left` at the current rate.
    ///
    /// Purely informational; `None` whenever the rate is unavailable.
    pub fn eta(&self, files_left: u64) -> Option<Duration> {
        let cpm = self.conversions_per_minute()?;
        Some(Duration::from_secs_f64(files_left as f64 / cpm * 60.0))
    }
}
