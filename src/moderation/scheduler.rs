//! Scheduler: drives one cycle at a time on a fixed interval.
//!
//! States: Idle → Running → Idle → ... → Stopped. The stop flag is only
//! observed between cycles and during the wait, so an in-flight cycle
//! always completes, and cycles never overlap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::constants::STOP_POLL_MS;
use crate::moderation::report::CycleReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

pub struct Scheduler {
    interval: Duration,
    /// Set to `true` to request a stop (signal handlers write here).
    stop: Arc<AtomicBool>,
    state: SchedulerState,
    cycles: u64,
    max_cycles: Option<u64>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            stop: Arc::new(AtomicBool::new(false)),
            state: SchedulerState::Idle,
            cycles: 0,
            max_cycles: None,
        }
    }

    /// Stop after `n` cycles without waiting after the last one.
    pub fn with_max_cycles(mut self, n: u64) -> Self {
        self.max_cycles = Some(n);
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Run until stopped. `cycle` receives the 1-based cycle number.
    /// Returns the number of completed cycles.
    pub fn run<F>(&mut self, mut cycle: F) -> u64
    where
        F: FnMut(u64) -> CycleReport,
    {
        tracing::info!(interval_secs = self.interval.as_secs(), "Scheduler started");

        while !self.stop_requested() {
            self.state = SchedulerState::Running;
            self.cycles += 1;
            let report = cycle(self.cycles);
            report.log();
            self.state = SchedulerState::Idle;

            if self.max_cycles.is_some_and(|max| self.cycles >= max) {
                break;
            }
            if !self.wait_interval() {
                break;
            }
        }

        self.state = SchedulerState::Stopped;
        tracing::info!(cycles = self.cycles, "Scheduler stopped");
        self.cycles
    }

    /// Sleep for the interval in short slices. `false` if a stop came in.
    fn wait_interval(&self) -> bool {
        let deadline = Instant::now() + self.interval;
        let slice = Duration::from_millis(STOP_POLL_MS);
        loop {
            if self.stop_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(slice.min(deadline - now));
        }
    }
}
