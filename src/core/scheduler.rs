use std::{
    collections::VecDeque,
    thread,
    time::{Duration, Instant},
};

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;

use crate::{config, error::Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Gravity,
    Position,
    Collision,
}

impl Phase {
    fn slot(self) -> usize {
        match self {
            Phase::Gravity => 0,
            Phase::Position => 1,
            Phase::Collision => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ExecutionMode {
    Sequential,
    Parallel,
}

impl ExecutionMode {
    fn other(self) -> Self {
        match self {
            ExecutionMode::Sequential => ExecutionMode::Parallel,
            ExecutionMode::Parallel => ExecutionMode::Sequential,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TimingHistory {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl TimingHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, sample: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }
}

#[derive(Clone, Debug)]
struct PhaseTimings {
    sequential: TimingHistory,
    parallel: TimingHistory,
    decisions: u64,
    // decision count at each mode's latest sample
    sequential_at: u64,
    parallel_at: u64,
}

impl PhaseTimings {
    fn new() -> Self {
        Self {
            sequential: TimingHistory::new(config::TIMING_HISTORY_LEN),
            parallel: TimingHistory::new(config::TIMING_HISTORY_LEN),
            decisions: 0,
            sequential_at: 0,
            parallel_at: 0,
        }
    }

    fn is_stale(&self, mode: ExecutionMode) -> bool {
        let sampled_at = match mode {
            ExecutionMode::Sequential => self.sequential_at,
            ExecutionMode::Parallel => self.parallel_at,
        };
        self.decisions.saturating_sub(sampled_at) >= config::TIMING_STALE_DECISIONS
    }
}

pub struct StepScheduler {
    pool: ThreadPool,
    workers: usize,
    timings: [PhaseTimings; 3],
}

impl std::fmt::Debug for StepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepScheduler")
            .field("workers", &self.workers)
            .field("timings", &self.timings)
            .finish()
    }
}

pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

impl StepScheduler {
    pub fn new(workers: Option<usize>) -> Result<Self> {
        let workers = workers.unwrap_or_else(default_workers).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gravsim-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            workers,
            timings: [PhaseTimings::new(), PhaseTimings::new(), PhaseTimings::new()],
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn speedup(&self, phase: Phase) -> Option<f64> {
        let timings = &self.timings[phase.slot()];
        let seq = timings.sequential.average()?;
        let par = timings.parallel.average()?;
        let par = par.as_secs_f64();
        if par > 0.0 {
            Some(seq.as_secs_f64() / par)
        } else {
            Some(f64::INFINITY)
        }
    }

    pub fn decide(&mut self, phase: Phase, body_count: usize) -> ExecutionMode {
        if phase == Phase::Position {
            // per-body work with no shared writes
            return if body_count >= config::POSITION_PARALLEL_MIN_BODIES {
                ExecutionMode::Parallel
            } else {
                ExecutionMode::Sequential
            };
        }
        if body_count <= config::PARALLEL_MIN_BODIES {
            return ExecutionMode::Sequential;
        }
        if body_count > config::PARALLEL_ALWAYS_BODIES {
            return ExecutionMode::Parallel;
        }

        let speedup = self.speedup(phase);
        let timings = &mut self.timings[phase.slot()];
        timings.decisions += 1;
        if timings.parallel.is_empty() {
            return ExecutionMode::Parallel;
        }
        if timings.sequential.is_empty() {
            return ExecutionMode::Sequential;
        }
        let preferred = match speedup {
            Some(s) if s > config::PARALLEL_SPEEDUP_MIN => ExecutionMode::Parallel,
            _ => ExecutionMode::Sequential,
        };
        let other = preferred.other();
        if timings.is_stale(other) {
            log::trace!("{phase:?}: {other:?} timings are stale, rerunning");
            other
        } else {
            preferred
        }
    }

    pub fn record(&mut self, phase: Phase, mode: ExecutionMode, elapsed: Duration) {
        let timings = &mut self.timings[phase.slot()];
        match mode {
            ExecutionMode::Sequential => {
                timings.sequential.push(elapsed);
                timings.sequential_at = timings.decisions;
            }
            ExecutionMode::Parallel => {
                timings.parallel.push(elapsed);
                timings.parallel_at = timings.decisions;
            }
        }
    }

    pub fn execute<T, F>(&mut self, phase: Phase, mode: ExecutionMode, work: F) -> (T, Duration)
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        let start = Instant::now();
        let out = match mode {
            ExecutionMode::Parallel => self.pool.install(work),
            ExecutionMode::Sequential => work(),
        };
        let elapsed = start.elapsed();
        self.record(phase, mode, elapsed);
        (out, elapsed)
    }
}

#[cfg(test)]
impl StepScheduler {
    pub(crate) fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    fn history(&self, phase: Phase, mode: ExecutionMode) -> &TimingHistory {
        let timings = &self.timings[phase.slot()];
        match mode {
            ExecutionMode::Sequential => &timings.sequential,
            ExecutionMode::Parallel => &timings.parallel,
        }
    }
}
