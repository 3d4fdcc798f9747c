//! Cumulative per-stage timing.
//!
//! `StageTimers` is an explicit context threaded through the three passes.
//! Each stage accumulates wall-clock and process CPU time across the whole
//! run; a stage that never runs reports zero. Snapshots are plain values for
//! the report writer. Timing never influences numeric results.

use std::time::{Duration, Instant};

use cpu_time::ProcessTime;

/// Accumulated wall and CPU time for one stage (or a sum of stages).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSpan {
    pub wall: Duration,
    pub cpu: Duration,
}

impl StageSpan {
    fn add(&mut self, other: StageSpan) {
        self.wall += other.wall;
        self.cpu += other.cpu;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimer {
    acc: StageSpan,
}

impl StageTimer {
    /// Run `f`, adding its elapsed wall and CPU time to the accumulator.
    pub fn measure<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let wall = Instant::now();
        let cpu = ProcessTime::now();
        let out = f();
        self.acc.add(StageSpan {
            wall: wall.elapsed(),
            cpu: cpu.elapsed(),
        });
        out
    }

    #[inline]
    pub fn span(&self) -> StageSpan {
        self.acc
    }
}

/// One timer per numeric stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimers {
    pub forward: StageTimer,
    pub backward: StageTimer,
    pub update: StageTimer,
}

impl StageTimers {
    pub fn snapshot(&self) -> TimingSnapshot {
        TimingSnapshot {
            forward: self.forward.span(),
            backward: self.backward.span(),
            update: self.update.span(),
        }
    }
}

/// Read-only view of the accumulated stage times.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingSnapshot {
    pub forward: StageSpan,
    pub backward: StageSpan,
    pub update: StageSpan,
}

impl TimingSnapshot {
    /// Sum of the three stages.
    pub fn total(&self) -> StageSpan {
        let mut total = StageSpan::default();
        total.add(self.forward);
        total.add(self.backward);
        total.add(self.update);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_accumulates_across_calls() {
        let mut timer = StageTimer::default();
        let a = timer.measure(|| 2 + 2);
        assert_eq!(a, 4);
        let first = timer.span().wall;
        timer.measure(|| std::thread::sleep(Duration::from_millis(2)));
        assert!(timer.span().wall >= first + Duration::from_millis(2));
    }

    #[test]
    fn snapshot_total_sums_the_stages() {
        let mut timers = StageTimers::default();
        timers.forward.measure(|| ());
        timers.backward.measure(|| ());
        let snap = timers.snapshot();
        assert_eq!(
            snap.total().wall,
            snap.forward.wall + snap.backward.wall + snap.update.wall
        );
        assert_eq!(snap.update.wall, Duration::ZERO);
    }
}
