// src/scheduler.rs
//! Recurring-schedule state machine: Idle -> Running -> Idle (run-once) or
//! Idle -> Running -> Waiting -> Running -> ... (run-forever).
//!
//! The Waiting state polls a coarse tick so shutdown latency is bounded by
//! the tick, not by the full interval. A stop signal during Running is
//! honored at the next cycle boundary; in-flight fetches finish or time out
//! naturally.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::cycle::CycleRunner;
use crate::error::PersistenceError;

/// Coarse Waiting-state poll tick.
pub const WAIT_TICK: Duration = Duration::from_secs(10);

/// Scheduling granularity. Intervals below one hour are operator test
/// cadences expressed in whole minutes; everything else runs in whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Minutes(u64),
    Hours(u64),
}

impl Cadence {
    pub fn from_interval_hours(hours: f64) -> Self {
        if hours < 1.0 {
            Cadence::Minutes(((hours * 60.0) as u64).max(1))
        } else {
            Cadence::Hours(hours as u64)
        }
    }

    pub fn step(&self) -> chrono::Duration {
        match *self {
            Cadence::Minutes(m) => chrono::Duration::minutes(m as i64),
            Cadence::Hours(h) => chrono::Duration::hours(h as i64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    RunOnce,
    RunForever,
}

/// Process-wide schedule state, owned exclusively by the scheduler loop.
/// Anchored at process start; nothing persists across restarts.
#[derive(Debug)]
pub struct ScheduleState {
    cadence: Cadence,
    mode: Mode,
    next_fire: Option<DateTime<Utc>>,
}

impl ScheduleState {
    pub fn new(interval_hours: f64, mode: Mode) -> Self {
        Self {
            cadence: Cadence::from_interval_hours(interval_hours),
            mode,
            next_fire: None,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        self.next_fire
    }

    /// Arm the next deadline relative to `now`.
    pub fn schedule_next(&mut self, now: DateTime<Utc>) {
        self.next_fire = Some(now + self.cadence.step());
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_fire {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }
}

pub struct Scheduler {
    state: ScheduleState,
    runner: CycleRunner,
}

impl Scheduler {
    pub fn new(runner: CycleRunner, interval_hours: f64, mode: Mode) -> Self {
        let state = ScheduleState::new(interval_hours, mode);
        if state.mode() == Mode::RunForever {
            match state.cadence() {
                Cadence::Minutes(m) => {
                    tracing::info!("TEST MODE: monitoring will check every {m} minute(s)")
                }
                Cadence::Hours(h) => tracing::info!("monitoring will check every {h} hour(s)"),
            }
        }
        Self { state, runner }
    }

    /// Drive the state machine until the schedule completes (run-once) or a
    /// stop signal arrives. The first cycle runs immediately.
    ///
    /// Run-once propagates a cycle failure so the process can exit nonzero;
    /// run-forever logs it and keeps the schedule alive.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> Result<(), PersistenceError> {
        loop {
            // Running
            match self.runner.run_cycle().await {
                Ok(report) => {
                    tracing::info!(
                        new = report.new_records.len(),
                        total = report.total_known_after,
                        "cycle complete"
                    );
                }
                Err(e) => {
                    if self.state.mode() == Mode::RunOnce {
                        return Err(e);
                    }
                    tracing::error!(error = %e, "cycle failed; next scheduled cycle still fires");
                }
            }

            if self.state.mode() == Mode::RunOnce {
                return Ok(());
            }

            // Waiting
            self.state.schedule_next(Utc::now());
            loop {
                if *stop.borrow() {
                    tracing::info!("stop signal received, leaving scheduler loop");
                    return Ok(());
                }
                if self.state.is_due(Utc::now()) {
                    break;
                }
                tokio::select! {
                    changed = stop.changed() => {
                        if changed.is_err() {
                            // Stop handle dropped; fall back to plain ticking.
                            tokio::time::sleep(WAIT_TICK).await;
                        }
                    }
                    _ = tokio::time::sleep(WAIT_TICK) => {}
                }
            }
        }
    }
}
