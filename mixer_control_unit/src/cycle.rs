//! Event scheduling for the control core.
//!
//! Three periodic ticks (temperature, buffer interlock, PID) plus the
//! one-shot completion deadline of an outstanding pulsed move, all on the
//! caller's monotonic clock. Events due at the same instant run in a fixed
//! order: completion, temperature, interlock, PID. An interlock trip is
//! therefore applied before a PID step scheduled for the same instant.

use mixer_common::config::ConfigError;
use mixer_common::control_unit::state::{MoveDecision, Timestamp};
use tracing::trace;

use crate::controller::MixerController;
use crate::io::{Actuator, ParameterStore, SensorReader, StatusSink};

// ─── Timers ─────────────────────────────────────────────────────────

/// Fixed-interval timer. First fires one interval after start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTimer {
    interval_ms: u64,
    next_due: Timestamp,
}

impl PeriodicTimer {
    pub const fn new(interval_ms: u64, start: Timestamp) -> Self {
        Self {
            interval_ms,
            next_due: start.add_millis(interval_ms),
        }
    }

    #[inline]
    pub const fn next_due(&self) -> Timestamp {
        self.next_due
    }

    /// Advance past one firing.
    #[inline]
    fn fire(&mut self) {
        self.next_due = self.next_due.add_millis(self.interval_ms);
    }
}

/// Kind of scheduled event, in same-instant priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CycleEvent {
    MoveCompletion,
    TemperatureRead,
    InterlockCheck,
    PidStep,
}

// ─── Statistics ─────────────────────────────────────────────────────

/// Event counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub temperature_reads: u64,
    pub interlock_checks: u64,
    pub pid_steps: u64,
    pub completions: u64,
    pub moves_issued: u64,
    pub moves_rejected: u64,
}

impl CycleStats {
    fn record_decision(&mut self, decision: Option<MoveDecision>) {
        match decision {
            Some(MoveDecision::Issued) => self.moves_issued += 1,
            Some(_) => self.moves_rejected += 1,
            None => {}
        }
    }
}

// ─── Runner ─────────────────────────────────────────────────────────

/// Serializes all entry points of a [`MixerController`].
pub struct CycleRunner<S, P, A, K> {
    controller: MixerController<S, P, A, K>,
    temperature: PeriodicTimer,
    interlock: PeriodicTimer,
    pid: PeriodicTimer,
    stats: CycleStats,
}

impl<S, P, A, K> CycleRunner<S, P, A, K>
where
    S: SensorReader,
    P: ParameterStore,
    A: Actuator,
    K: StatusSink,
{
    /// Validate the controller's configuration, run startup at `start` and
    /// arm the periodic timers.
    ///
    /// A configuration that bypassed [`load_config`](crate::config::load_config)
    /// is checked here: a zero interval would never let the clock advance.
    pub fn start(
        mut controller: MixerController<S, P, A, K>,
        start: Timestamp,
    ) -> Result<Self, ConfigError> {
        controller.config().validate()?;
        controller.startup(start);
        let timing = controller.config().timing.clone();
        Ok(Self {
            controller,
            temperature: PeriodicTimer::new(timing.temp_read_interval_ms, start),
            interlock: PeriodicTimer::new(timing.buffer_check_interval_ms, start),
            pid: PeriodicTimer::new(timing.pid_interval_ms, start),
            stats: CycleStats::default(),
        })
    }

    /// Earliest scheduled event.
    pub fn next_event(&self) -> (CycleEvent, Timestamp) {
        let mut next = (CycleEvent::TemperatureRead, self.temperature.next_due());
        for candidate in [
            (CycleEvent::InterlockCheck, self.interlock.next_due()),
            (CycleEvent::PidStep, self.pid.next_due()),
        ] {
            if (candidate.1, candidate.0) < (next.1, next.0) {
                next = candidate;
            }
        }
        if let Some(deadline) = self.controller.next_completion_deadline() {
            if deadline <= next.1 {
                next = (CycleEvent::MoveCompletion, deadline);
            }
        }
        next
    }

    /// Dispatch every event due at or before `now`, each at its own
    /// scheduled instant. Returns the number of events dispatched.
    pub fn advance_to(&mut self, now: Timestamp) -> usize {
        let mut dispatched = 0;
        loop {
            let (event, at) = self.next_event();
            if at > now {
                return dispatched;
            }
            self.dispatch(event, at);
            dispatched += 1;
        }
    }

    fn dispatch(&mut self, event: CycleEvent, at: Timestamp) {
        trace!(?event, %at, "dispatch");
        match event {
            CycleEvent::MoveCompletion => {
                if self.controller.complete_move(at) {
                    self.stats.completions += 1;
                }
            }
            CycleEvent::TemperatureRead => {
                self.temperature.fire();
                self.stats.temperature_reads += 1;
                self.controller.refresh_temperatures(at);
            }
            CycleEvent::InterlockCheck => {
                self.interlock.fire();
                self.stats.interlock_checks += 1;
                self.controller.check_interlock(at);
            }
            CycleEvent::PidStep => {
                self.pid.fire();
                self.stats.pid_steps += 1;
                let cycle = self.controller.pid_step(at);
                self.stats.record_decision(cycle.decision());
            }
        }
    }

    #[inline]
    pub const fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub const fn controller(&self) -> &MixerController<S, P, A, K> {
        &self.controller
    }

    #[inline]
    pub fn controller_mut(&mut self) -> &mut MixerController<S, P, A, K> {
        &mut self.controller
    }

    pub fn into_controller(self) -> MixerController<S, P, A, K> {
        self.controller
    }
}
