//! `MixerController`: the control core's single owner of state.
//!
//! Wires the position model, PID engine, safety interlock, operating state
//! machine and actuation arbiter to the collaborators. Entry points are
//! synchronous and must be serialized by the caller:
//!
//! | Entry point              | Scheduled by                     |
//! |--------------------------|----------------------------------|
//! | [`startup`]              | once, before any tick            |
//! | [`refresh_temperatures`] | temperature tick                 |
//! | [`check_interlock`]      | buffer tick                      |
//! | [`pid_step`]             | PID tick                         |
//! | [`complete_move`]        | pending move deadline            |
//!
//! [`startup`]: MixerController::startup
//! [`refresh_temperatures`]: MixerController::refresh_temperatures
//! [`check_interlock`]: MixerController::check_interlock
//! [`pid_step`]: MixerController::pid_step
//! [`complete_move`]: MixerController::complete_move

use mixer_common::consts::{MIN_POSITION, SETPOINT_MAX_EXCLUSIVE, SETPOINT_MIN_EXCLUSIVE};
use mixer_common::control_unit::config::MixerConfig;
use mixer_common::control_unit::state::{
    Gain, MoveDecision, OperatingState, SafetyVerdict, SensorId, Timestamp,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command::arbitration::ActuationArbiter;
use crate::control::pid::{PidEngine, PidGains, PidLimits, PidStep};
use crate::control::position::PositionModel;
use crate::io::{Actuator, ParameterStore, SensorReader, StatusSink};
use crate::safety::interlock::SafetyInterlock;
use crate::state::controller::ControllerState;
use crate::state::operating::OperatingEvent;

/// Outcome of one PID tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PidCycle {
    /// Emergency active; regulation suspended.
    Suspended,
    /// No valid flow reading this tick.
    NoMeasurement,
    /// The engine ran.
    Evaluated {
        step: PidStep,
        /// Normalized target, present when the engine produced output.
        target: Option<u8>,
        /// Arbiter verdict for `target`.
        decision: Option<MoveDecision>,
    },
}

impl PidCycle {
    #[inline]
    pub fn decision(&self) -> Option<MoveDecision> {
        match self {
            Self::Evaluated { decision, .. } => *decision,
            _ => None,
        }
    }
}

/// Serializable view of the controller for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub at: Timestamp,
    pub state: OperatingState,
    pub position: u8,
    pub target_position: u8,
    pub is_moving: bool,
    pub flow_temp: Option<f64>,
    pub buffer_temp: Option<f64>,
    pub setpoint: f64,
    pub gains: PidGains,
    pub integral: f64,
    pub emergency_active: bool,
    pub emergency_since: Option<Timestamp>,
    pub last_move: Option<Timestamp>,
}

/// The regulator.
pub struct MixerController<S, P, A, K> {
    config: MixerConfig,
    state: ControllerState,
    positions: PositionModel,
    engine: PidEngine,
    interlock: SafetyInterlock,
    arbiter: ActuationArbiter,
    sensors: S,
    params: P,
    actuator: A,
    status: K,
}

impl<S, P, A, K> MixerController<S, P, A, K>
where
    S: SensorReader,
    P: ParameterStore,
    A: Actuator,
    K: StatusSink,
{
    /// Build a controller from a validated config.
    pub fn new(config: MixerConfig, sensors: S, params: P, actuator: A, status: K) -> Self {
        let positions = PositionModel::new(config.actuator.quantize_even);
        let initial = positions.normalize(config.position.initial as f64);
        Self {
            state: ControllerState::new(&config, initial),
            positions,
            engine: PidEngine::new(PidLimits::from_config(&config.pid)),
            interlock: SafetyInterlock::from_config(&config.interlock),
            arbiter: ActuationArbiter::from_config(&config),
            config,
            sensors,
            params,
            actuator,
            status,
        }
    }

    // ─── Entry points ───────────────────────────────────────────────

    /// Read initial values, run the first interlock check.
    pub fn startup(&mut self, now: Timestamp) {
        info!(
            service = %self.config.shared.service_name,
            style = ?self.config.actuator.style,
            interlock = self.config.interlock.enabled,
            quantize_even = self.config.actuator.quantize_even,
            "mixer control starting"
        );

        self.refresh_temperatures(now);
        if self.config.interlock.enabled {
            self.state.buffer_temp = self.read_sensor(self.config.sensors.buffer, "buffer");
        }
        self.refresh_parameters();

        let position = self.positions.normalize(self.state.position as f64);
        self.state.position = position;
        self.state.target_position = position;

        info!(
            flow = ?self.state.flow_temp,
            buffer = ?self.state.buffer_temp,
            setpoint = self.state.setpoint,
            position,
            state = %self.state.operating_state(),
            "initial values"
        );

        self.check_interlock(now);
        self.state.pid.last_sample = now;
    }

    /// Temperature tick: refresh the flow reading.
    pub fn refresh_temperatures(&mut self, _now: Timestamp) -> Option<f64> {
        self.state.flow_temp = self.read_sensor(self.config.sensors.flow, "flow");
        self.state.flow_temp
    }

    /// Buffer tick: evaluate the interlock and act on its verdict.
    ///
    /// Returns `None` when the interlock is disabled or the buffer reading
    /// is invalid; nothing changes in either case.
    pub fn check_interlock(&mut self, now: Timestamp) -> Option<SafetyVerdict> {
        if !self.config.interlock.enabled {
            return None;
        }
        let reading = self.read_sensor(self.config.sensors.buffer, "buffer");
        self.state.buffer_temp = reading;
        let verdict = self
            .interlock
            .evaluate(&mut self.state.emergency, reading?, now)?;

        match verdict {
            SafetyVerdict::EnterEmergency => {
                self.state.pid.reset();
                self.state.apply(OperatingEvent::InterlockTripped, &mut self.status);
                self.force_close(now);
            }
            SafetyVerdict::ExitEmergency => {
                self.state.pid.reset();
                self.state.pid.last_sample = now;
                self.state.apply(OperatingEvent::InterlockCleared, &mut self.status);
            }
            SafetyVerdict::StayEmergency => {
                let closing = self
                    .arbiter
                    .pending()
                    .is_some_and(|p| p.target == MIN_POSITION);
                debug!(
                    buffer = ?self.state.buffer_temp,
                    position = self.state.position,
                    closing,
                    "emergency persists"
                );
                if self.state.position > self.config.interlock.stay_closed_tolerance && !closing {
                    self.force_close(now);
                }
            }
            SafetyVerdict::NoChange => {}
        }
        Some(verdict)
    }

    /// PID tick: read flow, refresh parameters, step the engine, request a move.
    pub fn pid_step(&mut self, now: Timestamp) -> PidCycle {
        if self.state.emergency.active {
            return PidCycle::Suspended;
        }
        let Some(flow) = self.refresh_temperatures(now) else {
            warn!("no valid flow temperature, PID step skipped");
            return PidCycle::NoMeasurement;
        };

        if self.state.pid.initialized {
            self.refresh_parameters();
        }

        let step = self.engine.step(
            &mut self.state.pid,
            flow,
            self.state.setpoint,
            &self.state.gains,
            self.state.position,
            now,
        );

        let (target, decision) = match step {
            PidStep::Initialized => {
                info!(setpoint = self.state.setpoint, flow, "PID initialized");
                (None, None)
            }
            PidStep::OnTarget { error } => {
                debug!(error, "PID on target");
                (None, None)
            }
            PidStep::DiscardedSample { dt } => {
                warn!(dt, "PID sample discarded, dt out of range");
                (None, None)
            }
            PidStep::InvalidInput => (None, None),
            PidStep::Output {
                output,
                desired,
                terms,
            } => {
                let target = self.positions.normalize(desired);
                if terms.windup_held {
                    debug!(position = self.state.position, "anti-windup active");
                }
                debug!(
                    flow,
                    setpoint = self.state.setpoint,
                    error = terms.error,
                    p = terms.p,
                    i = terms.i,
                    d = terms.d,
                    output,
                    from = self.state.position,
                    target,
                    "PID step"
                );
                let decision = self.arbiter.request_move(
                    &mut self.state,
                    &mut self.actuator,
                    &mut self.status,
                    target,
                    false,
                    now,
                );
                (Some(target), Some(decision))
            }
        };

        PidCycle::Evaluated {
            step,
            target,
            decision,
        }
    }

    /// Pending-move deadline: complete an outstanding pulsed move.
    pub fn complete_move(&mut self, now: Timestamp) -> bool {
        self.arbiter
            .complete(&mut self.state, &mut self.actuator, &mut self.status, now)
    }

    /// When [`complete_move`](Self::complete_move) should next be called.
    #[inline]
    pub fn next_completion_deadline(&self) -> Option<Timestamp> {
        self.arbiter.pending_deadline()
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn force_close(&mut self, now: Timestamp) -> MoveDecision {
        info!(from = self.state.position, "forcing valve closed");
        self.arbiter.request_move(
            &mut self.state,
            &mut self.actuator,
            &mut self.status,
            MIN_POSITION,
            true,
            now,
        )
    }

    fn read_sensor(&mut self, sensor: SensorId, name: &'static str) -> Option<f64> {
        let value = self
            .sensors
            .read_temperature(sensor)
            .filter(|t| t.is_finite());
        if value.is_none() {
            warn!(%sensor, name, "invalid or missing temperature");
        }
        value
    }

    /// Re-read setpoint and gains, keeping previous values on invalid reads.
    fn refresh_parameters(&mut self) {
        match self.params.read_setpoint() {
            Some(v) if v > SETPOINT_MIN_EXCLUSIVE && v < SETPOINT_MAX_EXCLUSIVE => {
                self.state.setpoint = v;
            }
            other => warn!(
                value = ?other,
                keeping = self.state.setpoint,
                "invalid setpoint"
            ),
        }

        for gain in Gain::ALL {
            let slot = match gain {
                Gain::Kp => &mut self.state.gains.kp,
                Gain::Ki => &mut self.state.gains.ki,
                Gain::Kd => &mut self.state.gains.kd,
            };
            match self.params.read_gain(gain) {
                Some(v) if v.is_finite() && v >= 0.0 => *slot = v,
                Some(v) => warn!(?gain, value = v, keeping = *slot, "invalid gain"),
                None => {}
            }
        }
        debug!(
            kp = self.state.gains.kp,
            ki = self.state.gains.ki,
            kd = self.state.gains.kd,
            "PID gains"
        );
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn snapshot(&self, now: Timestamp) -> ControllerSnapshot {
        let s = &self.state;
        ControllerSnapshot {
            at: now,
            state: s.operating_state(),
            position: s.position,
            target_position: s.target_position,
            is_moving: s.is_moving,
            flow_temp: s.flow_temp,
            buffer_temp: s.buffer_temp,
            setpoint: s.setpoint,
            gains: s.gains,
            integral: s.pid.integral,
            emergency_active: s.emergency.active,
            emergency_since: s.emergency.started_at,
            last_move: s.last_move,
        }
    }

    #[inline]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    #[inline]
    pub fn arbiter(&self) -> &ActuationArbiter {
        &self.arbiter
    }

    #[inline]
    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut P {
        &mut self.params
    }

    #[inline]
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    #[inline]
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    #[inline]
    pub fn status(&self) -> &K {
        &self.status
    }
}
