//! Flow-temperature PID with dead band, dt sanity check, position-gated
//! anti-windup and an output step limit.
//!
//! The engine is stateless; all history lives in [`PidState`], which the
//! controller owns and resets on interlock transitions.

use mixer_common::consts::{MAX_POSITION, MIN_POSITION};
use mixer_common::control_unit::config::PidConfig;
use mixer_common::control_unit::state::Timestamp;
use serde::Serialize;

/// PID history preserved across steps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PidState {
    /// Integral accumulator, always within the configured clamp.
    pub integral: f64,
    /// Error of the previous step (for the derivative).
    pub last_error: f64,
    /// Time of the last accepted sample.
    pub last_sample: Timestamp,
    /// False until the first sample after construction or reset.
    pub initialized: bool,
}

impl PidState {
    /// Forget all history. The next step re-initializes.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Tuning gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn from_config(config: &PidConfig) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
        }
    }
}

/// Limits that do not change at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidLimits {
    /// Errors with magnitude below this count as on target [°C].
    pub dead_band: f64,
    pub integral_min: f64,
    pub integral_max: f64,
    /// Maximum position change per step [%].
    pub output_step_limit: f64,
    /// Samples spaced further apart than this are discarded [s].
    pub dt_ceiling_s: f64,
}

impl PidLimits {
    pub fn from_config(config: &PidConfig) -> Self {
        Self {
            dead_band: config.dead_band,
            integral_min: config.integral_min,
            integral_max: config.integral_max,
            output_step_limit: config.output_step_limit,
            dt_ceiling_s: config.dt_ceiling_s,
        }
    }
}

impl Default for PidLimits {
    fn default() -> Self {
        Self::from_config(&PidConfig::default())
    }
}

/// Individual contributions of one step, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidTerms {
    pub error: f64,
    pub dt: f64,
    pub p: f64,
    pub i: f64,
    pub d: f64,
    /// Sum of the terms before the step limit.
    pub raw: f64,
    /// Whether the integral update was skipped because the valve is saturated.
    pub windup_held: bool,
}

/// Outcome of [`PidEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PidStep {
    /// First sample after (re)initialization; history recorded, no output.
    Initialized,
    /// Error inside the dead band; integral cleared, no output.
    OnTarget { error: f64 },
    /// Sample spacing outside `(0, dt_ceiling]`; no output.
    DiscardedSample { dt: f64 },
    /// Measurement or setpoint not finite; state untouched.
    InvalidInput,
    /// Rate-limited correction.
    Output {
        /// Step-limited change in percent.
        output: f64,
        /// `position + output`, not yet normalized.
        desired: f64,
        terms: PidTerms,
    },
}

impl PidStep {
    /// Step-limited output, if any.
    #[inline]
    pub fn output(&self) -> Option<f64> {
        match self {
            Self::Output { output, .. } => Some(*output),
            _ => None,
        }
    }

    /// Unnormalized desired position, if any.
    #[inline]
    pub fn desired(&self) -> Option<f64> {
        match self {
            Self::Output { desired, .. } => Some(*desired),
            _ => None,
        }
    }
}

/// PID engine over a caller-owned [`PidState`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidEngine {
    limits: PidLimits,
}

impl PidEngine {
    pub const fn new(limits: PidLimits) -> Self {
        Self { limits }
    }

    #[inline]
    pub const fn limits(&self) -> &PidLimits {
        &self.limits
    }

    /// Run one PID step.
    ///
    /// `position` is the current valve position; it gates the integral update
    /// and is the base the output is added to.
    pub fn step(
        &self,
        state: &mut PidState,
        measured: f64,
        setpoint: f64,
        gains: &PidGains,
        position: u8,
        now: Timestamp,
    ) -> PidStep {
        if !(measured.is_finite() && setpoint.is_finite()) {
            return PidStep::InvalidInput;
        }
        let error = setpoint - measured;

        if !state.initialized {
            state.last_error = error;
            state.integral = 0.0;
            state.last_sample = now;
            state.initialized = true;
            return PidStep::Initialized;
        }

        if error.abs() < self.limits.dead_band {
            state.integral = 0.0;
            state.last_error = error;
            return PidStep::OnTarget { error };
        }

        let dt = now.secs_since(state.last_sample);
        state.last_sample = now;
        if dt <= 0.0 || dt > self.limits.dt_ceiling_s {
            state.last_error = error;
            return PidStep::DiscardedSample { dt };
        }

        // ── I term, skipped while the valve cannot move further ──
        let windup_held =
            (position >= MAX_POSITION && error > 0.0) || (position <= MIN_POSITION && error < 0.0);
        if !windup_held {
            state.integral = (state.integral + error * dt)
                .clamp(self.limits.integral_min, self.limits.integral_max);
        }

        // ── D term on error ──
        let derivative = (error - state.last_error) / dt;
        state.last_error = error;

        let p = gains.kp * error;
        let i = gains.ki * state.integral;
        let d = gains.kd * derivative;
        let raw = p + i + d;
        let limit = self.limits.output_step_limit;
        let output = raw.clamp(-limit, limit);

        PidStep::Output {
            output,
            desired: position as f64 + output,
            terms: PidTerms {
                error,
                dt,
                p,
                i,
                d,
                raw,
                windup_held,
            },
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
