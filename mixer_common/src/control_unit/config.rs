//! Configuration structures for the mixer control unit.
//!
//! All config types use `serde::Deserialize` for TOML loading. Every field has
//! a default, so an empty document yields the buffered absolute-position
//! deployment. [`MixerConfig::preset`] builds the deployed variants.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::*;

use super::state::{ActuationStyle, SensorId};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete control-unit configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MixerConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub sensors: SensorConfig,
    #[serde(default)]
    pub actuator: ActuatorConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub pid: PidConfig,
    #[serde(default)]
    pub interlock: InterlockConfig,
    #[serde(default)]
    pub position: PositionConfig,
}

/// Regulator variants, one per deployment style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Open/close pulses, buffer interlock, even-integer positions.
    PulsedWithBuffer,
    /// Open/close pulses, no interlock, even-integer positions.
    PulsedNoBuffer,
    /// Go-to-position, buffer interlock, even-integer positions.
    AbsoluteWithBuffer,
    /// Open/close pulses with continuous positions and a 300 s dt ceiling.
    PulsedLegacy,
}

impl MixerConfig {
    /// Build the configuration of a deployed variant.
    pub fn preset(variant: Variant) -> Self {
        let mut config = Self::default();
        match variant {
            Variant::AbsoluteWithBuffer => {}
            Variant::PulsedWithBuffer => {
                config.actuator.style = ActuationStyle::Pulsed;
                config.timing.min_move_pause_ms = MIN_MOVE_PAUSE_MS_PULSED;
            }
            Variant::PulsedNoBuffer => {
                config.actuator.style = ActuationStyle::Pulsed;
                config.interlock.enabled = false;
            }
            Variant::PulsedLegacy => {
                config.actuator.style = ActuationStyle::Pulsed;
                config.actuator.quantize_even = false;
                config.actuator.min_move_step = 1;
                config.timing.min_move_pause_ms = MIN_MOVE_PAUSE_MS_PULSED;
                config.pid.dt_ceiling_s = 300.0;
                config.interlock.stay_closed_tolerance = 5;
            }
        }
        config
    }

    /// Validate all sections. Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.actuator.validate().map_err(ConfigError::ValidationError)?;
        self.timing.validate().map_err(ConfigError::ValidationError)?;
        self.pid.validate().map_err(ConfigError::ValidationError)?;
        self.interlock.validate().map_err(ConfigError::ValidationError)?;
        self.position.validate().map_err(ConfigError::ValidationError)?;
        let pid_interval_s = self.timing.pid_interval_ms as f64 / 1000.0;
        if pid_interval_s >= self.pid.dt_ceiling_s {
            return Err(ConfigError::ValidationError(format!(
                "timing.pid_interval_ms ({} ms) must be below pid.dt_ceiling_s ({} s)",
                self.timing.pid_interval_ms, self.pid.dt_ceiling_s
            )));
        }
        if self.interlock.enabled && self.sensors.flow == self.sensors.buffer {
            return Err(ConfigError::ValidationError(format!(
                "sensors.flow and sensors.buffer must differ (both {})",
                self.sensors.flow.0
            )));
        }
        Ok(())
    }
}

// ─── Sections ───────────────────────────────────────────────────────

/// Temperature sensor assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    #[serde(default = "default_flow_sensor")]
    pub flow: SensorId,
    #[serde(default = "default_buffer_sensor")]
    pub buffer: SensorId,
}

fn default_flow_sensor() -> SensorId {
    SensorId(FLOW_SENSOR_ID_DEFAULT)
}
fn default_buffer_sensor() -> SensorId {
    SensorId(BUFFER_SENSOR_ID_DEFAULT)
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            flow: default_flow_sensor(),
            buffer: default_buffer_sensor(),
        }
    }
}

/// Valve actuator behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActuatorConfig {
    #[serde(default)]
    pub style: ActuationStyle,
    /// Restrict positions to even integers.
    #[serde(default = "default_true")]
    pub quantize_even: bool,
    /// Full 0→100 % travel time [s]; pulsed only.
    #[serde(default = "default_full_travel_s")]
    pub full_travel_s: f64,
    /// Floor for scheduled pulsed travel [ms].
    #[serde(default = "default_min_travel_ms")]
    pub min_travel_ms: u64,
    /// Smallest position change worth a move [%].
    #[serde(default = "default_min_move_step")]
    pub min_move_step: u8,
}

fn default_true() -> bool {
    true
}
fn default_full_travel_s() -> f64 {
    FULL_TRAVEL_S_DEFAULT
}
fn default_min_travel_ms() -> u64 {
    MIN_TRAVEL_MS_DEFAULT
}
fn default_min_move_step() -> u8 {
    2
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            style: ActuationStyle::default(),
            quantize_even: true,
            full_travel_s: FULL_TRAVEL_S_DEFAULT,
            min_travel_ms: MIN_TRAVEL_MS_DEFAULT,
            min_move_step: default_min_move_step(),
        }
    }
}

impl ActuatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.full_travel_s.is_finite() && self.full_travel_s > 0.0) {
            return Err(format!(
                "actuator.full_travel_s must be positive, got {}",
                self.full_travel_s
            ));
        }
        if self.min_move_step == 0 || self.min_move_step > MAX_POSITION {
            return Err(format!(
                "actuator.min_move_step {} out of range [1, {}]",
                self.min_move_step, MAX_POSITION
            ));
        }
        Ok(())
    }
}

/// Tick intervals and movement cooldown [ms].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    #[serde(default = "default_temp_read_interval")]
    pub temp_read_interval_ms: u64,
    #[serde(default = "default_buffer_check_interval")]
    pub buffer_check_interval_ms: u64,
    #[serde(default = "default_pid_interval")]
    pub pid_interval_ms: u64,
    #[serde(default = "default_min_move_pause")]
    pub min_move_pause_ms: u64,
}

fn default_temp_read_interval() -> u64 {
    TEMP_READ_INTERVAL_MS_DEFAULT
}
fn default_buffer_check_interval() -> u64 {
    BUFFER_CHECK_INTERVAL_MS_DEFAULT
}
fn default_pid_interval() -> u64 {
    PID_INTERVAL_MS_DEFAULT
}
fn default_min_move_pause() -> u64 {
    MIN_MOVE_PAUSE_MS_ABSOLUTE
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            temp_read_interval_ms: TEMP_READ_INTERVAL_MS_DEFAULT,
            buffer_check_interval_ms: BUFFER_CHECK_INTERVAL_MS_DEFAULT,
            pid_interval_ms: PID_INTERVAL_MS_DEFAULT,
            min_move_pause_ms: MIN_MOVE_PAUSE_MS_ABSOLUTE,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("timing.temp_read_interval_ms", self.temp_read_interval_ms),
            ("timing.buffer_check_interval_ms", self.buffer_check_interval_ms),
            ("timing.pid_interval_ms", self.pid_interval_ms),
        ] {
            if value == 0 {
                return Err(format!("{name} must be positive"));
            }
        }
        Ok(())
    }
}

/// PID tuning and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidConfig {
    #[serde(default = "default_kp")]
    pub kp: f64,
    #[serde(default = "default_ki")]
    pub ki: f64,
    #[serde(default = "default_kd")]
    pub kd: f64,
    /// Initial flow setpoint [°C], used until the parameter store supplies one.
    #[serde(default = "default_setpoint")]
    pub setpoint: f64,
    #[serde(default = "default_dead_band")]
    pub dead_band: f64,
    #[serde(default = "default_integral_min")]
    pub integral_min: f64,
    #[serde(default = "default_integral_max")]
    pub integral_max: f64,
    /// Maximum position change per step [%].
    #[serde(default = "default_output_step_limit")]
    pub output_step_limit: f64,
    /// Samples older than this are discarded [s].
    #[serde(default = "default_dt_ceiling_s")]
    pub dt_ceiling_s: f64,
}

fn default_kp() -> f64 {
    KP_DEFAULT
}
fn default_ki() -> f64 {
    KI_DEFAULT
}
fn default_kd() -> f64 {
    KD_DEFAULT
}
fn default_setpoint() -> f64 {
    SETPOINT_DEFAULT
}
fn default_dead_band() -> f64 {
    DEAD_BAND_DEFAULT
}
fn default_integral_min() -> f64 {
    INTEGRAL_MIN_DEFAULT
}
fn default_integral_max() -> f64 {
    INTEGRAL_MAX_DEFAULT
}
fn default_output_step_limit() -> f64 {
    OUTPUT_STEP_LIMIT_DEFAULT
}
fn default_dt_ceiling_s() -> f64 {
    DT_CEILING_S_DEFAULT
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: KP_DEFAULT,
            ki: KI_DEFAULT,
            kd: KD_DEFAULT,
            setpoint: SETPOINT_DEFAULT,
            dead_band: DEAD_BAND_DEFAULT,
            integral_min: INTEGRAL_MIN_DEFAULT,
            integral_max: INTEGRAL_MAX_DEFAULT,
            output_step_limit: OUTPUT_STEP_LIMIT_DEFAULT,
            dt_ceiling_s: DT_CEILING_S_DEFAULT,
        }
    }
}

impl PidConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, gain) in [("pid.kp", self.kp), ("pid.ki", self.ki), ("pid.kd", self.kd)] {
            if !(gain.is_finite() && gain >= 0.0) {
                return Err(format!("{name} must be a non-negative number, got {gain}"));
            }
        }
        if !(self.setpoint > SETPOINT_MIN_EXCLUSIVE && self.setpoint < SETPOINT_MAX_EXCLUSIVE) {
            return Err(format!(
                "pid.setpoint {} out of range ({}, {})",
                self.setpoint, SETPOINT_MIN_EXCLUSIVE, SETPOINT_MAX_EXCLUSIVE
            ));
        }
        if !(self.dead_band.is_finite() && self.dead_band >= 0.0) {
            return Err(format!("pid.dead_band must be non-negative, got {}", self.dead_band));
        }
        if !(self.integral_min < self.integral_max) {
            return Err(format!(
                "pid.integral_min {} must be below pid.integral_max {}",
                self.integral_min, self.integral_max
            ));
        }
        if !(self.output_step_limit.is_finite() && self.output_step_limit > 0.0) {
            return Err(format!(
                "pid.output_step_limit must be positive, got {}",
                self.output_step_limit
            ));
        }
        if !(self.dt_ceiling_s.is_finite() && self.dt_ceiling_s > 0.0) {
            return Err(format!(
                "pid.dt_ceiling_s must be positive, got {}",
                self.dt_ceiling_s
            ));
        }
        Ok(())
    }
}

/// Buffer-storage safety interlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterlockConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Trip below this buffer temperature [°C].
    #[serde(default = "default_emergency_min")]
    pub emergency_min: f64,
    /// Release at or above this buffer temperature [°C].
    #[serde(default = "default_emergency_ok")]
    pub emergency_ok: f64,
    /// While tripped, re-close when the position exceeds this [%].
    #[serde(default)]
    pub stay_closed_tolerance: u8,
}

fn default_emergency_min() -> f64 {
    BUFFER_EMERGENCY_MIN_DEFAULT
}
fn default_emergency_ok() -> f64 {
    BUFFER_EMERGENCY_OK_DEFAULT
}

impl Default for InterlockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            emergency_min: BUFFER_EMERGENCY_MIN_DEFAULT,
            emergency_ok: BUFFER_EMERGENCY_OK_DEFAULT,
            stay_closed_tolerance: 0,
        }
    }
}

impl InterlockConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.emergency_min.is_finite() && self.emergency_ok.is_finite()) {
            return Err("interlock thresholds must be finite".to_string());
        }
        if self.emergency_ok <= self.emergency_min {
            return Err(format!(
                "interlock.emergency_ok {} must be above interlock.emergency_min {}",
                self.emergency_ok, self.emergency_min
            ));
        }
        if self.stay_closed_tolerance > MAX_POSITION {
            return Err(format!(
                "interlock.stay_closed_tolerance {} out of range [0, {}]",
                self.stay_closed_tolerance, MAX_POSITION
            ));
        }
        Ok(())
    }
}

/// Valve position at process start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionConfig {
    #[serde(default = "default_initial_position")]
    pub initial: u8,
}

fn default_initial_position() -> u8 {
    MID_POSITION
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            initial: MID_POSITION,
        }
    }
}

impl PositionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.initial > MAX_POSITION {
            return Err(format!(
                "position.initial {} out of range [{}, {}]",
                self.initial, MIN_POSITION, MAX_POSITION
            ));
        }
        Ok(())
    }
}
