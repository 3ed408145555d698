//! System-wide constants for the mixer workspace.
//!
//! Single source of truth for position bounds and the default tuning of the
//! deployed regulators. Configuration defaults refer to these values.

use static_assertions::const_assert;

// ─── Position bounds ────────────────────────────────────────────────

/// Fully closed (cold source only) [%].
pub const MIN_POSITION: u8 = 0;

/// Fully open (hot source only) [%].
pub const MAX_POSITION: u8 = 100;

/// Neutral start position [%].
pub const MID_POSITION: u8 = 50;

// ─── PID defaults ───────────────────────────────────────────────────

pub const KP_DEFAULT: f64 = 6.0;
pub const KI_DEFAULT: f64 = 0.03;
pub const KD_DEFAULT: f64 = 2.0;

/// Default flow setpoint [°C].
pub const SETPOINT_DEFAULT: f64 = 25.0;

/// Setpoints are accepted only strictly inside this range [°C].
pub const SETPOINT_MIN_EXCLUSIVE: f64 = 0.0;
pub const SETPOINT_MAX_EXCLUSIVE: f64 = 100.0;

/// Errors below this magnitude are on target [°C].
pub const DEAD_BAND_DEFAULT: f64 = 0.3;

/// Integral accumulator clamp [°C·s].
pub const INTEGRAL_MIN_DEFAULT: f64 = -50.0;
pub const INTEGRAL_MAX_DEFAULT: f64 = 50.0;

/// Maximum position change per PID step [%].
pub const OUTPUT_STEP_LIMIT_DEFAULT: f64 = 15.0;

/// Samples with a larger `dt` are discarded [s].
pub const DT_CEILING_S_DEFAULT: f64 = 600.0;

// ─── Timing defaults [ms] ───────────────────────────────────────────

pub const TEMP_READ_INTERVAL_MS_DEFAULT: u64 = 10_000;
pub const BUFFER_CHECK_INTERVAL_MS_DEFAULT: u64 = 30_000;
pub const PID_INTERVAL_MS_DEFAULT: u64 = 150_000;

/// Minimum pause between two moves for absolute-position actuators.
pub const MIN_MOVE_PAUSE_MS_ABSOLUTE: u64 = 60_000;

/// Minimum pause between two moves for pulsed actuators.
pub const MIN_MOVE_PAUSE_MS_PULSED: u64 = 30_000;

/// Shortest scheduled travel for a pulsed move.
pub const MIN_TRAVEL_MS_DEFAULT: u64 = 500;

/// Full 0→100 % travel of the valve motor [s].
pub const FULL_TRAVEL_S_DEFAULT: f64 = 120.0;

// ─── Interlock defaults [°C] ────────────────────────────────────────

pub const BUFFER_EMERGENCY_MIN_DEFAULT: f64 = 40.0;
pub const BUFFER_EMERGENCY_OK_DEFAULT: f64 = 45.0;

// ─── Hardware defaults ──────────────────────────────────────────────

pub const FLOW_SENSOR_ID_DEFAULT: u16 = 101;
pub const BUFFER_SENSOR_ID_DEFAULT: u16 = 100;

/// Configuration file read when neither a file nor a preset is requested.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mixer/mixer.toml";

const_assert!(MIN_POSITION < MAX_POSITION);
const_assert!(MIN_POSITION % 2 == 0 && MAX_POSITION % 2 == 0);
const_assert!(MID_POSITION > MIN_POSITION && MID_POSITION < MAX_POSITION);
const_assert!(BUFFER_EMERGENCY_OK_DEFAULT > BUFFER_EMERGENCY_MIN_DEFAULT);
const_assert!(INTEGRAL_MIN_DEFAULT < INTEGRAL_MAX_DEFAULT);
