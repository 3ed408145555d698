//! Prelude module for common re-exports.
//!
//! ```rust
//! use mixer_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::control_unit::config::{
    ActuatorConfig, InterlockConfig, MixerConfig, PidConfig, PositionConfig, SensorConfig,
    TimingConfig, Variant,
};

// ─── Domain Types ───────────────────────────────────────────────────
pub use crate::control_unit::state::{
    ActuationStyle, Gain, MoveDecision, OperatingState, SafetyVerdict, SensorId, Timestamp,
    Transition,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_POSITION, MID_POSITION, MIN_POSITION};
