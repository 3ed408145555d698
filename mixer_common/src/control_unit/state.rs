//! State enums and value types for the mixer control unit.
//!
//! All enums use `#[repr(u8)]` for compact layout and carry `from_u8`
//! conversions so that status displays can round-trip them as raw codes.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Time ───────────────────────────────────────────────────────────

/// Monotonic instant in milliseconds since an arbitrary origin (usually boot).
///
/// The core never reads a clock itself; every entry point receives `now`
/// from the scheduler so that behavior is deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn from_secs(s: u64) -> Self {
        Self(s * 1000)
    }

    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Signed distance `self - earlier` in seconds.
    #[inline]
    pub fn secs_since(self, earlier: Self) -> f64 {
        (self.0 as f64 - earlier.0 as f64) / 1000.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` lies in the future.
    #[inline]
    pub const fn millis_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub const fn add_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

// ─── Operating State ────────────────────────────────────────────────

/// Operating state of the regulator.
///
/// The machine has no terminal state; it runs for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum OperatingState {
    /// Normal regulation, idle between moves.
    #[default]
    Auto = 0,
    /// Buffer interlock active, PID suspended, valve driven closed.
    Emergency = 1,
    /// A move is outstanding (pulsed) or was just issued (absolute).
    Moving = 2,
    /// Last move request fell inside the cooldown window.
    Pause = 3,
    /// Last actuator command was rejected.
    Error = 4,
}

impl OperatingState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Auto),
            1 => Some(Self::Emergency),
            2 => Some(Self::Moving),
            3 => Some(Self::Pause),
            4 => Some(Self::Error),
            _ => None,
        }
    }

    /// Display label, as shown on the device status text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Emergency => "EMERGENCY",
            Self::Moving => "MOVING",
            Self::Pause => "PAUSE",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A real (non-identity) operating-state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: OperatingState,
    pub to: OperatingState,
}

// ─── Actuation ──────────────────────────────────────────────────────

/// How the valve motor is commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ActuationStyle {
    /// Timed open/close pulses followed by a stop.
    Pulsed = 0,
    /// Absolute go-to-position commands; the device times its own travel.
    #[default]
    Absolute = 1,
}

/// Result of a move request to the actuation arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDecision {
    /// The actuator accepted the command.
    Issued,
    /// A pulsed move is still outstanding.
    RejectedBusy,
    /// The minimum pause since the last move has not elapsed.
    RejectedCooldown,
    /// Target is within the minimum meaningful step of the current position.
    RejectedNoChange,
    /// The actuator refused the command; the state is now `ERROR`.
    ActuatorFailed,
}

impl MoveDecision {
    #[inline]
    pub const fn is_issued(self) -> bool {
        matches!(self, Self::Issued)
    }
}

// ─── Safety ─────────────────────────────────────────────────────────

/// Outcome of one buffer-interlock evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SafetyVerdict {
    /// Buffer dropped below the trip threshold.
    EnterEmergency,
    /// Buffer recovered to the release threshold.
    ExitEmergency,
    /// Inactive and nothing to do.
    NoChange,
    /// Still active, buffer between thresholds (or still below).
    StayEmergency,
}

// ─── Collaborator identifiers ───────────────────────────────────────

/// Hardware temperature sensor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(pub u16);

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "temperature:{}", self.0)
    }
}

/// PID gain selector for parameter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gain {
    Kp,
    Ki,
    Kd,
}

impl Gain {
    pub const ALL: [Self; 3] = [Self::Kp, Self::Ki, Self::Kd];
}
