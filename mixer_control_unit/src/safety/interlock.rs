//! Buffer-storage interlock.
//!
//! Trips below `emergency_min`, releases at or above `emergency_ok`.
//! Readings between the thresholds keep the current verdict. An invalid
//! reading changes nothing.

use mixer_common::control_unit::config::InterlockConfig;
use mixer_common::control_unit::state::{SafetyVerdict, Timestamp};
use serde::Serialize;
use tracing::info;

/// Emergency latch, owned by the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmergencyState {
    pub active: bool,
    pub started_at: Option<Timestamp>,
}

/// Hysteresis evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyInterlock {
    emergency_min: f64,
    emergency_ok: f64,
}

impl SafetyInterlock {
    /// Thresholds must satisfy `emergency_ok > emergency_min`; config
    /// validation enforces this.
    pub const fn new(emergency_min: f64, emergency_ok: f64) -> Self {
        Self {
            emergency_min,
            emergency_ok,
        }
    }

    pub fn from_config(config: &InterlockConfig) -> Self {
        Self::new(config.emergency_min, config.emergency_ok)
    }

    #[inline]
    pub const fn emergency_min(&self) -> f64 {
        self.emergency_min
    }

    #[inline]
    pub const fn emergency_ok(&self) -> f64 {
        self.emergency_ok
    }

    /// Evaluate one buffer reading and update the latch.
    ///
    /// Returns `None` for a non-finite reading; the latch is left as is.
    pub fn evaluate(
        &self,
        emergency: &mut EmergencyState,
        buffer_temp: f64,
        now: Timestamp,
    ) -> Option<SafetyVerdict> {
        if !buffer_temp.is_finite() {
            return None;
        }

        let verdict = if !emergency.active {
            if buffer_temp < self.emergency_min {
                emergency.active = true;
                emergency.started_at = Some(now);
                info!(
                    buffer_temp,
                    threshold = self.emergency_min,
                    "buffer interlock tripped"
                );
                SafetyVerdict::EnterEmergency
            } else {
                SafetyVerdict::NoChange
            }
        } else if buffer_temp >= self.emergency_ok {
            let duration_s = emergency
                .started_at
                .map(|started| now.millis_since(started) / 1000)
                .unwrap_or(0);
            emergency.active = false;
            emergency.started_at = None;
            info!(
                buffer_temp,
                threshold = self.emergency_ok,
                duration_s,
                "buffer interlock released"
            );
            SafetyVerdict::ExitEmergency
        } else {
            SafetyVerdict::StayEmergency
        };

        Some(verdict)
    }
}

impl Default for SafetyInterlock {
    fn default() -> Self {
        Self::from_config(&InterlockConfig::default())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
