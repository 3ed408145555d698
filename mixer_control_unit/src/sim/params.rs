//! In-memory parameter store.

use mixer_common::control_unit::config::PidConfig;
use mixer_common::control_unit::state::Gain;

use crate::io::ParameterStore;

/// Parameter store holding raw, unvalidated values. `None` simulates a
/// missing parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimParameterStore {
    pub setpoint: Option<f64>,
    pub kp: Option<f64>,
    pub ki: Option<f64>,
    pub kd: Option<f64>,
}

impl SimParameterStore {
    /// Store pre-filled with the configured setpoint and gains.
    pub fn from_config(config: &PidConfig) -> Self {
        Self {
            setpoint: Some(config.setpoint),
            kp: Some(config.kp),
            ki: Some(config.ki),
            kd: Some(config.kd),
        }
    }

    pub fn set_gain(&mut self, gain: Gain, value: Option<f64>) {
        match gain {
            Gain::Kp => self.kp = value,
            Gain::Ki => self.ki = value,
            Gain::Kd => self.kd = value,
        }
    }
}

impl ParameterStore for SimParameterStore {
    fn read_setpoint(&mut self) -> Option<f64> {
        self.setpoint
    }

    fn read_gain(&mut self, gain: Gain) -> Option<f64> {
        match gain {
            Gain::Kp => self.kp,
            Gain::Ki => self.ki,
            Gain::Kd => self.kd,
        }
    }
}
