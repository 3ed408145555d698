//! Collaborator seams of the control core.
//!
//! Sensor acquisition, parameter storage, actuator dispatch and status
//! display live outside the core. Each is a single call; the core owns the
//! policy of what to do when a call yields nothing.

use mixer_common::control_unit::state::{Gain, SensorId, Transition};

use crate::error::ActuatorError;

/// Temperature sensor access.
pub trait SensorReader {
    /// Current reading in °C, or `None` when the sensor is missing or invalid.
    ///
    /// Implementations must not substitute a previous value.
    fn read_temperature(&mut self, sensor: SensorId) -> Option<f64>;
}

/// Externally persisted tuning parameters.
///
/// Values are validated by the core; an invalid or missing value leaves the
/// previous one in effect.
pub trait ParameterStore {
    fn read_setpoint(&mut self) -> Option<f64>;
    fn read_gain(&mut self, gain: Gain) -> Option<f64>;
}

/// Valve motor commands.
///
/// Pulsed actuators implement `open`/`close`/`stop`; absolute-position
/// actuators implement `go_to`. The unused half may return
/// [`ActuatorError::Unsupported`].
pub trait Actuator {
    fn open(&mut self) -> Result<(), ActuatorError>;
    fn close(&mut self) -> Result<(), ActuatorError>;
    fn stop(&mut self) -> Result<(), ActuatorError>;
    fn go_to(&mut self, position: u8) -> Result<(), ActuatorError>;
}

/// Receives every real operating-state change. Never read back by the core.
pub trait StatusSink {
    fn announce(&mut self, transition: Transition);
}

impl<T: SensorReader + ?Sized> SensorReader for &mut T {
    fn read_temperature(&mut self, sensor: SensorId) -> Option<f64> {
        (**self).read_temperature(sensor)
    }
}

impl<T: ParameterStore + ?Sized> ParameterStore for &mut T {
    fn read_setpoint(&mut self) -> Option<f64> {
        (**self).read_setpoint()
    }
    fn read_gain(&mut self, gain: Gain) -> Option<f64> {
        (**self).read_gain(gain)
    }
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn open(&mut self) -> Result<(), ActuatorError> {
        (**self).open()
    }
    fn close(&mut self) -> Result<(), ActuatorError> {
        (**self).close()
    }
    fn stop(&mut self) -> Result<(), ActuatorError> {
        (**self).stop()
    }
    fn go_to(&mut self, position: u8) -> Result<(), ActuatorError> {
        (**self).go_to(position)
    }
}

impl<T: StatusSink + ?Sized> StatusSink for &mut T {
    fn announce(&mut self, transition: Transition) {
        (**self).announce(transition)
    }
}

/// Status sink that discards every transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn announce(&mut self, _transition: Transition) {}
}
