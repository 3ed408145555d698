//! Simulated valve actuator.
//!
//! Records every command and, when attached to a plant, drives its valve.
//! Pulsed actuators reject `go_to`; absolute actuators reject `open` and
//! `close`.

use mixer_common::control_unit::state::ActuationStyle;

use super::plant::{SharedPlant, ValveMotion};
use crate::error::ActuatorError;
use crate::io::Actuator;

/// A command as received by the simulated actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    Open,
    Close,
    Stop,
    GoTo(u8),
}

#[derive(Debug)]
pub struct SimActuator {
    style: ActuationStyle,
    plant: Option<SharedPlant>,
    commands: Vec<ActuatorCommand>,
    rejection: Option<String>,
}

impl SimActuator {
    pub fn new(style: ActuationStyle) -> Self {
        Self {
            style,
            plant: None,
            commands: Vec::new(),
            rejection: None,
        }
    }

    pub fn with_plant(mut self, plant: SharedPlant) -> Self {
        self.plant = Some(plant);
        self
    }

    /// Reject every motion command with `reason` until [`accept`](Self::accept).
    pub fn reject_with(&mut self, reason: impl Into<String>) {
        self.rejection = Some(reason.into());
    }

    pub fn accept(&mut self) {
        self.rejection = None;
    }

    /// Commands received so far, rejected ones included.
    #[inline]
    pub fn commands(&self) -> &[ActuatorCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    fn execute(&mut self, command: ActuatorCommand) -> Result<(), ActuatorError> {
        self.commands.push(command);
        match (self.style, command) {
            (ActuationStyle::Pulsed, ActuatorCommand::GoTo(_)) => {
                return Err(ActuatorError::Unsupported("go_to"));
            }
            (ActuationStyle::Absolute, ActuatorCommand::Open) => {
                return Err(ActuatorError::Unsupported("open"));
            }
            (ActuationStyle::Absolute, ActuatorCommand::Close) => {
                return Err(ActuatorError::Unsupported("close"));
            }
            _ => {}
        }
        if command != ActuatorCommand::Stop {
            if let Some(reason) = &self.rejection {
                return Err(ActuatorError::Rejected(reason.clone()));
            }
        }

        if let Some(plant) = &self.plant {
            let motion = match command {
                ActuatorCommand::Open => ValveMotion::Opening,
                ActuatorCommand::Close => ValveMotion::Closing,
                ActuatorCommand::Stop => ValveMotion::Idle,
                ActuatorCommand::GoTo(target) => ValveMotion::Toward(target as f64),
            };
            plant.borrow_mut().set_motion(motion);
        }
        Ok(())
    }
}

impl Actuator for SimActuator {
    fn open(&mut self) -> Result<(), ActuatorError> {
        self.execute(ActuatorCommand::Open)
    }

    fn close(&mut self) -> Result<(), ActuatorError> {
        self.execute(ActuatorCommand::Close)
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.execute(ActuatorCommand::Stop)
    }

    fn go_to(&mut self, position: u8) -> Result<(), ActuatorError> {
        self.execute(ActuatorCommand::GoTo(position))
    }
}
