//! Error types for the control unit.
//!
//! The control core itself never fails: sensor, parameter and timing
//! anomalies are recovered locally and actuator rejections surface as the
//! `ERROR` operating state. These types cover the collaborator seam and the
//! binary's setup path.

use mixer_common::config::ConfigError;
use thiserror::Error;

/// Failure reported by an [`Actuator`](crate::io::Actuator) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    /// The device refused or failed the command.
    #[error("actuator rejected command: {0}")]
    Rejected(String),

    /// The device does not support this command style.
    #[error("actuator does not support {0}")]
    Unsupported(&'static str),
}

/// Top-level error of the control-unit binary.
#[derive(Debug, Error)]
pub enum ControlUnitError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("config serialization: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("snapshot serialization: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
