//! Simulated collaborators for bench runs and integration tests.
//!
//! A single [`plant::PlantModel`] is shared between the simulated sensors and
//! the simulated actuator, so valve moves feed back into the flow temperature.

pub mod actuator;
pub mod params;
pub mod plant;
pub mod sensors;

pub use actuator::{ActuatorCommand, SimActuator};
pub use params::SimParameterStore;
pub use plant::{PlantConfig, PlantModel, SharedPlant};
pub use sensors::SimSensors;
