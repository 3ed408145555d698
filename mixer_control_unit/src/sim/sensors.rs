//! Simulated temperature sensors over a shared plant.

use std::collections::HashMap;

use mixer_common::control_unit::config::SensorConfig;
use mixer_common::control_unit::state::SensorId;

use super::plant::SharedPlant;
use crate::io::SensorReader;

/// Reads flow and buffer temperatures from the plant. Individual sensors
/// can be overridden with a fixed value or a failure.
#[derive(Debug)]
pub struct SimSensors {
    plant: SharedPlant,
    flow: SensorId,
    buffer: SensorId,
    overrides: HashMap<SensorId, Option<f64>>,
}

impl SimSensors {
    pub fn new(plant: SharedPlant, ids: &SensorConfig) -> Self {
        Self {
            plant,
            flow: ids.flow,
            buffer: ids.buffer,
            overrides: HashMap::new(),
        }
    }

    /// Report `value` for `sensor` until cleared; `None` simulates a failure.
    pub fn set_override(&mut self, sensor: SensorId, value: Option<f64>) {
        self.overrides.insert(sensor, value);
    }

    pub fn clear_override(&mut self, sensor: SensorId) {
        self.overrides.remove(&sensor);
    }

    pub fn plant(&self) -> &SharedPlant {
        &self.plant
    }
}

impl SensorReader for SimSensors {
    fn read_temperature(&mut self, sensor: SensorId) -> Option<f64> {
        if let Some(value) = self.overrides.get(&sensor) {
            return *value;
        }
        let plant = self.plant.borrow();
        if sensor == self.flow {
            Some(plant.flow_temp())
        } else if sensor == self.buffer {
            Some(plant.buffer_temp())
        } else {
            None
        }
    }
}
